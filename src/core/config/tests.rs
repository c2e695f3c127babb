use super::data::{Config, SessionStorage};
use super::io::ConfigError;
use crate::api::DEFAULT_API_URL;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.session_storage(), SessionStorage::File);
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        api_url: Some("http://chat.internal:8080/api".to_string()),
        session_storage: Some(SessionStorage::Keyring),
    };
    config.save_to_path(&config_path).expect("save failed");

    let contents = fs::read_to_string(&config_path).expect("read back");
    assert!(contents.contains("api_url = \"http://chat.internal:8080/api\""));
    assert!(contents.contains("session_storage = \"keyring\""));

    let mut loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded, config);

    loaded.api_url = None;
    loaded.save_to_path(&config_path).expect("second save failed");
    let reloaded = Config::load_from_path(&config_path).expect("reload failed");
    assert_eq!(reloaded.api_url, None);
    assert_eq!(reloaded.session_storage(), SessionStorage::Keyring);
}

#[test]
fn test_invalid_toml_reports_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "api_url = [unterminated").expect("write");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn test_unknown_session_storage_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "session_storage = \"cookie\"\n").expect("write");

    assert!(Config::load_from_path(&config_path).is_err());
}

#[test]
fn api_url_precedence_is_flag_then_env_then_file() {
    let config = Config {
        api_url: Some("http://from-file/api/".to_string()),
        session_storage: None,
    };

    assert_eq!(
        config.resolve_api_url_with(Some("http://from-flag/api"), Some("http://from-env/api")),
        "http://from-flag/api"
    );
    assert_eq!(
        config.resolve_api_url_with(None, Some("http://from-env/api")),
        "http://from-env/api"
    );
    assert_eq!(
        config.resolve_api_url_with(None, None),
        "http://from-file/api"
    );
    assert_eq!(
        Config::default().resolve_api_url_with(None, Some("  ")),
        DEFAULT_API_URL
    );
}

#[test]
fn session_storage_parses_case_insensitively() {
    assert_eq!("Keyring".parse::<SessionStorage>(), Ok(SessionStorage::Keyring));
    assert_eq!("file".parse::<SessionStorage>(), Ok(SessionStorage::File));
    assert!("cookies".parse::<SessionStorage>().is_err());
}
