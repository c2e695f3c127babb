use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::DEFAULT_API_URL;
use crate::utils::url::normalize_base_url;

/// Environment override for the API base URL, checked after `--api-url`.
pub const API_URL_ENV_VAR: &str = "MINIMIND_API_URL";

/// Where the login session (`token` and `userEmail`) is kept between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStorage {
    #[default]
    File,
    Keyring,
}

impl SessionStorage {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStorage::File => "file",
            SessionStorage::Keyring => "keyring",
        }
    }
}

impl fmt::Display for SessionStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStorage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionStorage::File),
            "keyring" => Ok(SessionStorage::Keyring),
            other => Err(format!(
                "Unknown session storage '{other}'. Use 'file' or 'keyring'."
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the chat server, e.g. `http://localhost:5000/api`
    pub api_url: Option<String>,
    pub session_storage: Option<SessionStorage>,
}

impl Config {
    /// `--api-url` beats `MINIMIND_API_URL`, which beats the config file.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        let env_value = std::env::var(API_URL_ENV_VAR).ok();
        self.resolve_api_url_with(cli_override, env_value.as_deref())
    }

    pub(crate) fn resolve_api_url_with(
        &self,
        cli_override: Option<&str>,
        env_value: Option<&str>,
    ) -> String {
        [cli_override, env_value, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(normalize_base_url)
            .find(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn session_storage(&self) -> SessionStorage {
        self.session_storage.unwrap_or_default()
    }
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
