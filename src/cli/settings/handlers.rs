use crate::api::DEFAULT_API_URL;
use crate::core::config::{Config, SessionStorage};
use crate::utils::url::validate_base_url;

use super::{success_set, success_unset, SettingError, SettingHandler};

/// Handler for the `api-url` setting.
pub struct ApiUrlHandler;

impl SettingHandler for ApiUrlHandler {
    fn key(&self) -> &'static str {
        "api-url"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let Some(raw) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To set the server URL, specify it:",
                example: "minimind-chat set api-url http://localhost:5000/api",
            });
        };
        let url = validate_base_url(raw).map_err(|reason| SettingError::InvalidValue {
            key: "api-url",
            reason,
        })?;
        let message = success_set(self.key(), &url);
        config.api_url = Some(url);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> String {
        config.api_url = None;
        success_unset(self.key())
    }

    fn format(&self, config: &Config) -> String {
        match &config.api_url {
            Some(url) => format!("  api-url: {url}"),
            None => format!("  api-url: (unset, default {DEFAULT_API_URL})"),
        }
    }
}

/// Handler for the `session-storage` setting.
pub struct SessionStorageHandler;

impl SettingHandler for SessionStorageHandler {
    fn key(&self) -> &'static str {
        "session-storage"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let Some(raw) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To choose where the login session is kept, specify file or keyring:",
                example: "minimind-chat set session-storage keyring",
            });
        };
        let storage: SessionStorage = raw.parse().map_err(|reason| SettingError::InvalidValue {
            key: "session-storage",
            reason,
        })?;
        config.session_storage = Some(storage);
        Ok(success_set(self.key(), storage.as_str()))
    }

    fn unset(&self, config: &mut Config) -> String {
        config.session_storage = None;
        success_unset(self.key())
    }

    fn format(&self, config: &Config) -> String {
        match config.session_storage {
            Some(storage) => format!("  session-storage: {storage}"),
            None => "  session-storage: (unset, default file)".to_string(),
        }
    }
}
