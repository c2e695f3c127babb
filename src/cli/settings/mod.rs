//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a [`SettingHandler`] that validates input,
//! mutates a [`Config`] and formats the current value for `set` with no
//! arguments. The [`SettingRegistry`] maps user-facing keys to handlers.

pub mod error;
pub mod handlers;

pub use error::SettingError;

use std::collections::HashMap;
use std::path::Path;

use crate::core::config::Config;

use handlers::{ApiUrlHandler, SessionStorageHandler};

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Apply `args` to `config`, returning the success message.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Clear the value, returning the success message.
    fn unset(&self, config: &mut Config) -> String;

    /// Format the current value for display in `set` output.
    fn format(&self, config: &Config) -> String;
}

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };
        registry.register(Box::new(ApiUrlHandler));
        registry.register(Box::new(SessionStorageHandler));
        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// One line per known key, in display order.
    pub fn describe(&self, config: &Config) -> Vec<String> {
        self.display_order
            .iter()
            .filter_map(|key| self.get(key))
            .map(|handler| handler.format(config))
            .collect()
    }

    /// Set `key` in the config file at `path`. With no value, the current
    /// configuration is returned instead and nothing is written.
    pub fn set_in_file(
        &self,
        path: &Path,
        key: &str,
        args: &[String],
    ) -> Result<String, SettingError> {
        let mut config = load(path)?;
        if args.is_empty() {
            let mut lines = vec!["Current configuration:".to_string()];
            lines.extend(self.describe(&config));
            return Ok(lines.join("\n"));
        }
        let handler = self
            .get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
        let message = handler.set(args, &mut config)?;
        save(&config, path)?;
        Ok(message)
    }

    pub fn unset_in_file(&self, path: &Path, key: &str) -> Result<String, SettingError> {
        let handler = self
            .get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
        let mut config = load(path)?;
        let message = handler.unset(&mut config);
        save(&config, path)?;
        Ok(message)
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn load(path: &Path) -> Result<Config, SettingError> {
    Config::load_from_path(path).map_err(|e| SettingError::ConfigError(e.to_string()))
}

fn save(config: &Config, path: &Path) -> Result<(), SettingError> {
    config
        .save_to_path(path)
        .map_err(|e| SettingError::ConfigError(e.to_string()))
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str) -> String {
    format!("✅ Unset {key}")
}
