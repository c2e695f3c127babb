//! Persistence of the login session between runs.
//!
//! A session is the bearer token issued by `/login` plus the email it was
//! issued for. It is stored under the keys `token` and `userEmail`, either in
//! a TOML file in the data directory or in the platform keyring. Holding a
//! token is what "authenticated" means; there is no expiry tracking.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::io::{load_toml, project_dirs, save_toml};
use crate::core::config::{ConfigError, SessionStorage};
use crate::core::keyring::KeyringAccessError;

pub const TOKEN_KEY: &str = "token";
pub const USER_EMAIL_KEY: &str = "userEmail";

const KEYRING_SERVICE: &str = "minimind-chat";
const SESSION_FILE_NAME: &str = "session.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_email: String,
}

#[derive(Debug)]
pub enum SessionError {
    File(ConfigError),
    Keyring(KeyringAccessError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::File(err) => write!(f, "Session file error: {err}"),
            SessionError::Keyring(err) => write!(f, "Keyring error: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::File(err) => Some(err),
            SessionError::Keyring(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        SessionError::File(err)
    }
}

impl From<keyring::Error> for SessionError {
    fn from(err: keyring::Error) -> Self {
        SessionError::Keyring(KeyringAccessError::from(err))
    }
}

/// Key/value storage for the two session entries.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Session operations layered over a [`SessionStore`].
pub struct SessionManager {
    store: Box<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn for_storage(storage: SessionStorage) -> Result<Self, SessionError> {
        let store: Box<dyn SessionStore> = match storage {
            SessionStorage::File => Box::new(FileSessionStore::default_location()?),
            SessionStorage::Keyring => Box::new(KeyringSessionStore::new()),
        };
        Ok(Self::new(store))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySessionStore::default()))
    }

    pub fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.token()?.is_some())
    }

    pub fn current(&self) -> Result<Option<Session>, SessionError> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        let user_email = self.store.get(USER_EMAIL_KEY)?.unwrap_or_default();
        Ok(Some(Session { token, user_email }))
    }

    pub fn establish(&self, token: &str, user_email: &str) -> Result<(), SessionError> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_EMAIL_KEY, user_email)?;
        info!(user_email, "session established");
        Ok(())
    }

    /// Remove both session keys. Removing an absent key is not an error.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_EMAIL_KEY)?;
        info!("session cleared");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(rename = "userEmail", skip_serializing_if = "Option::is_none")]
    user_email: Option<String>,
}

impl SessionFile {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            TOKEN_KEY => Some(&mut self.token),
            USER_EMAIL_KEY => Some(&mut self.user_email),
            _ => None,
        }
    }
}

/// `session.toml` in the platform data directory.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, SessionError> {
        Ok(Self::new(project_dirs()?.data_dir().join(SESSION_FILE_NAME)))
    }

    fn update(&self, key: &str, value: Option<&str>) -> Result<(), SessionError> {
        let mut file: SessionFile = load_toml(&self.path)?;
        let Some(slot) = file.slot(key) else {
            return Ok(());
        };
        *slot = value.map(str::to_string);
        if file == SessionFile::default() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|source| {
                    SessionError::File(ConfigError::Write {
                        path: self.path.clone(),
                        source: Box::new(source),
                    })
                })?;
            }
            return Ok(());
        }
        save_toml(&file, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut file: SessionFile = load_toml(&self.path)?;
        Ok(file.slot(key).and_then(Option::take))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.update(key, Some(value))
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.update(key, None)
    }
}

/// One keyring entry per session key under the `minimind-chat` service.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringSessionStore;

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self
    }
}

impl SessionStore for KeyringSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entry = Entry::new(KEYRING_SERVICE, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => {
                debug!(key, "keyring entry missing");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let entry = Entry::new(KEYRING_SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let entry = Entry::new(KEYRING_SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemorySessionStore {
    fn with_entries<T>(&self, f: impl FnOnce(&mut Vec<(String, String)>) -> T) -> T {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.with_entries(|entries| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.with_entries(|entries| {
            entries.retain(|(k, _)| k != key);
            entries.push((key.to_string(), value.to_string()));
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.with_entries(|entries| entries.retain(|(k, _)| k != key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fresh_manager_is_not_authenticated() {
        let manager = SessionManager::in_memory();
        assert!(!manager.is_authenticated().unwrap());
        assert_eq!(manager.current().unwrap(), None);
    }

    #[test]
    fn establish_then_logout_round_trip() {
        let manager = SessionManager::in_memory();
        manager.establish("tok-1", "ada@example.com").unwrap();
        assert!(manager.is_authenticated().unwrap());
        assert_eq!(
            manager.current().unwrap(),
            Some(Session {
                token: "tok-1".to_string(),
                user_email: "ada@example.com".to_string(),
            })
        );

        manager.logout().unwrap();
        assert!(!manager.is_authenticated().unwrap());
        assert_eq!(manager.current().unwrap(), None);
    }

    #[test]
    fn empty_token_is_not_a_session() {
        let store = MemorySessionStore::default();
        store.set(TOKEN_KEY, "").unwrap();
        let manager = SessionManager::new(Box::new(store));
        assert!(!manager.is_authenticated().unwrap());
    }

    #[test]
    fn file_store_uses_local_storage_key_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("session.toml");
        let manager = SessionManager::new(Box::new(FileSessionStore::new(&path)));

        manager.establish("abc", "bob@example.com").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("token = \"abc\""));
        assert!(contents.contains("userEmail = \"bob@example.com\""));

        let reopened = SessionManager::new(Box::new(FileSessionStore::new(&path)));
        assert_eq!(reopened.current().unwrap().unwrap().user_email, "bob@example.com");
    }

    #[test]
    fn file_store_logout_removes_both_keys_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.toml");
        let store = FileSessionStore::new(&path);
        let manager = SessionManager::new(Box::new(FileSessionStore::new(&path)));

        manager.establish("abc", "bob@example.com").unwrap();
        manager.logout().unwrap();

        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_EMAIL_KEY).unwrap(), None);
        assert!(!path.exists());

        manager.logout().unwrap();
    }

    #[test]
    fn file_store_ignores_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.toml"));
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }
}
