use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::cache::FileStore;
use crate::config::SessionSettings;
use crate::domain::SessionToken;

/// Durable home of the session token, one entry under a fixed key
#[derive(Debug, Clone)]
pub struct TokenStorage {
    store: FileStore,
    key: String,
}

impl TokenStorage {
    pub fn new<P: AsRef<Path>>(data_dir: P, key: &str) -> Result<Self> {
        Ok(Self {
            store: FileStore::new(data_dir)?,
            key: key.to_string(),
        })
    }

    pub fn from_settings(settings: &SessionSettings) -> Result<Self> {
        Self::new(&settings.data_dir, &settings.token_key)
    }

    pub fn save(&self, token: &SessionToken) -> Result<()> {
        debug!("Persisting session token");
        self.store.save(&self.key, &token.as_str())
    }

    /// Stored token, if any; an empty entry counts as absent
    pub fn load(&self) -> Result<Option<SessionToken>> {
        let raw: Option<String> = self.store.load(&self.key)?;
        Ok(raw.filter(|t| !t.trim().is_empty()).map(SessionToken::new))
    }

    pub fn clear(&self) -> Result<()> {
        debug!("Removing session token");
        self.store.remove(&self.key)
    }

    pub fn is_present(&self) -> bool {
        self.store.exists(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        TokenStorage::new(dir.path(), "token")
            .unwrap()
            .save(&SessionToken::new("jwt-1"))
            .unwrap();

        let reopened = TokenStorage::new(dir.path(), "token").unwrap();
        assert_eq!(reopened.load().unwrap(), Some(SessionToken::new("jwt-1")));
    }

    #[test]
    fn clear_removes_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path(), "token").unwrap();

        storage.save(&SessionToken::new("jwt-1")).unwrap();
        storage.clear().unwrap();

        assert!(!storage.is_present());
        assert_eq!(storage.load().unwrap(), None);
        storage.clear().unwrap();
    }

    #[test]
    fn blank_token_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path(), "token").unwrap();

        storage.save(&SessionToken::new("  ")).unwrap();

        assert_eq!(storage.load().unwrap(), None);
    }
}
