use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Match;
use crate::errors::storage_context;

/// JSON files under one directory, one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the store, making its directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let path = self.build_path(key);
        let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;
        fs::write(&path, json).with_context(|| storage_context("write", key))?;

        debug!("Saved {}", path.display());
        Ok(())
    }

    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let path = self.build_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).with_context(|| storage_context("read", key))?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }

    /// Remove one entry; removing a missing entry is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.build_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| storage_context("remove", key)),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.build_path(key).exists()
    }

    pub fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.dir).context("Failed to clear storage")?;
        fs::create_dir_all(&self.dir).context("Failed to recreate storage directory")?;

        info!("Cleared {}", self.dir.display());
        Ok(())
    }

    fn build_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Per-player tournament match lists kept between runs
#[derive(Debug, Clone)]
pub struct MatchCache {
    store: FileStore,
}

impl MatchCache {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let store = FileStore::new(data_dir.as_ref().join("matches"))?;
        Ok(Self { store })
    }

    pub fn key(tournament_id: &str, player_id: &str) -> String {
        format!("{}-{}", tournament_id, player_id)
    }

    pub fn load(&self, tournament_id: &str, player_id: &str) -> Result<Option<Vec<Match>>> {
        self.store.load(&Self::key(tournament_id, player_id))
    }

    pub fn save(&self, tournament_id: &str, player_id: &str, matches: &[Match]) -> Result<()> {
        self.store.save(&Self::key(tournament_id, player_id), &matches)
    }

    pub fn invalidate(&self, tournament_id: &str, player_id: &str) -> Result<()> {
        self.store.remove(&Self::key(tournament_id, player_id))
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
