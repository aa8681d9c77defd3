//! Persistence sink for user progress.
//!
//! Progress is stored as JSON text under a single key. Storage problems
//! never block painting: [`load_progress`] falls back to fresh progress and
//! callers log failed saves.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::progress::UserProgress;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored progress is corrupt: {0}")]
    Corrupt(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// String key/value persistence
pub trait KeyValueStore {
    /// Value stored under `key`, or None if nothing was saved
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and hosts without persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.resolve(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::write(&path, value)?;
        debug!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Read stored progress, distinguishing absence from failure
pub fn read_progress(store: &dyn KeyValueStore, key: &str) -> Result<Option<UserProgress>, StorageError> {
    let Some(text) = store.load(key)? else {
        return Ok(None);
    };
    let progress: UserProgress =
        serde_json::from_str(&text).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    Ok(Some(progress.normalized()))
}

/// Stored progress, or fresh progress when none is stored or it cannot be
/// read
pub fn load_progress(store: &dyn KeyValueStore, key: &str) -> UserProgress {
    match read_progress(store, key) {
        Ok(Some(progress)) => progress,
        Ok(None) => UserProgress::default(),
        Err(e) => {
            warn!("could not load progress from '{}': {}, starting fresh", key, e);
            UserProgress::default()
        }
    }
}

pub fn save_progress(store: &mut dyn KeyValueStore, key: &str, progress: &UserProgress) -> Result<(), StorageError> {
    let text = serde_json::to_string(progress)?;
    store.save(key, &text)
}
