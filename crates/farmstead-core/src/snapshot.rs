//! Flat key-value snapshot persistence.
//!
//! The local engine saves its whole `GameState` as one JSON document under
//! a fixed key after every change and reads it back on startup. A missing
//! key means "start a new game".

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::config::LocalConfig;

/// Errors that can occur reading or writing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem error.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where snapshots live.
#[derive(Debug, Clone)]
pub enum SnapshotStore {
    /// One `<key>.json` file per key inside a directory.
    File {
        /// Snapshot directory.
        dir: PathBuf,
    },
    /// Process memory. Clones share the same map.
    Memory(Arc<Mutex<BTreeMap<String, String>>>),
}

impl SnapshotStore {
    /// File-backed store rooted at `dir`. The directory is created on first save.
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::File { dir: dir.into() }
    }

    /// File-backed store in the configured snapshot directory.
    pub fn from_config(config: &LocalConfig) -> Self {
        Self::file(config.snapshot_dir.clone())
    }

    /// Empty in-memory store.
    pub fn in_memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(BTreeMap::new())))
    }

    fn path_for(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{key}.json"))
    }

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// File writes go to a temporary file first and are renamed into place
    /// so a crash never leaves a half-written snapshot.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(value)?;
        match self {
            Self::File { dir } => {
                tokio::fs::create_dir_all(dir).await?;
                let path = Self::path_for(dir, key);
                let tmp = path.with_extension("json.tmp");
                tokio::fs::write(&tmp, json).await?;
                tokio::fs::rename(&tmp, &path).await?;
            }
            Self::Memory(map) => {
                map.lock().await.insert(key.to_owned(), json);
            }
        }
        Ok(())
    }

    /// Read the value at `key`. Returns `None` if nothing was saved.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SnapshotError> {
        let raw = match self {
            Self::File { dir } => match tokio::fs::read_to_string(Self::path_for(dir, key)).await {
                Ok(contents) => Some(contents),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            },
            Self::Memory(map) => map.lock().await.get(key).cloned(),
        };
        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(SnapshotError::from)
    }

    /// Remove the value at `key`, if any.
    pub async fn delete(&self, key: &str) -> Result<(), SnapshotError> {
        match self {
            Self::File { dir } => match tokio::fs::remove_file(Self::path_for(dir, key)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Self::Memory(map) => {
                map.lock().await.remove(key);
                Ok(())
            }
        }
    }
}
