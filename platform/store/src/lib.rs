//! Local key-value storage. Each key maps to one opaque text blob that is
//! replaced wholesale on every write.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("failed to read {key}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {key}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blob storage addressed by a fixed key.
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing was ever stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces whatever was stored under `key`.
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;
}

fn check_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Stores every key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        check_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        check_key(key)?;
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let path = self.path_for(key);
        // Rename over the old blob so a failed write leaves it intact.
        let staging = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&staging, value).map_err(write_err)?;
        fs::rename(&staging, &path).map_err(write_err)?;
        debug!(path = %path.display(), bytes = value.len(), "blob written");
        Ok(())
    }
}

/// Process-local store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        check_key(key)?;
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        check_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Environment-driven location of the data directory.
#[derive(Clone, Debug, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_dir_key")]
    env_key: String,
    #[serde(default = "default_data_dir")]
    fallback_dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            env_key: default_dir_key(),
            fallback_dir: default_data_dir(),
        }
    }
}

fn default_dir_key() -> String {
    "HR_DATA_DIR".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl StoreSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn data_dir(&self) -> PathBuf {
        std::env::var_os(&self.env_key)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.fallback_dir.clone())
    }

    pub fn open(&self) -> FileStore {
        FileStore::new(self.data_dir())
    }
}
