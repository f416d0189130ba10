//! Key-value blob storage
//!
//! State is kept as independently keyed JSON blobs:
//!
//! ```text
//! <data dir>/
//!   .tapestry.toml          # Optional configuration
//!   todo-periods.json       # Periods with their nested tasks
//!   todo-analytics.json     # Day analytics log
//!   auth-user.json          # Signed-in session user, if any
//!   .tapestry.lock          # Held across a whole load -> mutate -> write
//!   *.json.lock             # Advisory locks guarding each blob
//! ```
//!
//! A blob that fails to parse is treated as absent: callers fall back to
//! their default state and the next write replaces it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Key of the period-set blob
pub const PERIODS_KEY: &str = "todo-periods";

/// Key of the day analytics log blob
pub const ANALYTICS_KEY: &str = "todo-analytics";

/// Key of the session blob
pub const SESSION_KEY: &str = "auth-user";

/// Store-wide lock file inside the data directory
pub const STORE_LOCK_FILE: &str = ".tapestry.lock";

/// String-keyed store of serialized blobs
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Exclusive hold over the whole store, for a read-modify-write cycle.
    /// Stores without other writers return `None`.
    fn lock_exclusive(&self) -> Result<Option<FileLock>> {
        Ok(None)
    }
}

/// One `<key>.json` file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the data directory if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Path of the file holding `key`
    pub fn blob_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.blob_path(key)?.exists())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.blob_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        lock::read_locked_str(&path, self.lock_timeout_ms)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.blob_path(key)?;
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.blob_path(key)?;
        lock::remove_locked(&path, self.lock_timeout_ms)
    }

    fn lock_exclusive(&self) -> Result<Option<FileLock>> {
        let path = self.dir.join(STORE_LOCK_FILE);
        FileLock::acquire(path, self.lock_timeout_ms).map(Some)
    }
}

/// In-process store, used by tests and embedders without a disk
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("invalid storage key '{key}'")))
    }
}

/// Read and parse a blob. Missing and unparseable blobs both yield `None`;
/// the latter is logged.
pub fn read_blob<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(key, error = %err, "discarding unreadable blob");
            Ok(None)
        }
    }
}

/// Serialize and store a blob, replacing any previous value
pub fn write_blob<T: Serialize>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.set(key, &json)
}
