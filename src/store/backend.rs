//! Key-value storage port and its backends
//!
//! The conversation store persists whole JSON documents under string keys.
//! Backends only need whole-value reads and writes; there are no partial
//! updates and no cross-key transactions.

use crate::error::{Result, RougechatError};
use anyhow::Context;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Whole-value key-value port backing the conversation store
pub trait StorageBackend: Send + Sync {
    /// Reads the full value stored under `key`, or `None` when absent
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the full value stored under `key`
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed storage: each key maps to `<data-dir>/<key>.json`
///
/// Writes are synchronous whole-file overwrites with no atomic rename. The
/// store writes its two keys separately, so a crash between the writes can
/// leave the persisted collection and the persisted selection inconsistent
/// with each other.
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Create a storage instance rooted at the user's data directory
    ///
    /// Honors the `ROUGECHAT_DATA_DIR` environment variable, which makes it
    /// easy to point the binary at a test directory or an alternate location
    /// without changing the user's application data dir.
    pub fn new() -> Result<Self> {
        if let Ok(override_dir) = std::env::var("ROUGECHAT_DATA_DIR") {
            return Self::with_dir(override_dir);
        }

        let proj_dirs = ProjectDirs::from("com", "rougechat", "rougechat")
            .ok_or_else(|| RougechatError::Storage("Could not determine data directory".into()))?;

        Self::with_dir(proj_dirs.data_dir())
    }

    /// Create a storage instance rooted at the given directory
    ///
    /// This is primarily useful for tests where the default application data
    /// directory is not desirable (for example, using a temporary directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use rougechat::store::backend::FileStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = FileStorage::with_dir(dir.path()).unwrap();
    /// ```
    pub fn with_dir<P: Into<PathBuf>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")
            .map_err(|e| RougechatError::Storage(e.to_string()))?;
        Ok(Self { data_dir })
    }

    /// Directory this storage reads and writes under
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RougechatError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
            .into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(|e| RougechatError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

/// In-memory storage backend for tests and examples
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| RougechatError::Storage("storage mutex poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| RougechatError::Storage("storage mutex poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
