//! Local key/value storage.
//!
//! A minimal string key/value store modelled on browser local storage: one
//! string value per named slot, read and written synchronously. The cart store
//! persists through the [`LocalStorage`] trait, so it can run against a
//! directory on disk ([`FileStorage`]) or purely in memory ([`MemoryStorage`]).

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Key cannot be mapped to a storage slot.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Writing the value would exceed the backend's quota.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Storage is unavailable (e.g. disabled or lock poisoned).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string key/value storage.
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: LocalStorage + ?Sized> LocalStorage for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage backed by a directory, one `<key>.json` file per slot.
///
/// Writes go to a temporary file that is renamed over the slot, so a crash
/// mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the slots.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Check that a key can name a storage slot.
///
/// Keys are non-empty, use only ASCII letters, digits, `-`, `_` and `.`, and
/// do not start with `.`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] otherwise.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        let mut file = fs::File::create(&tmp_path).map_err(io_error(&tmp_path))?;
        file.write_all(value.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(io_error(&tmp_path))?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(io_error(&path))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage, optionally limited to a total byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create unbounded in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that rejects writes once keys plus values exceed
    /// `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;

        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.slots
            .write()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_item("cart").unwrap(), None);

        storage.set_item("cart", "[1]").unwrap();
        storage.set_item("cart", "[2]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[2]"));

        storage.remove_item("cart").unwrap();
        storage.remove_item("cart").unwrap();
        assert_eq!(storage.get_item("cart").unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                storage.set_item(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_validate_key() {
        for key in ["cart", "cart-v2", "shop_cart.2"] {
            assert!(validate_key(key).is_ok(), "{key}");
        }
        for key in ["", "my cart", ".hidden", "a/b", "caf\u{e9}"] {
            assert!(matches!(validate_key(key), Err(StorageError::InvalidKey(_))), "{key}");
        }
    }

    #[test]
    fn test_file_storage_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let storage = FileStorage::new(&blocker);
        assert!(matches!(
            storage.set_item("cart", "[]"),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "12345").unwrap();
        // Replacing a slot only counts the new value.
        storage.set_item("k", "123456789").unwrap();

        let err = storage.set_item("k", "1234567890").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, quota: 10 }));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("123456789"));
    }
}
