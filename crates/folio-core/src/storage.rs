//! Durable client storage
//!
//! A flat string key/value map. `FileStore` keeps it in one JSON file so
//! preferences and the auth token survive restarts; `MemoryStore` is the
//! ephemeral variant used by tests.

use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Stored theme mode (`light` / `dark`)
pub const THEME_KEY: &str = "theme";

/// Stored accent scheme (`teal` / `purple` / `blue` / `rose`)
pub const COLOR_SCHEME_KEY: &str = "colorScheme";

/// Stored bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Synchronous key/value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a key
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store pre-populated with entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// JSON-file-backed storage; every write rewrites the file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) storage at `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current map for a write, and whether a corrupt file was discarded
    fn read_map_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_map() {
            Ok(map) => Ok((map, false)),
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "storage file is corrupt; starting from an empty map"
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let (mut map, _) = self.read_map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        tracing::trace!(key, path = %self.path.display(), "storage write");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let (mut map, repaired) = self.read_map_for_write()?;
        if map.remove(key).is_some() || repaired {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Read a key, logging and swallowing storage failures
pub(crate) fn read_lenient(storage: &dyn KeyValueStore, key: &str) -> Option<String> {
    storage.get(key).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "storage read failed");
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::with_entries([(THEME_KEY, "dark")]);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        store.set(THEME_KEY, "light").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        store.remove(THEME_KEY).unwrap();
        store.remove(THEME_KEY).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("folio.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
        store.set(AUTH_TOKEN_KEY, "t1").unwrap();
        store.set(COLOR_SCHEME_KEY, "rose").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        assert_eq!(reopened.get(COLOR_SCHEME_KEY).unwrap().as_deref(), Some("rose"));

        reopened.remove(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported_and_read_leniently() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get(THEME_KEY), Err(StorageError::Corrupt(_))));
        assert_eq!(read_lenient(&store, THEME_KEY), None);
    }

    #[test]
    fn write_after_corruption_replaces_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::new(&path);
        store.set(THEME_KEY, "dark").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        reopened.set(AUTH_TOKEN_KEY, "t1").unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    }

    #[test]
    fn remove_after_corruption_leaves_a_readable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::new(&path);
        store.remove(AUTH_TOKEN_KEY).unwrap();

        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }
}
