//! File-backed content store.
//!
//! One JSON file per key under the store root, with nested keys mapped to
//! subdirectories. Writes go through a temp file and a rename so an
//! interrupted write never truncates an existing value.

use std::fs;
use std::path::{Path, PathBuf};

use super::{key_segments, ContentStore, StoreError, StoreResult};

/// Durable store rooted at a directory on disk.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store at the default per-user location
    /// (`<data_dir>/remedyflow/store`).
    pub fn open_default() -> StoreResult<Self> {
        let root = dirs::data_dir().ok_or(StoreError::NoDataDir)?.join("remedyflow").join("store");
        Ok(Self::with_root(root))
    }

    /// Open a store rooted at a specific directory (used by tests and the
    /// `--data-dir` override).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> StoreResult<PathBuf> {
        let mut segments = key_segments(key)?;
        let Some(last) = segments.pop() else {
            return Err(StoreError::InvalidKey(key.to_string()));
        };

        let mut path = self.root.clone();
        path.extend(segments);
        // Appended, not set_extension: a dot inside the segment is part of
        // the key, so `a` and `a.b` must map to different files.
        path.push(format!("{last}.json"));
        Ok(path)
    }

    fn io_err(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io { key: key.to_string(), source }
    }
}

impl ContentStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some).map_err(|e| Self::io_err(key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_err(key, e))?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::io_err(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_err(key, e))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::with_root(dir.path());

        assert!(store.get("greeting").unwrap().is_none());

        store.set("greeting", "\"hello\"").unwrap();
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("\"hello\""));

        store.remove("greeting").unwrap();
        assert!(store.get("greeting").unwrap().is_none());

        // Removing again is fine
        store.remove("greeting").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();

        {
            let mut store = FileStore::with_root(dir.path());
            store.set("accounts", "[]").unwrap();
        }

        let store = FileStore::with_root(dir.path());
        assert_eq!(store.get("accounts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_nested_key_creates_subdirectory() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::with_root(dir.path());

        store.set("documents/user-1", "[]").unwrap();

        assert!(dir.path().join("documents").join("user-1.json").exists());
        assert_eq!(store.get("documents/user-1").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_dotted_keys_map_to_distinct_files() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::with_root(dir.path());

        store.set("backup", "1").unwrap();
        store.set("backup.old", "2").unwrap();

        assert_eq!(store.get("backup").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("backup.old").unwrap().as_deref(), Some("2"));
        assert!(dir.path().join("backup.json").exists());
        assert!(dir.path().join("backup.old.json").exists());
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::with_root(dir.path());

        store.set("session", "1").unwrap();
        store.set("session", "2").unwrap();
        assert_eq!(store.get("session").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::with_root(dir.path());

        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
