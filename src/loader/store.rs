// Persistent key-value stores backing the snapshot cache.
// The trait seam lets tests run against an in-memory map instead of disk.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use directories::ProjectDirs;

use crate::error::Result;

/// Key-value capability over the snapshot cache.
///
/// `get` returns the raw stored text or `None` on a miss; `set` replaces the
/// whole value for a key in one operation.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and single-process callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store keeping one file per key under a cache directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform cache directory (~/.cache/vitrine on
    /// Linux).
    pub fn open_default() -> Option<Self> {
        ProjectDirs::from("", "", "vitrine").map(|dirs| Self::new(dirs.cache_dir()))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically via temp file: readers see the old value or the
        // new one, never a torn write.
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

/// Replace characters that are unsafe in file names.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn memory_store_round_trip_and_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k"), Some("v1".to_string()));

        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k"), Some("v2".to_string()));
    }

    #[test]
    fn file_store_round_trip_and_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        assert_eq!(store.get("snapshot"), None);

        store.set("snapshot", "{}").unwrap();
        assert_eq!(store.get("snapshot"), Some("{}".to_string()));

        store.set("snapshot", r#"{"repos":[]}"#).unwrap();
        assert_eq!(store.get("snapshot"), Some(r#"{"repos":[]}"#.to_string()));
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("github/data:v1", "x").unwrap();
        assert_eq!(store.get("github/data:v1"), Some("x".to_string()));
        assert!(temp_dir.path().join("github_data_v1.json").exists());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("simple"), "simple");
        assert_eq!(sanitize_key("with/slash"), "with_slash");
        assert_eq!(sanitize_key("data:v2"), "data_v2");
    }
}
