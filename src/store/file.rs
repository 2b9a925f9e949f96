//! JSON file policy store
//!
//! Persists the whole key/value map as a single JSON object. Every write
//! rewrites the file through a temporary sibling and an atomic rename, so a
//! crash mid-write leaves the previous contents intact.

use super::traits::PolicyStore;
use crate::domain::{CloakError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Policy store backed by a JSON file on disk
#[derive(Debug)]
pub struct JsonFilePolicyStore {
    path: PathBuf,
    // Single writer; reads also take it so they never see a half-renamed file
    lock: Mutex<()>,
}

impl JsonFilePolicyStore {
    /// Open (or lazily create) a store at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CloakError::StorageUnavailable(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        tracing::debug!(path = %path.display(), "Opened JSON file policy store");

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            CloakError::StorageUnavailable(format!(
                "Failed to read store {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            CloakError::StorageUnavailable(format!(
                "Store {} is not a JSON object of strings: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("tmp");

        fs::write(&tmp, json).map_err(|e| {
            CloakError::StorageUnavailable(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            CloakError::StorageUnavailable(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CloakError::StorageUnavailable("file store lock poisoned".to_string()))?;
        let mut map = self.read_map()?;
        f(&mut map);
        self.write_map(&map)
    }
}

impl PolicyStore for JsonFilePolicyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CloakError::StorageUnavailable("file store lock poisoned".to_string()))?;
        Ok(self.read_map()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFilePolicyStore::open(dir.path().join("store.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFilePolicyStore::open(&path).unwrap();
        store.put("retention_policies", "NUMERIC_DATA:1:BASIC:false").unwrap();
        store.put("token_TOK_1", "secret").unwrap();
        store.remove("token_TOK_1").unwrap();
        drop(store);

        let reopened = JsonFilePolicyStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("retention_policies").unwrap().as_deref(),
            Some("NUMERIC_DATA:1:BASIC:false")
        );
        assert_eq!(reopened.get("token_TOK_1").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = JsonFilePolicyStore::open(&path).unwrap();
        let err = store.get("k").unwrap_err();
        assert!(err.is_storage());
        assert!(store.put("k", "v").unwrap_err().is_storage());
    }
}
