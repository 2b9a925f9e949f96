//! In-memory policy store

use super::traits::PolicyStore;
use crate::domain::{CloakError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Policy store backed by a `RwLock<HashMap>`
///
/// Readers proceed concurrently; writers are serialized by the lock. Contents
/// are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryPolicyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E>(_: E) -> CloakError {
    CloakError::StorageUnavailable("in-memory store lock poisoned".to_string())
}

impl PolicyStore for InMemoryPolicyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
