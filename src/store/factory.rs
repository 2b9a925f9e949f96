//! Policy store factory

use super::file::JsonFilePolicyStore;
use super::memory::InMemoryPolicyStore;
use super::traits::PolicyStore;
use crate::config::schema::{StoreBackend, StoreConfig};
use crate::domain::{CloakError, Result};
use std::sync::Arc;

/// Create a policy store based on the configuration
///
/// # Errors
///
/// Returns an error if the file backend is selected without a path, or the
/// store directory cannot be created.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn PolicyStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Creating in-memory policy store");
            Ok(Arc::new(InMemoryPolicyStore::new()) as Arc<dyn PolicyStore>)
        }
        StoreBackend::File => {
            let path = config.path.as_ref().ok_or_else(|| {
                CloakError::Configuration(
                    "store.path is required when backend = 'file'".to_string(),
                )
            })?;

            tracing::info!(path = %path, "Creating JSON file policy store");
            Ok(Arc::new(JsonFilePolicyStore::open(path)?) as Arc<dyn PolicyStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_memory_store() {
        let store = create_store(&StoreConfig::default()).unwrap();
        store.put("a", "b").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_create_file_store() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::File,
            path: Some(dir.path().join("s.json").to_string_lossy().to_string()),
        };
        let store = create_store(&config).unwrap();
        store.put("a", "b").unwrap();
        assert!(dir.path().join("s.json").exists());
    }

    #[test]
    fn test_file_store_requires_path() {
        let config = StoreConfig {
            backend: StoreBackend::File,
            path: None,
        };
        assert!(matches!(
            create_store(&config),
            Err(CloakError::Configuration(_))
        ));
    }
}
