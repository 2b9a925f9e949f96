//! Tokenization masking

use super::Masker;
use crate::anonymization::models::MaskingPolicy;
use crate::domain::{Result, ScalarValue};
use crate::store::traits::token_key;
use crate::store::PolicyStore;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::Arc;

/// Token prefix
pub const TOKEN_PREFIX: &str = "TOK_";

/// Draws allowed before giving up on finding an unused token
pub const MAX_TOKEN_ATTEMPTS: usize = 32;

/// Tokenization masker - replaces values with random `TOK_######` tokens
///
/// The mapping back to the original string form is written to the policy
/// store under `token_<token>`. Tokens come from the operating system's
/// secure random source; a token that already has a mapping is never reissued
/// while the store can be read.
pub struct TokenMasker {
    store: Arc<dyn PolicyStore>,
}

impl TokenMasker {
    /// Create a tokenization masker writing mappings to `store`
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }

    /// Generate a fresh random token
    fn generate_token(&self) -> String {
        let number: u32 = OsRng.gen_range(100_000..999_999);
        format!("{TOKEN_PREFIX}{number}")
    }

    /// Draw tokens until one has no stored mapping
    ///
    /// Returns `None` when every attempt hit an existing mapping. A failed
    /// store read releases the current draw unchecked.
    fn unused_token(&self) -> Option<String> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = self.generate_token();
            match self.store.get(&token_key(&token)) {
                Ok(Some(_)) => continue,
                Ok(None) => return Some(token),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to check token mapping");
                    return Some(token);
                }
            }
        }
        None
    }

    /// Original string form of a token, if the mapping is stored
    pub fn resolve(&self, token: &str) -> Result<Option<String>> {
        self.store.get(&token_key(token))
    }
}

impl Masker for TokenMasker {
    fn mask(&self, value: &ScalarValue, _policy: &MaskingPolicy) -> Result<ScalarValue> {
        let Some(token) = self.unused_token() else {
            // Existing mappings are never overwritten; the token is released
            // without one
            tracing::warn!(
                attempts = MAX_TOKEN_ATTEMPTS,
                "No unused token found, releasing token without mapping"
            );
            return Ok(ScalarValue::Text(self.generate_token()));
        };

        // The token is still released when the mapping cannot be stored
        if let Err(e) = self.store.put(&token_key(&token), &value.to_string()) {
            tracing::warn!(error = %e, "Failed to store token mapping");
        }

        Ok(ScalarValue::Text(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{DataType, MaskingTechnique};
    use crate::domain::CloakError;
    use crate::store::InMemoryPolicyStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenStore;

    impl PolicyStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CloakError::StorageUnavailable("offline".to_string()))
        }
        fn put(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CloakError::StorageUnavailable("offline".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(CloakError::StorageUnavailable("offline".to_string()))
        }
    }

    /// Reports every token as taken and counts writes
    #[derive(Default)]
    struct FullStore {
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl PolicyStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Some("someone else".to_string()))
        }
        fn put(&self, _key: &str, _value: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    fn policy() -> MaskingPolicy {
        MaskingPolicy::new(DataType::PersonalIdentifier, MaskingTechnique::Tokenization)
    }

    #[test]
    fn test_token_format_and_mapping() {
        let store = Arc::new(InMemoryPolicyStore::new());
        let masker = TokenMasker::new(store.clone());

        let token = masker.mask(&ScalarValue::from("Jane Doe"), &policy()).unwrap();
        let token = token.as_text().unwrap();

        assert!(token.starts_with("TOK_"));
        assert_eq!(token.len(), 10);
        assert!(token[4..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(masker.resolve(token).unwrap().as_deref(), Some("Jane Doe"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_tokenization_uniqueness() {
        let masker = TokenMasker::new(Arc::new(InMemoryPolicyStore::new()));
        let tokens: std::collections::HashSet<String> = (0..20)
            .map(|_| masker.mask(&ScalarValue::Int(1), &policy()).unwrap().to_string())
            .collect();
        assert_eq!(tokens.len(), 20);
    }

    #[test]
    fn test_every_token_resolves_to_its_own_value() {
        let store = Arc::new(InMemoryPolicyStore::new());
        let masker = TokenMasker::new(store.clone());

        let issued: Vec<(String, String)> = (0..3000)
            .map(|i| {
                let original = format!("patient-{i}");
                let token = masker.mask(&ScalarValue::from(original.as_str()), &policy()).unwrap();
                (token.to_string(), original)
            })
            .collect();

        for (token, original) in &issued {
            assert_eq!(masker.resolve(token).unwrap().as_deref(), Some(original.as_str()));
        }
        assert_eq!(store.len(), issued.len());
    }

    #[test]
    fn test_taken_tokens_are_never_overwritten() {
        let store = Arc::new(FullStore::default());
        let masker = TokenMasker::new(store.clone());

        let token = masker.mask(&ScalarValue::from("Jane Doe"), &policy()).unwrap();

        assert!(token.to_string().starts_with("TOK_"));
        assert_eq!(store.reads.load(Ordering::SeqCst), MAX_TOKEN_ATTEMPTS);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_failure_still_returns_token() {
        let masker = TokenMasker::new(Arc::new(BrokenStore));
        let token = masker.mask(&ScalarValue::from("x"), &policy()).unwrap();
        assert!(token.to_string().starts_with("TOK_"));
    }
}
