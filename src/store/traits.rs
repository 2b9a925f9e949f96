//! Policy store abstraction
//!
//! The engine persists exactly three kinds of keys through this interface:
//! the encoded retention policy set, tokenization mappings, and per-value
//! creation timestamps.

use crate::domain::Result;

/// Store key holding the encoded retention policy set
pub const RETENTION_POLICIES_KEY: &str = "retention_policies";

/// Prefix of tokenization mapping keys (`token_<token>`)
pub const TOKEN_KEY_PREFIX: &str = "token_";

/// Prefix of creation timestamp keys (`creation_time_<hash>`)
pub const CREATION_TIME_KEY_PREFIX: &str = "creation_time_";

/// Key/value persistence consumed by the engine
///
/// Implementations must make each single-key operation atomic; the engine
/// performs no locking of its own. Failures are reported as
/// [`CloakError::StorageUnavailable`](crate::domain::CloakError::StorageUnavailable).
pub trait PolicyStore: Send + Sync {
    /// Read a value
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(value))` if found, `Ok(None)` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Build the storage key of a token mapping
pub fn token_key(token: &str) -> String {
    format!("{TOKEN_KEY_PREFIX}{token}")
}

/// Build the storage key of a creation timestamp
pub fn creation_time_key(value_hash: &str) -> String {
    format!("{CREATION_TIME_KEY_PREFIX}{value_hash}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builders() {
        assert_eq!(token_key("TOK_123456"), "token_TOK_123456");
        assert_eq!(creation_time_key("ab12cd34"), "creation_time_ab12cd34");
    }
}
