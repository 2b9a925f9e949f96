//! Domain error types
//!
//! This module defines the error hierarchy for Cloak. Errors carry plain
//! strings so that no third-party error type leaks through the public API.

use thiserror::Error;

/// Main Cloak error type
///
/// Only programmer-error inputs and configuration-time storage failures reach
/// callers as `Err`. Parsing and storage problems met in the middle of a batch
/// transformation are recovered where they happen (see the individual
/// components for the documented fallbacks).
#[derive(Debug, Error)]
pub enum CloakError {
    /// An argument is outside its valid domain (e.g. `epsilon <= 0`)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An arithmetic operation was attempted outside its domain
    /// (e.g. rounding to a range of size zero)
    #[error("Arithmetic domain error: {0}")]
    ArithmeticDomain(String),

    /// The policy store could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A persisted retention policy tuple could not be parsed
    #[error("Malformed policy encoding: {0}")]
    MalformedPolicyEncoding(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl CloakError {
    /// Whether the error originated at the storage boundary
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CloakError {
    fn from(err: std::io::Error) -> Self {
        CloakError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CloakError {
    fn from(err: serde_json::Error) -> Self {
        CloakError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CloakError {
    fn from(err: toml::de::Error) -> Self {
        CloakError::Configuration(format!("TOML parse error: {err}"))
    }
}
