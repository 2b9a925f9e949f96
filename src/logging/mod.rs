//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - JSON-formatted local file logging with rotation
//! - Helper macros for the engine's recurring events
//!
//! Raw personal values never go into log fields.
//!
//! # Example
//!
//! ```no_run
//! use cloak::logging::init_logging;
//! use cloak::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a released k-anonymity batch
///
/// # Example
///
/// ```no_run
/// use cloak::log_batch_anonymized;
///
/// log_batch_anonymized!(120, 3);
/// ```
#[macro_export]
macro_rules! log_batch_anonymized {
    ($count:expr, $k:expr) => {
        tracing::info!(records = $count, k = $k, "Batch anonymized");
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cloak::log_error_with_context;
/// use cloak::domain::CloakError;
///
/// let error = CloakError::StorageUnavailable("disk full".to_string());
/// log_error_with_context!(&error, "Failed to persist policies");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
