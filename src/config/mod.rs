//! Configuration management for Cloak.
//!
//! # Overview
//!
//! Cloak uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CLOAK_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [engine]
//! default_k = 3
//! default_l = 2
//! privacy_budget = 1.0
//! numeric_range_size = 1000.0
//!
//! [store]
//! backend = "file"
//! path = "${CLOAK_STORE_DIR}/policies.json"
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cloak::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cloak.toml")?;
//! println!("k = {}, l = {}", config.engine.default_k, config.engine.default_l);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{ApplicationConfig, CloakConfig, LoggingConfig, StoreBackend, StoreConfig};
