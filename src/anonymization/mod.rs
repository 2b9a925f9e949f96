//! Anonymization module for Cloak
//!
//! This module turns personal records, numeric series and single field values
//! into forms that can be retained or released without re-identifying
//! individuals.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Generalization**: pure bucket, prefix and distance helpers ([`generalize`])
//! - **Grouping**: k-anonymity partitioning with backfill ([`grouping`])
//! - **Diversity**: l-diversity scoring of each group ([`diversity`])
//! - **Differential privacy**: calibrated Laplace noise ([`privacy`])
//! - **Masking**: six policy-selected techniques ([`masking`])
//! - **Retention**: keep / anonymize / delete by data age ([`retention`])
//!
//! [`AnonymizationEngine`] wires these to a policy store.
//!
//! # Usage
//!
//! ```rust
//! use cloak::anonymization::{AnonymizationEngine, EngineConfig};
//! use cloak::anonymization::models::{DataType, MaskingPolicy, MaskingTechnique};
//! use cloak::domain::ScalarValue;
//! use cloak::store::InMemoryPolicyStore;
//! use std::sync::Arc;
//!
//! let engine = AnonymizationEngine::new(
//!     EngineConfig::default(),
//!     Arc::new(InMemoryPolicyStore::new()),
//! )?;
//! let masked = engine.mask_by_data_type(
//!     &ScalarValue::from("diabetes"),
//!     &MaskingPolicy::new(DataType::SensitiveAttribute, MaskingTechnique::Suppression),
//! );
//! assert_eq!(masked, ScalarValue::from("***SUPPRESSED***"));
//! # Ok::<(), cloak::domain::CloakError>(())
//! ```

pub mod config;
pub mod diversity;
pub mod engine;
pub mod generalize;
pub mod grouping;
pub mod masking;
pub mod models;
pub mod privacy;
pub mod retention;
pub mod stats;

// Re-export main types
pub use config::EngineConfig;
pub use engine::AnonymizationEngine;
pub use retention::RetentionAction;
pub use stats::{AnonymizationStats, AnonymizationTally};
