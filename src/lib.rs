// Cloak - Personal Record Anonymization Engine
// Copyright (c) 2025 Cloak Contributors
// Licensed under the MIT License

//! # Cloak - Personal Record Anonymization
//!
//! Cloak anonymizes structured personal records so they can be retained,
//! analyzed or exported without re-identifying individuals, while staying
//! within a configurable retention window.
//!
//! ## Overview
//!
//! This library provides:
//! - **k-anonymity** grouping of records on their quasi-identifiers, with
//!   backfill and generalization of undersized groups
//! - **l-diversity** scoring of each released group
//! - **Differential privacy** for numeric series via the Laplace mechanism
//! - **Masking** of single values (hash, generalization, suppression,
//!   perturbation, substitution, tokenization)
//! - **Retention policies** that keep, anonymize or delete values as they age
//!
//! ## Architecture
//!
//! - [`anonymization`] - The engine and its components
//! - [`domain`] - Core domain types and errors
//! - [`store`] - Key/value persistence of policies, tokens and timestamps
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloak::anonymization::{AnonymizationEngine, AnonymizationTally};
//! use cloak::config::load_config;
//! use cloak::domain::NumericSeries;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cloak.toml")?;
//!     let _guard = cloak::logging::init_logging(&config.application.log_level, &config.logging)?;
//!
//!     let engine = AnonymizationEngine::from_config(&config)?;
//!     let mut tally = AnonymizationTally::new();
//!
//!     let salaries = NumericSeries::new(vec![42_000.0, 51_500.0, 38_250.0]);
//!     let noisy = engine.apply_differential_privacy(&salaries, 0.5, &mut tally)?;
//!
//!     println!("{:?}", noisy.values);
//!     println!("{}", engine.anonymization_stats(&tally).format_console());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Cloak uses the [`domain::CloakError`] type for all errors. Parsing and
//! storage problems met in the middle of a transformation are recovered with
//! documented fallbacks; only invalid arguments and configuration-time
//! storage failures reach the caller.
//!
//! ## Logging
//!
//! Cloak logs through the `tracing` crate. Raw personal values are never
//! logged, only hashes, counts and policy names.

pub mod anonymization;
pub mod config;
pub mod domain;
pub mod logging;
pub mod store;
