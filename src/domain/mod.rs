//! Domain models and types for Cloak.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RecordId`])
//! - **Domain models** ([`PersonalRecord`], [`AnonymizedRecord`], [`NumericSeries`],
//!   [`ScalarValue`])
//! - **Error types** ([`CloakError`])
//! - **Result type alias** ([`Result`])
//!
//! # Builder Pattern
//!
//! ```rust
//! use cloak::domain::PersonalRecord;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let record = PersonalRecord::builder()
//!     .id("rec-1")?
//!     .age(34)
//!     .zip_code("94110")
//!     .gender("M")
//!     .condition("diabetes")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod scalar;

// Re-export commonly used types for convenience
pub use errors::CloakError;
pub use ids::RecordId;
pub use record::{AnonymizedRecord, NumericSeries, PersonalRecord, PersonalRecordBuilder};
pub use result::Result;
pub use scalar::ScalarValue;
