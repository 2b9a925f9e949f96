//! Anonymization data models

pub mod policy;

pub use policy::{AnonymizationLevel, DataType, MaskingPolicy, MaskingTechnique, RetentionPolicy};
