//! Masking and retention policy models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a field, driving how each technique treats it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Direct identifiers (names, ids)
    PersonalIdentifier,
    /// Attributes identifying in combination (age, zip, gender)
    QuasiIdentifier,
    /// Attributes that must not be linked to a person (diagnoses)
    SensitiveAttribute,
    /// Numeric measurements (salary, counts)
    NumericData,
    /// Biometric templates
    BiometricData,
}

impl DataType {
    /// All data types, in declaration order
    pub const ALL: [DataType; 5] = [
        Self::PersonalIdentifier,
        Self::QuasiIdentifier,
        Self::SensitiveAttribute,
        Self::NumericData,
        Self::BiometricData,
    ];

    /// Enum name as used in the persisted encoding
    pub fn name(&self) -> &'static str {
        match self {
            Self::PersonalIdentifier => "PERSONAL_IDENTIFIER",
            Self::QuasiIdentifier => "QUASI_IDENTIFIER",
            Self::SensitiveAttribute => "SENSITIVE_ATTRIBUTE",
            Self::NumericData => "NUMERIC_DATA",
            Self::BiometricData => "BIOMETRIC_DATA",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("Unknown data type: {s}"))
    }
}

/// Masking transform to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaskingTechnique {
    /// Truncated SHA-256 digest
    Hash,
    /// Coarsen into a range or prefix
    Generalization,
    /// Replace with a redaction marker
    Suppression,
    /// Add bounded random noise
    Perturbation,
    /// Replace with a synthetic placeholder
    Substitution,
    /// Replace with a reversible opaque token
    Tokenization,
}

/// Declarative masking policy
///
/// # Examples
///
/// ```
/// use cloak::anonymization::models::{DataType, MaskingPolicy, MaskingTechnique};
///
/// let policy = MaskingPolicy::new(DataType::QuasiIdentifier, MaskingTechnique::Substitution)
///     .with_custom_pattern(r"^\d{4}$");
/// assert!(policy.preserve_format);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingPolicy {
    /// Category of the masked field
    pub data_type: DataType,

    /// Technique to apply
    pub technique: MaskingTechnique,

    /// Keep part of the original shape where the technique allows it
    #[serde(default = "default_preserve_format")]
    pub preserve_format: bool,

    /// Regex overriding the fixed-length numeric pattern used by substitution
    #[serde(default)]
    pub custom_pattern: Option<String>,
}

fn default_preserve_format() -> bool {
    true
}

impl MaskingPolicy {
    /// Create a policy with `preserve_format = true` and no custom pattern
    pub fn new(data_type: DataType, technique: MaskingTechnique) -> Self {
        Self {
            data_type,
            technique,
            preserve_format: true,
            custom_pattern: None,
        }
    }

    /// Set the preserve-format flag
    pub fn with_preserve_format(mut self, preserve_format: bool) -> Self {
        self.preserve_format = preserve_format;
        self
    }

    /// Set the custom pattern
    pub fn with_custom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_pattern = Some(pattern.into());
        self
    }
}

/// Anonymization strength, totally ordered from weakest to strongest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnonymizationLevel {
    /// Pass-through
    None,
    /// Generalize as a personal identifier
    Basic,
    /// Hash as a quasi-identifier
    Moderate,
    /// Suppress as a sensitive attribute
    Strong,
    /// Replace with the full redaction marker
    Complete,
}

impl AnonymizationLevel {
    /// All levels, weakest first
    pub const ALL: [AnonymizationLevel; 5] = [
        Self::None,
        Self::Basic,
        Self::Moderate,
        Self::Strong,
        Self::Complete,
    ];

    /// Enum name as used in the persisted encoding
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Basic => "BASIC",
            Self::Moderate => "MODERATE",
            Self::Strong => "STRONG",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for AnonymizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnonymizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.name() == s)
            .ok_or_else(|| format!("Unknown anonymization level: {s}"))
    }
}

/// Retention rule for one data type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Data type the rule covers
    pub data_type: DataType,

    /// Days a value may be kept untouched (> 0)
    pub retention_days: u32,

    /// Level applied once the window has passed
    pub anonymization_level: AnonymizationLevel,

    /// Delete instead of anonymizing once the window has passed
    #[serde(default = "default_auto_delete")]
    pub auto_delete: bool,
}

fn default_auto_delete() -> bool {
    true
}

impl RetentionPolicy {
    /// Create a retention policy
    pub fn new(
        data_type: DataType,
        retention_days: u32,
        anonymization_level: AnonymizationLevel,
        auto_delete: bool,
    ) -> Self {
        Self {
            data_type,
            retention_days,
            anonymization_level,
            auto_delete,
        }
    }

    /// Retention window in milliseconds
    pub fn retention_ms(&self) -> i64 {
        i64::from(self.retention_days) * 86_400_000
    }
}
