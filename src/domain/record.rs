//! Personal record domain models
//!
//! Input and output units of the k-anonymity engine, plus the numeric series
//! consumed by the differential privacy mechanism.

use super::ids::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A personal record submitted for anonymization
///
/// Records are immutable input: the engine reads them and never retains them
/// past a single call.
///
/// # Examples
///
/// ```
/// use cloak::domain::record::PersonalRecordBuilder;
///
/// let record = PersonalRecordBuilder::new()
///     .id("rec-1")
///     .unwrap()
///     .age(25)
///     .zip_code("10001")
///     .gender("F")
///     .salary(42_000.0)
///     .condition("asthma")
///     .attribute("blood_type", "O+")
///     .build()
///     .unwrap();
///
/// assert_eq!(record.age, 25);
/// assert_eq!(record.sensitive_attributes["blood_type"], "O+");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Record identity
    pub id: RecordId,

    /// Age in years (quasi-identifier)
    pub age: u32,

    /// Postal code (quasi-identifier)
    pub zip_code: String,

    /// Gender (quasi-identifier)
    pub gender: String,

    /// Numeric attribute released as a range bucket
    pub salary: f64,

    /// Primary sensitive attribute (e.g. a diagnosis)
    pub condition: String,

    /// Additional named sensitive attributes
    #[serde(default)]
    pub sensitive_attributes: BTreeMap<String, String>,
}

impl PersonalRecord {
    /// Creates a new builder for constructing a PersonalRecord
    pub fn builder() -> PersonalRecordBuilder {
        PersonalRecordBuilder::default()
    }
}

/// Builder for constructing PersonalRecord instances
#[derive(Debug, Default)]
pub struct PersonalRecordBuilder {
    id: Option<RecordId>,
    age: Option<u32>,
    zip_code: Option<String>,
    gender: Option<String>,
    salary: f64,
    condition: Option<String>,
    sensitive_attributes: BTreeMap<String, String>,
}

impl PersonalRecordBuilder {
    /// Creates a new PersonalRecordBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the record ID
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is blank
    pub fn id(mut self, id: impl Into<String>) -> Result<Self, String> {
        self.id = Some(RecordId::new(id)?);
        Ok(self)
    }

    /// Sets the age
    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the postal code
    pub fn zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = Some(zip_code.into());
        self
    }

    /// Sets the gender
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Sets the salary (defaults to 0.0)
    pub fn salary(mut self, salary: f64) -> Self {
        self.salary = salary;
        self
    }

    /// Sets the primary sensitive attribute
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Adds a named sensitive attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.sensitive_attributes.insert(name.into(), value.into());
        self
    }

    /// Builds the PersonalRecord
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<PersonalRecord, String> {
        Ok(PersonalRecord {
            id: self.id.ok_or("id is required")?,
            age: self.age.ok_or("age is required")?,
            zip_code: self.zip_code.ok_or("zip_code is required")?,
            gender: self.gender.ok_or("gender is required")?,
            salary: self.salary,
            condition: self.condition.ok_or("condition is required")?,
            sensitive_attributes: self.sensitive_attributes,
        })
    }
}

/// Anonymized view of a [`PersonalRecord`]
///
/// One-to-one with the input record inside its k-anonymous group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizedRecord {
    /// First 8 hex characters of the SHA-256 of the record ID
    pub id_hash: String,

    /// Age bucket (`<18`, `18-29`, `30-49`, `50-64`, `65+`)
    pub age_range: String,

    /// Zip prefix with wildcard padding
    pub zip_prefix: String,

    /// Gender, released as-is
    pub gender: String,

    /// Salary bucket
    pub salary_range: String,

    /// Sensitive attribute, unchanged (only grouped)
    pub condition: String,

    /// Achieved k: size of the group the record was released in
    pub anonymity_level: usize,

    /// Achieved l: distinct sensitive values in that group
    pub diversity_level: usize,
}

/// Ordered numeric data with additive metadata
///
/// Input and output of the differential privacy mechanism. Noise parameters
/// are appended to the metadata; nothing is ever removed from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericSeries {
    /// The values, in order
    pub values: Vec<f64>,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl NumericSeries {
    /// Creates a series with empty metadata
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reads a numeric metadata entry
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(Value::as_f64)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
