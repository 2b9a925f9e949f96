//! Generalization masking

use super::{initial_mask, Masker};
use crate::anonymization::generalize::{age_range, round_to_range};
use crate::anonymization::models::{DataType, MaskingPolicy};
use crate::domain::{Result, ScalarValue};

/// Marker for personal identifiers with no meaningful coarser form
pub const GENERALIZED_MARKER: &str = "GENERALIZED";

/// Coarsens values into ranges or prefixes depending on the data type
///
/// | Data type | Input | Output |
/// |---|---|---|
/// | `PERSONAL_IDENTIFIER` | int or all-digit text | age bucket |
/// | `PERSONAL_IDENTIFIER` | other text | first char + `***` |
/// | `PERSONAL_IDENTIFIER` | float | `GENERALIZED` |
/// | `QUASI_IDENTIFIER` | text of 5+ chars | first 3 chars + `**` |
/// | `NUMERIC_DATA` | float | truncated to a multiple of the range size |
/// | `NUMERIC_DATA` | int | truncated to a multiple of 10 |
///
/// Everything else passes through.
#[derive(Debug, Clone, Copy)]
pub struct GeneralizationMasker {
    range_size: f64,
}

impl GeneralizationMasker {
    pub fn new(range_size: f64) -> Self {
        Self { range_size }
    }
}

impl Default for GeneralizationMasker {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl Masker for GeneralizationMasker {
    fn mask(&self, value: &ScalarValue, policy: &MaskingPolicy) -> Result<ScalarValue> {
        let masked = match (policy.data_type, value) {
            (DataType::PersonalIdentifier, ScalarValue::Int(v)) => ScalarValue::from(age_range(*v)),
            (DataType::PersonalIdentifier, ScalarValue::Text(s)) if value.is_digit_text() => {
                // Digit strings too long for an integer count as zero
                ScalarValue::from(age_range(s.parse().unwrap_or(0)))
            }
            (DataType::PersonalIdentifier, ScalarValue::Text(s)) => {
                ScalarValue::from(initial_mask(s))
            }
            (DataType::PersonalIdentifier, ScalarValue::Float(_)) => {
                ScalarValue::from(GENERALIZED_MARKER)
            }
            (DataType::QuasiIdentifier, ScalarValue::Text(s)) if s.chars().count() >= 5 => {
                let mut prefix: String = s.chars().take(3).collect();
                prefix.push_str("**");
                ScalarValue::from(prefix)
            }
            (DataType::NumericData, ScalarValue::Float(v)) => {
                ScalarValue::Float(round_to_range(*v, self.range_size)?)
            }
            (DataType::NumericData, ScalarValue::Int(v)) => ScalarValue::Int(v / 10 * 10),
            _ => value.clone(),
        };
        Ok(masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::MaskingTechnique;
    use crate::domain::CloakError;
    use test_case::test_case;

    fn mask(data_type: DataType, value: ScalarValue) -> ScalarValue {
        let policy = MaskingPolicy::new(data_type, MaskingTechnique::Generalization);
        GeneralizationMasker::default().mask(&value, &policy).unwrap()
    }

    #[test_case(ScalarValue::Int(34), "30-49")]
    #[test_case(ScalarValue::from("17"), "<18")]
    #[test_case(ScalarValue::from("99999999999999999999999"), "<18")]
    #[test_case(ScalarValue::from("Jane"), "J***")]
    #[test_case(ScalarValue::Float(34.5), "GENERALIZED")]
    fn test_personal_identifier(value: ScalarValue, expected: &str) {
        assert_eq!(mask(DataType::PersonalIdentifier, value), ScalarValue::from(expected));
    }

    #[test]
    fn test_quasi_identifier() {
        assert_eq!(
            mask(DataType::QuasiIdentifier, ScalarValue::from("10001")),
            ScalarValue::from("100**")
        );
        assert_eq!(
            mask(DataType::QuasiIdentifier, ScalarValue::from("1000")),
            ScalarValue::from("1000")
        );
        assert_eq!(
            mask(DataType::QuasiIdentifier, ScalarValue::Int(10001)),
            ScalarValue::Int(10001)
        );
    }

    #[test]
    fn test_numeric_data() {
        assert_eq!(
            mask(DataType::NumericData, ScalarValue::Float(52_345.67)),
            ScalarValue::Float(52_000.0)
        );
        assert_eq!(mask(DataType::NumericData, ScalarValue::Int(47)), ScalarValue::Int(40));
        assert_eq!(mask(DataType::NumericData, ScalarValue::Int(-47)), ScalarValue::Int(-40));
        assert_eq!(
            mask(DataType::NumericData, ScalarValue::from("47")),
            ScalarValue::from("47")
        );
    }

    #[test]
    fn test_custom_range_size() {
        let policy = MaskingPolicy::new(DataType::NumericData, MaskingTechnique::Generalization);
        let masked = GeneralizationMasker::new(250.0)
            .mask(&ScalarValue::Float(1_120.0), &policy)
            .unwrap();
        assert_eq!(masked, ScalarValue::Float(1_000.0));
    }

    #[test]
    fn test_zero_range_size_is_an_error() {
        let policy = MaskingPolicy::new(DataType::NumericData, MaskingTechnique::Generalization);
        let result = GeneralizationMasker::new(0.0).mask(&ScalarValue::Float(1.0), &policy);
        assert!(matches!(result, Err(CloakError::ArithmeticDomain(_))));
    }

    #[test]
    fn test_other_types_unchanged() {
        let value = ScalarValue::from("O+");
        assert_eq!(mask(DataType::BiometricData, value.clone()), value);
        assert_eq!(mask(DataType::SensitiveAttribute, value.clone()), value);
    }
}
