//! Suppression masking

use super::Masker;
use crate::anonymization::models::{DataType, MaskingPolicy};
use crate::domain::{Result, ScalarValue};

/// Marker replacing suppressed sensitive attributes
pub const SUPPRESSED_MARKER: &str = "***SUPPRESSED***";

/// Marker replacing suppressed personal identifiers
pub const IDENTIFIER_MARKER: &str = "*****";

/// Replaces sensitive attributes and personal identifiers with fixed markers
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressionMasker;

impl Masker for SuppressionMasker {
    fn mask(&self, value: &ScalarValue, policy: &MaskingPolicy) -> Result<ScalarValue> {
        Ok(match policy.data_type {
            DataType::SensitiveAttribute => ScalarValue::from(SUPPRESSED_MARKER),
            DataType::PersonalIdentifier => ScalarValue::from(IDENTIFIER_MARKER),
            _ => value.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::MaskingTechnique;

    fn policy(data_type: DataType) -> MaskingPolicy {
        MaskingPolicy::new(data_type, MaskingTechnique::Suppression)
    }

    #[test]
    fn test_suppression_markers() {
        let value = ScalarValue::from("HIV positive");
        assert_eq!(
            SuppressionMasker.mask(&value, &policy(DataType::SensitiveAttribute)).unwrap(),
            ScalarValue::from("***SUPPRESSED***")
        );
        assert_eq!(
            SuppressionMasker
                .mask(&ScalarValue::Int(7), &policy(DataType::PersonalIdentifier))
                .unwrap(),
            ScalarValue::from("*****")
        );
    }

    #[test]
    fn test_other_types_unchanged() {
        let value = ScalarValue::Float(3.5);
        for data_type in [
            DataType::QuasiIdentifier,
            DataType::NumericData,
            DataType::BiometricData,
        ] {
            assert_eq!(SuppressionMasker.mask(&value, &policy(data_type)).unwrap(), value);
        }
    }
}
