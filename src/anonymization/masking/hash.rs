//! Hash masking

use super::Masker;
use crate::anonymization::generalize::short_hash;
use crate::anonymization::models::MaskingPolicy;
use crate::domain::{Result, ScalarValue};

/// Replaces any value with the first 8 hex characters of the SHA-256 of its
/// string form
#[derive(Debug, Clone, Copy, Default)]
pub struct HashMasker;

impl Masker for HashMasker {
    fn mask(&self, value: &ScalarValue, _policy: &MaskingPolicy) -> Result<ScalarValue> {
        Ok(ScalarValue::Text(short_hash(&value.to_string())))
    }
}
