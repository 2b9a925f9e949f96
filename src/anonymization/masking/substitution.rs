//! Substitution masking

use super::{initial_mask, Masker};
use crate::anonymization::models::{DataType, MaskingPolicy};
use crate::domain::{CloakError, Result, ScalarValue};
use rand::Rng;
use regex::Regex;

/// Fixed-length numeric pattern whose values keep their last three characters
pub const DEFAULT_QUASI_PATTERN: &str = r"^[0-9]{5}$";

/// Replaces identifiers with synthetic placeholders
///
/// Personal identifiers become a labelled random token sized by the length of
/// their string form. Quasi-identifier text matching the policy's pattern
/// (default: five digits) keeps its last three characters behind two random
/// digits when `preserve_format` is set; any other quasi-identifier text
/// becomes its first character plus `***`.
#[derive(Debug, Clone)]
pub struct SubstitutionMasker {
    default_pattern: Option<Regex>,
}

impl SubstitutionMasker {
    pub fn new() -> Self {
        Self {
            default_pattern: Regex::new(DEFAULT_QUASI_PATTERN).ok(),
        }
    }

    /// Substitute with the given random source
    pub fn substitute<R: Rng + ?Sized>(
        &self,
        value: &ScalarValue,
        policy: &MaskingPolicy,
        rng: &mut R,
    ) -> Result<ScalarValue> {
        match policy.data_type {
            DataType::PersonalIdentifier => Ok(ScalarValue::Text(identifier_substitute(
                value.to_string().chars().count(),
                rng,
            ))),
            DataType::QuasiIdentifier => match value {
                ScalarValue::Text(s) => {
                    if policy.preserve_format && self.pattern_for(policy)?.is_match(s) {
                        Ok(ScalarValue::Text(keep_suffix(s, rng)))
                    } else {
                        Ok(ScalarValue::Text(initial_mask(s)))
                    }
                }
                _ => Ok(value.clone()),
            },
            _ => Ok(value.clone()),
        }
    }

    fn pattern_for(&self, policy: &MaskingPolicy) -> Result<Regex> {
        if let Some(ref custom) = policy.custom_pattern {
            match Regex::new(custom) {
                Ok(re) => return Ok(re),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Invalid custom substitution pattern, using the default"
                ),
            }
        }
        self.default_pattern.clone().ok_or_else(|| {
            CloakError::InvalidArgument(
                "default substitution pattern failed to compile".to_string(),
            )
        })
    }
}

impl Default for SubstitutionMasker {
    fn default() -> Self {
        Self::new()
    }
}

impl Masker for SubstitutionMasker {
    fn mask(&self, value: &ScalarValue, policy: &MaskingPolicy) -> Result<ScalarValue> {
        self.substitute(value, policy, &mut rand::thread_rng())
    }
}

/// `SUB##` for 1-5 chars, `SUBSTITUTE###` for 6-10, `SUBSTITUTE_####` otherwise
fn identifier_substitute<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    match len {
        1..=5 => format!("SUB{}", rng.gen_range(10..99)),
        6..=10 => format!("SUBSTITUTE{}", rng.gen_range(100..999)),
        _ => format!("SUBSTITUTE_{}", rng.gen_range(1000..9999)),
    }
}

fn keep_suffix<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let chars: Vec<char> = text.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    format!("{}{}", rng.gen_range(10..99), tail)
}
