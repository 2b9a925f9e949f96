//! Retention policy evaluation and persisted policy encoding
//!
//! A policy set is persisted as `TYPE:days:LEVEL:autoDelete` tuples joined by
//! `;`, for example:
//!
//! ```text
//! PERSONAL_IDENTIFIER:30:STRONG:true;NUMERIC_DATA:365:BASIC:false
//! ```

use super::masking::MaskingDispatcher;
use super::models::{AnonymizationLevel, DataType, MaskingPolicy, MaskingTechnique, RetentionPolicy};
use crate::domain::{CloakError, Result, ScalarValue};
use chrono::{DateTime, Utc};

/// Replacement value for `COMPLETE` anonymization
pub const COMPLETE_MARKER: &str = "***ANONYMIZED***";

/// Outcome of evaluating a value against its retention policy
#[derive(Debug, Clone, PartialEq)]
pub enum RetentionAction {
    /// Still inside the retention window; value unchanged
    Keep(ScalarValue),
    /// Window passed; value anonymized at `level`
    Anonymize {
        level: AnonymizationLevel,
        value: ScalarValue,
    },
    /// Window passed and the policy deletes
    Delete,
}

impl RetentionAction {
    /// The value to release, `None` when the value must be deleted
    pub fn into_value(self) -> Option<ScalarValue> {
        match self {
            Self::Keep(value) | Self::Anonymize { value, .. } => Some(value),
            Self::Delete => None,
        }
    }

    /// Whether the value must be deleted
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// Decides keep / anonymize / delete from a value's age
pub struct RetentionEvaluator<'a> {
    masking: &'a MaskingDispatcher,
}

impl<'a> RetentionEvaluator<'a> {
    pub fn new(masking: &'a MaskingDispatcher) -> Self {
        Self { masking }
    }

    /// Evaluate `value`, created at `created_at`, as of `now`
    ///
    /// A value exactly at the end of its window is kept. A creation time in
    /// the future counts as age zero.
    pub fn evaluate(
        &self,
        value: &ScalarValue,
        policy: &RetentionPolicy,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RetentionAction {
        let age_ms = (now - created_at).num_milliseconds();
        if age_ms <= policy.retention_ms() {
            return RetentionAction::Keep(value.clone());
        }

        if policy.auto_delete {
            tracing::debug!(data_type = %policy.data_type, "Retention window passed, deleting");
            return RetentionAction::Delete;
        }

        let level = policy.anonymization_level;
        tracing::debug!(
            data_type = %policy.data_type,
            level = %level,
            "Retention window passed, anonymizing"
        );
        RetentionAction::Anonymize {
            level,
            value: self.apply_level(value, level),
        }
    }

    /// Anonymize `value` at a fixed level
    pub fn apply_level(&self, value: &ScalarValue, level: AnonymizationLevel) -> ScalarValue {
        let policy = match level {
            AnonymizationLevel::None => return value.clone(),
            AnonymizationLevel::Complete => return ScalarValue::from(COMPLETE_MARKER),
            AnonymizationLevel::Basic => {
                MaskingPolicy::new(DataType::PersonalIdentifier, MaskingTechnique::Generalization)
            }
            AnonymizationLevel::Moderate => {
                MaskingPolicy::new(DataType::QuasiIdentifier, MaskingTechnique::Hash)
            }
            AnonymizationLevel::Strong => {
                MaskingPolicy::new(DataType::SensitiveAttribute, MaskingTechnique::Suppression)
            }
        };
        self.masking.mask(value, &policy)
    }
}

/// Policies used when none are configured
pub fn default_policies() -> Vec<RetentionPolicy> {
    vec![
        RetentionPolicy::new(DataType::PersonalIdentifier, 30, AnonymizationLevel::Strong, true),
        RetentionPolicy::new(DataType::QuasiIdentifier, 90, AnonymizationLevel::Moderate, true),
        RetentionPolicy::new(DataType::SensitiveAttribute, 7, AnonymizationLevel::Complete, true),
        RetentionPolicy::new(DataType::NumericData, 365, AnonymizationLevel::Basic, true),
        RetentionPolicy::new(DataType::BiometricData, 1, AnonymizationLevel::Complete, true),
    ]
}

/// Default policy for one data type
pub fn default_policy_for(data_type: DataType) -> RetentionPolicy {
    default_policies()
        .into_iter()
        .find(|p| p.data_type == data_type)
        .unwrap_or_else(|| {
            RetentionPolicy::new(data_type, 30, AnonymizationLevel::Complete, true)
        })
}

/// Encode a single policy tuple
pub fn encode_policy(policy: &RetentionPolicy) -> String {
    format!(
        "{}:{}:{}:{}",
        policy.data_type, policy.retention_days, policy.anonymization_level, policy.auto_delete
    )
}

/// Encode a policy set
///
/// # Errors
///
/// Returns [`CloakError::InvalidArgument`] if any policy has zero retention
/// days.
pub fn encode_policies(policies: &[RetentionPolicy]) -> Result<String> {
    if let Some(bad) = policies.iter().find(|p| p.retention_days == 0) {
        return Err(CloakError::InvalidArgument(format!(
            "retention_days must be positive for {}",
            bad.data_type
        )));
    }
    Ok(policies
        .iter()
        .map(encode_policy)
        .collect::<Vec<_>>()
        .join(";"))
}

/// Parse a single policy tuple
///
/// # Errors
///
/// Returns [`CloakError::MalformedPolicyEncoding`] on a wrong field count, an
/// unknown enum name, non-positive or unparsable days, or a flag other than
/// `true`/`false`.
pub fn parse_policy(tuple: &str) -> Result<RetentionPolicy> {
    let malformed =
        |reason: String| CloakError::MalformedPolicyEncoding(format!("{tuple:?}: {reason}"));

    let parts: Vec<&str> = tuple.split(':').collect();
    let [data_type, days, level, auto_delete] = parts.as_slice() else {
        return Err(malformed(format!("expected 4 fields, found {}", parts.len())));
    };

    let data_type: DataType = data_type.trim().parse().map_err(malformed)?;
    let retention_days: u32 = days
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid retention days {days:?}")))?;
    if retention_days == 0 {
        return Err(malformed("retention days must be positive".to_string()));
    }
    let anonymization_level: AnonymizationLevel = level.trim().parse().map_err(malformed)?;
    let auto_delete = match auto_delete.trim() {
        "true" => true,
        "false" => false,
        other => return Err(malformed(format!("invalid auto-delete flag {other:?}"))),
    };

    Ok(RetentionPolicy::new(
        data_type,
        retention_days,
        anonymization_level,
        auto_delete,
    ))
}

/// Decode a persisted policy set
///
/// Malformed tuples are skipped with a warning. An empty encoding, or one in
/// which every tuple is malformed, yields [`default_policies`].
pub fn decode_policies(encoded: &str) -> Vec<RetentionPolicy> {
    if encoded.trim().is_empty() {
        return default_policies();
    }

    let policies: Vec<RetentionPolicy> = encoded
        .split(';')
        .filter(|tuple| !tuple.trim().is_empty())
        .filter_map(|tuple| match parse_policy(tuple) {
            Ok(policy) => Some(policy),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed retention policy");
                None
            }
        })
        .collect();

    if policies.is_empty() {
        tracing::warn!("No valid retention policies stored, using defaults");
        return default_policies();
    }
    policies
}
