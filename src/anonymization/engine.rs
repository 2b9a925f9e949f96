//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] facade that wires the
//! grouping, diversity, noise, masking and retention components to a policy
//! store and an [`EngineConfig`].
//!
//! # Examples
//!
//! ```
//! use cloak::anonymization::{AnonymizationEngine, AnonymizationTally, EngineConfig};
//! use cloak::domain::PersonalRecord;
//! use cloak::store::InMemoryPolicyStore;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AnonymizationEngine::new(
//!     EngineConfig::default(),
//!     Arc::new(InMemoryPolicyStore::new()),
//! )?;
//!
//! let records = vec![
//!     PersonalRecord::builder().id("1")?.age(25).zip_code("10001").gender("F")
//!         .condition("A").build()?,
//!     PersonalRecord::builder().id("2")?.age(27).zip_code("10002").gender("F")
//!         .condition("B").build()?,
//! ];
//!
//! let mut tally = AnonymizationTally::new();
//! let released = engine.anonymize_with_k_anonymity(&records, 2, &mut tally);
//! assert!(released.iter().all(|r| r.anonymity_level == 2 && r.diversity_level == 2));
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    config::EngineConfig,
    diversity::{DiversityScorer, SensitiveAttribute},
    generalize::short_hash,
    grouping::KAnonymizer,
    masking::MaskingDispatcher,
    models::{DataType, MaskingPolicy, RetentionPolicy},
    privacy::LaplaceMechanism,
    retention::{self, RetentionAction, RetentionEvaluator},
    stats::{AnonymizationStats, AnonymizationTally},
};
use crate::config::CloakConfig;
use crate::domain::{
    AnonymizedRecord, CloakError, NumericSeries, PersonalRecord, Result, ScalarValue,
};
use crate::store::traits::{creation_time_key, RETENTION_POLICIES_KEY};
use crate::store::{create_store, PolicyStore};
use crate::{log_batch_anonymized, log_error_with_context};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

/// Main anonymization engine
///
/// Holds no mutable state of its own: counters live in a caller-owned
/// [`AnonymizationTally`], and only tokenization, policy configuration and
/// creation-time recording write to the store.
///
/// # Thread Safety
///
/// The engine is `Send + Sync` and can be shared behind an `Arc`. Store
/// implementations make each single-key operation atomic.
pub struct AnonymizationEngine {
    config: EngineConfig,
    store: Arc<dyn PolicyStore>,
    grouper: KAnonymizer,
    masking: MaskingDispatcher,
}

impl AnonymizationEngine {
    /// Create a new anonymization engine
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::Configuration`] if the engine configuration is
    /// invalid.
    pub fn new(config: EngineConfig, store: Arc<dyn PolicyStore>) -> Result<Self> {
        config.validate().map_err(|e| {
            CloakError::Configuration(format!("Invalid engine configuration: {}", e))
        })?;

        let scorer = DiversityScorer::new(SensitiveAttribute::from_config(
            config.diversity_attribute.as_deref(),
        ));
        let grouper = KAnonymizer::new(config.default_l, scorer);
        let masking = MaskingDispatcher::new(config.numeric_range_size, store.clone());

        tracing::debug!(
            default_k = config.default_k,
            default_l = config.default_l,
            privacy_budget = config.privacy_budget,
            "Anonymization engine created"
        );

        Ok(Self {
            config,
            store,
            grouper,
            masking,
        })
    }

    /// Create an engine and its store from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the engine
    /// configuration is invalid.
    pub fn from_config(config: &CloakConfig) -> Result<Self> {
        let store = create_store(&config.store)?;
        Self::new(config.engine.clone(), store)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Release `records` as k-anonymous groups
    ///
    /// Output is one record per input record, emitted group by group. Each
    /// record carries the size of its final group as achieved k and the
    /// group's distinct sensitive-value count as achieved l.
    pub fn anonymize_with_k_anonymity(
        &self,
        records: &[PersonalRecord],
        k: usize,
        tally: &mut AnonymizationTally,
    ) -> Vec<AnonymizedRecord> {
        let released = self.grouper.anonymize(records, k);
        tally.record_batch(released.len());
        log_batch_anonymized!(released.len(), k);
        released
    }

    /// Add Laplace noise to `series` with epsilon `epsilon`
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidArgument`] when `epsilon` is not a
    /// positive finite number.
    pub fn apply_differential_privacy(
        &self,
        series: &NumericSeries,
        epsilon: f64,
        tally: &mut AnonymizationTally,
    ) -> Result<NumericSeries> {
        self.apply_differential_privacy_with(series, epsilon, rand::thread_rng(), tally)
    }

    /// [`apply_differential_privacy`](Self::apply_differential_privacy) with
    /// a caller-supplied random source
    pub fn apply_differential_privacy_with<R: Rng>(
        &self,
        series: &NumericSeries,
        epsilon: f64,
        rng: R,
        tally: &mut AnonymizationTally,
    ) -> Result<NumericSeries> {
        let noisy = LaplaceMechanism::new(rng).apply_noise(series, epsilon)?;
        tally.record_noise(epsilon);

        if tally.epsilon_spent > self.config.privacy_budget {
            tracing::warn!(
                spent = tally.epsilon_spent,
                budget = self.config.privacy_budget,
                "Privacy budget exceeded"
            );
        }

        Ok(noisy)
    }

    /// Mask a single value under `policy`
    ///
    /// Unsupported combinations, and any internal failure, return the value
    /// unchanged.
    pub fn mask_by_data_type(&self, value: &ScalarValue, policy: &MaskingPolicy) -> ScalarValue {
        self.masking.mask(value, policy)
    }

    /// Evaluate `value` against `policy` as of now
    ///
    /// The creation time is read from the store (see
    /// [`record_creation_time`](Self::record_creation_time)); an unknown
    /// creation time counts as now, so the value is kept.
    pub fn apply_retention_policy(
        &self,
        value: &ScalarValue,
        policy: &RetentionPolicy,
    ) -> RetentionAction {
        self.apply_retention_policy_at(value, policy, None, Utc::now())
    }

    /// Evaluate `value` against `policy` at an explicit instant
    pub fn apply_retention_policy_at(
        &self,
        value: &ScalarValue,
        policy: &RetentionPolicy,
        created_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> RetentionAction {
        let created_at = created_at
            .or_else(|| self.creation_time(value))
            .unwrap_or(now);
        RetentionEvaluator::new(&self.masking).evaluate(value, policy, created_at, now)
    }

    /// Evaluate `value` against the configured policy for `data_type`
    ///
    /// Falls back to the default policy when none is configured for the type.
    pub fn apply_configured_retention(
        &self,
        value: &ScalarValue,
        data_type: DataType,
        created_at: Option<DateTime<Utc>>,
    ) -> RetentionAction {
        let policy = self
            .configured_policies()
            .into_iter()
            .find(|p| p.data_type == data_type)
            .unwrap_or_else(|| retention::default_policy_for(data_type));
        self.apply_retention_policy_at(value, &policy, created_at, Utc::now())
    }

    /// Persist a retention policy set, replacing the previous one
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidArgument`] if a policy has zero retention
    /// days, or [`CloakError::StorageUnavailable`] if the store write fails.
    pub fn configure_retention_policies(&self, policies: &[RetentionPolicy]) -> Result<()> {
        let encoded = retention::encode_policies(policies)?;
        self.store.put(RETENTION_POLICIES_KEY, &encoded)?;
        tracing::info!(count = policies.len(), "Retention policies configured");
        Ok(())
    }

    /// Retention policies currently in effect
    ///
    /// Missing, empty or unreadable storage yields the default set.
    pub fn configured_policies(&self) -> Vec<RetentionPolicy> {
        match self.store.get(RETENTION_POLICIES_KEY) {
            Ok(Some(encoded)) => retention::decode_policies(&encoded),
            Ok(None) => retention::default_policies(),
            Err(e) => {
                log_error_with_context!(&e, "Failed to read retention policies, using defaults");
                retention::default_policies()
            }
        }
    }

    /// Snapshot of configured defaults and the work counted in `tally`
    pub fn anonymization_stats(&self, tally: &AnonymizationTally) -> AnonymizationStats {
        AnonymizationStats {
            configured_policies: self.configured_policies().len(),
            total_anonymizations: tally.total_anonymizations(),
            k_anonymity_level: self.config.default_k,
            l_diversity_level: self.config.default_l,
            differential_privacy_budget: self.config.privacy_budget,
            privacy_budget_spent: tally.epsilon_spent,
        }
    }

    /// Record when `value` was created
    ///
    /// Stored under `creation_time_<hash>` as RFC 3339, keyed by the same
    /// 8-character hash the HASH technique produces.
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::StorageUnavailable`] if the store write fails.
    pub fn record_creation_time(&self, value: &ScalarValue, at: DateTime<Utc>) -> Result<()> {
        let key = creation_time_key(&short_hash(&value.to_string()));
        self.store.put(&key, &at.to_rfc3339())
    }

    /// Stored creation time of `value`
    ///
    /// Accepts RFC 3339 or epoch milliseconds. Missing or unreadable entries
    /// yield `None`.
    pub fn creation_time(&self, value: &ScalarValue) -> Option<DateTime<Utc>> {
        let key = creation_time_key(&short_hash(&value.to_string()));
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read creation time");
                return None;
            }
        };
        parse_timestamp(&raw)
    }

    /// Original string form behind a token issued by TOKENIZATION
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::StorageUnavailable`] if the store read fails.
    pub fn resolve_token(&self, token: &str) -> Result<Option<String>> {
        self.masking.resolve_token(token)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    match raw.parse::<i64>() {
        Ok(ms) => DateTime::from_timestamp_millis(ms),
        Err(_) => {
            tracing::warn!("Unreadable creation time, treating value as new");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{AnonymizationLevel, MaskingTechnique};
    use crate::store::InMemoryPolicyStore;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct ReadOnlyStore;

    impl PolicyStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CloakError::StorageUnavailable("read-only".to_string()))
        }
        fn put(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CloakError::StorageUnavailable("read-only".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(CloakError::StorageUnavailable("read-only".to_string()))
        }
    }

    fn engine() -> (AnonymizationEngine, Arc<InMemoryPolicyStore>) {
        let store = Arc::new(InMemoryPolicyStore::new());
        let engine = AnonymizationEngine::new(EngineConfig::default(), store.clone()).unwrap();
        (engine, store)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.default_k = 0;
        let result = AnonymizationEngine::new(config, Arc::new(InMemoryPolicyStore::new()));
        assert!(matches!(result, Err(CloakError::Configuration(_))));
    }

    #[test]
    fn test_from_config_uses_memory_store() {
        let engine = AnonymizationEngine::from_config(&CloakConfig::default()).unwrap();
        assert_eq!(engine.config().default_k, 3);
        assert_eq!(engine.configured_policies().len(), 5);
    }

    #[test]
    fn test_tally_tracks_work() {
        let (engine, _) = engine();
        let mut tally = AnonymizationTally::new();

        let series = NumericSeries::new(vec![10.0, 10.0, 10.0]);
        engine
            .apply_differential_privacy_with(&series, 0.5, StdRng::seed_from_u64(1), &mut tally)
            .unwrap();
        assert!(engine
            .apply_differential_privacy(&series, -1.0, &mut tally)
            .is_err());

        let stats = engine.anonymization_stats(&tally);
        assert_eq!(stats.total_anonymizations, 1);
        assert_eq!(stats.privacy_budget_spent, 0.5);
        assert_eq!(stats.k_anonymity_level, 3);
        assert_eq!(stats.l_diversity_level, 2);
        assert_eq!(stats.differential_privacy_budget, 1.0);
        assert_eq!(stats.configured_policies, 5);
    }

    #[test]
    fn test_configure_and_read_policies() {
        let (engine, store) = engine();
        let policies = vec![RetentionPolicy::new(
            DataType::NumericData,
            1,
            AnonymizationLevel::Basic,
            false,
        )];
        engine.configure_retention_policies(&policies).unwrap();

        assert_eq!(
            store.get(RETENTION_POLICIES_KEY).unwrap().as_deref(),
            Some("NUMERIC_DATA:1:BASIC:false")
        );
        assert_eq!(engine.configured_policies(), policies);
    }

    #[test]
    fn test_configure_rejects_zero_days() {
        let (engine, store) = engine();
        let policies = vec![RetentionPolicy::new(
            DataType::NumericData,
            0,
            AnonymizationLevel::Basic,
            false,
        )];
        assert!(matches!(
            engine.configure_retention_policies(&policies),
            Err(CloakError::InvalidArgument(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_storage_failures() {
        let engine =
            AnonymizationEngine::new(EngineConfig::default(), Arc::new(ReadOnlyStore)).unwrap();

        assert_eq!(engine.configured_policies(), retention::default_policies());
        assert!(engine
            .configure_retention_policies(&retention::default_policies())
            .unwrap_err()
            .is_storage());

        let token = engine.mask_by_data_type(
            &ScalarValue::from("Jane"),
            &MaskingPolicy::new(DataType::PersonalIdentifier, MaskingTechnique::Tokenization),
        );
        assert!(token.to_string().starts_with("TOK_"));

        // Unknown creation time: kept
        let policy = retention::default_policy_for(DataType::BiometricData);
        let value = ScalarValue::from("template");
        assert_eq!(
            engine.apply_retention_policy(&value, &policy),
            RetentionAction::Keep(value)
        );
    }

    #[test]
    fn test_creation_time_round_trip() {
        let (engine, _) = engine();
        let value = ScalarValue::from("Jane");
        let at = Utc::now() - Duration::days(40);

        assert!(engine.creation_time(&value).is_none());
        engine.record_creation_time(&value, at).unwrap();
        let stored = engine.creation_time(&value).unwrap();
        assert_eq!(stored.timestamp_millis(), at.timestamp_millis());

        let policy = retention::default_policy_for(DataType::PersonalIdentifier);
        assert!(engine.apply_retention_policy(&value, &policy).is_delete());
    }

    #[test]
    fn test_creation_time_epoch_millis() {
        let (engine, store) = engine();
        let value = ScalarValue::Int(42);
        let key = creation_time_key(&short_hash("42"));
        store.put(&key, "86400000").unwrap();

        let stored = engine.creation_time(&value).unwrap();
        assert_eq!(stored.timestamp_millis(), 86_400_000);

        store.put(&key, "yesterday").unwrap();
        assert!(engine.creation_time(&value).is_none());
    }

    #[test]
    fn test_configured_retention_falls_back_to_default() {
        let (engine, _) = engine();
        engine
            .configure_retention_policies(&[RetentionPolicy::new(
                DataType::NumericData,
                1,
                AnonymizationLevel::Basic,
                false,
            )])
            .unwrap();

        let old = Some(Utc::now() - Duration::days(2));
        let action =
            engine.apply_configured_retention(&ScalarValue::Int(34), DataType::NumericData, old);
        assert_eq!(action.into_value(), Some(ScalarValue::from("30-49")));

        // Quasi-identifiers are not configured: default 90 days, auto-delete
        let ancient = Some(Utc::now() - Duration::days(91));
        let action = engine.apply_configured_retention(
            &ScalarValue::from("10001"),
            DataType::QuasiIdentifier,
            ancient,
        );
        assert!(action.is_delete());
    }

    #[test]
    fn test_resolve_token() {
        let (engine, _) = engine();
        let token = engine.mask_by_data_type(
            &ScalarValue::Float(52_345.5),
            &MaskingPolicy::new(DataType::NumericData, MaskingTechnique::Tokenization),
        );
        let original = engine.resolve_token(&token.to_string()).unwrap();
        assert_eq!(original.as_deref(), Some("52345.5"));
        assert_eq!(engine.resolve_token("TOK_000000").unwrap(), None);
    }
}
