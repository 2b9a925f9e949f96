//! Laplace mechanism for numeric series

use crate::domain::{CloakError, NumericSeries, Result};
use rand::distributions::Open01;
use rand::Rng;
use serde_json::Value;

/// Metadata key recording the epsilon of the last application
pub const EPSILON_KEY: &str = "epsilon";
/// Metadata key recording the noise scale of the last application
pub const NOISE_SCALE_KEY: &str = "noise_scale";
/// Metadata key accumulating epsilon across applications
pub const BUDGET_USED_KEY: &str = "privacy_budget_used";

/// Global sensitivity of a series: its spread, floored at 1.0
pub fn sensitivity(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    (max - min).max(1.0)
}

/// Adds calibrated Laplace noise to every value of a series
///
/// Generic over the random source so callers can seed it.
pub struct LaplaceMechanism<R: Rng> {
    rng: R,
}

impl<R: Rng> LaplaceMechanism<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One Laplace sample with the given scale
    ///
    /// Draws two uniforms and uses only the first through the inverse CDF.
    /// The second draw is kept so seeded sequences stay stable; it does not
    /// contribute to the sample.
    pub fn sample(&mut self, scale: f64) -> f64 {
        let u1: f64 = self.rng.sample(Open01);
        let _u2: f64 = self.rng.sample(Open01);

        if u1 <= 0.5 {
            scale * (2.0 * u1).ln()
        } else {
            -scale * (2.0 * (1.0 - u1)).ln()
        }
    }

    /// Return a noisy copy of `series` under budget `epsilon`
    ///
    /// `epsilon` and `noise_scale` describe this application;
    /// `privacy_budget_used` is added to any value already present. No other
    /// metadata is touched.
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidArgument`] when `epsilon` is not a
    /// positive finite number.
    pub fn apply_noise(&mut self, series: &NumericSeries, epsilon: f64) -> Result<NumericSeries> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(CloakError::InvalidArgument(format!(
                "epsilon must be positive and finite, got {epsilon}"
            )));
        }

        let sensitivity = sensitivity(&series.values);
        let scale = sensitivity / epsilon;

        let values = series
            .values
            .iter()
            .map(|v| v + self.sample(scale))
            .collect();

        let spent = series.metadata_f64(BUDGET_USED_KEY).unwrap_or(0.0) + epsilon;

        let mut metadata = series.metadata.clone();
        metadata.insert(EPSILON_KEY.to_string(), Value::from(epsilon));
        metadata.insert(NOISE_SCALE_KEY.to_string(), Value::from(scale));
        metadata.insert(BUDGET_USED_KEY.to_string(), Value::from(spent));

        tracing::debug!(
            len = series.len(),
            epsilon,
            sensitivity,
            scale,
            "Applied Laplace noise"
        );

        Ok(NumericSeries { values, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mechanism(seed: u64) -> LaplaceMechanism<StdRng> {
        LaplaceMechanism::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_sensitivity() {
        assert_eq!(sensitivity(&[]), 1.0);
        assert_eq!(sensitivity(&[10.0, 10.0, 10.0]), 1.0);
        assert_eq!(sensitivity(&[1.0, 5.0, 3.0]), 4.0);
        assert_eq!(sensitivity(&[0.2, 0.5]), 1.0);
    }

    #[test]
    fn test_metadata_is_additive() {
        let series = NumericSeries::new(vec![10.0, 10.0, 10.0]).with_metadata("source", "survey");
        let noisy = mechanism(7).apply_noise(&series, 1.0).unwrap();

        assert_eq!(noisy.len(), 3);
        assert_eq!(noisy.metadata["source"], "survey");
        assert_eq!(noisy.metadata_f64(EPSILON_KEY), Some(1.0));
        assert_eq!(noisy.metadata_f64(NOISE_SCALE_KEY), Some(1.0));
        assert_eq!(noisy.metadata_f64(BUDGET_USED_KEY), Some(1.0));
        // Input untouched
        assert_eq!(series.values, vec![10.0, 10.0, 10.0]);
        assert!(!series.metadata.contains_key(EPSILON_KEY));
    }

    #[test]
    fn test_budget_accumulates() {
        let mut mech = mechanism(1);
        let series = NumericSeries::new(vec![1.0, 2.0]);
        let once = mech.apply_noise(&series, 0.5).unwrap();
        let twice = mech.apply_noise(&once, 0.25).unwrap();

        assert_eq!(twice.metadata_f64(EPSILON_KEY), Some(0.25));
        assert_eq!(twice.metadata_f64(BUDGET_USED_KEY), Some(0.75));
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        let series = NumericSeries::new(vec![1.0]);
        for epsilon in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                mechanism(3).apply_noise(&series, epsilon),
                Err(CloakError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_empty_series() {
        let noisy = mechanism(3).apply_noise(&NumericSeries::default(), 2.0).unwrap();
        assert!(noisy.is_empty());
        assert_eq!(noisy.metadata_f64(NOISE_SCALE_KEY), Some(0.5));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let series = NumericSeries::new(vec![3.0, 4.0, 5.0]);
        let a = mechanism(42).apply_noise(&series, 1.0).unwrap();
        let b = mechanism(42).apply_noise(&series, 1.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_samples_are_finite() {
        let mut mech = mechanism(99);
        for _ in 0..10_000 {
            assert!(mech.sample(2.0).is_finite());
        }
    }
}
