//! Statistical tests for the Laplace mechanism
//!
//! All generators are seeded; tolerances are wide enough for the sample sizes
//! used.

use cloak::anonymization::privacy::{sensitivity, LaplaceMechanism};
use cloak::anonymization::{AnonymizationEngine, AnonymizationTally, EngineConfig};
use cloak::domain::{CloakError, NumericSeries};
use cloak::store::InMemoryPolicyStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn mean_abs_noise(scale: f64, seed: u64, n: usize) -> f64 {
    let mut mech = LaplaceMechanism::new(StdRng::seed_from_u64(seed));
    (0..n).map(|_| mech.sample(scale).abs()).sum::<f64>() / n as f64
}

#[test]
fn test_constant_series_mean_is_preserved() {
    let series = NumericSeries::new(vec![10.0; 3]);
    let mut mech = LaplaceMechanism::new(StdRng::seed_from_u64(2024));

    let runs = 5_000;
    let mut sum = 0.0;
    for _ in 0..runs {
        let noisy = mech.apply_noise(&series, 1.0).unwrap();
        assert_eq!(noisy.metadata_f64("noise_scale"), Some(1.0));
        sum += noisy.values.iter().sum::<f64>() / 3.0;
    }
    let mean = sum / runs as f64;
    assert!((mean - 10.0).abs() < 0.1, "mean was {mean}");
}

#[test]
fn test_noise_magnitude_grows_with_scale() {
    // E|Laplace(b)| = b
    let n = 40_000;
    let small = mean_abs_noise(1.0, 1, n);
    let large = mean_abs_noise(4.0, 1, n);

    assert!((small - 1.0).abs() < 0.05, "small was {small}");
    assert!((large - 4.0).abs() < 0.2, "large was {large}");
    // Same seed: every sample scales exactly
    assert!((large / small - 4.0).abs() < 1e-9);
}

#[test]
fn test_noise_is_symmetric() {
    let mut mech = LaplaceMechanism::new(StdRng::seed_from_u64(77));
    let n = 20_000;
    let positives = (0..n).filter(|_| mech.sample(1.0) > 0.0).count();
    let ratio = positives as f64 / n as f64;
    assert!((ratio - 0.5).abs() < 0.02, "ratio was {ratio}");
}

#[test]
fn test_scale_follows_sensitivity_and_epsilon() {
    let series = NumericSeries::new(vec![0.0, 8.0, 3.0]);
    assert_eq!(sensitivity(&series.values), 8.0);

    let mut mech = LaplaceMechanism::new(StdRng::seed_from_u64(5));
    let noisy = mech.apply_noise(&series, 0.5).unwrap();
    assert_eq!(noisy.metadata_f64("noise_scale"), Some(16.0));
    assert_eq!(noisy.metadata_f64("epsilon"), Some(0.5));
}

#[test]
fn test_engine_tracks_budget() {
    let engine = AnonymizationEngine::new(
        EngineConfig::default(),
        Arc::new(InMemoryPolicyStore::new()),
    )
    .unwrap();
    let mut tally = AnonymizationTally::new();
    let series = NumericSeries::new(vec![1.0, 2.0, 3.0]).with_metadata("column", "salary");

    let once = engine
        .apply_differential_privacy(&series, 0.6, &mut tally)
        .unwrap();
    let twice = engine
        .apply_differential_privacy(&once, 0.6, &mut tally)
        .unwrap();

    assert_eq!(twice.metadata["column"], "salary");
    let used = twice.metadata_f64("privacy_budget_used").unwrap();
    assert!((used - 1.2).abs() < 1e-12);

    let stats = engine.anonymization_stats(&tally);
    assert_eq!(stats.total_anonymizations, 2);
    assert!(stats.budget_exceeded());
    assert_eq!(stats.privacy_budget_remaining(), 0.0);
}

#[test]
fn test_invalid_epsilon_is_rejected() {
    let engine = AnonymizationEngine::new(
        EngineConfig::default(),
        Arc::new(InMemoryPolicyStore::new()),
    )
    .unwrap();
    let mut tally = AnonymizationTally::new();
    let series = NumericSeries::new(vec![1.0]);

    let err = engine
        .apply_differential_privacy(&series, 0.0, &mut tally)
        .unwrap_err();
    assert!(matches!(err, CloakError::InvalidArgument(_)));
    assert_eq!(tally, AnonymizationTally::default());
}
