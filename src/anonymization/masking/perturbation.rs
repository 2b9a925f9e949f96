//! Perturbation masking

use super::Masker;
use crate::anonymization::models::MaskingPolicy;
use crate::domain::{Result, ScalarValue};
use rand::distributions::Open01;
use rand::Rng;
use std::f64::consts::PI;

/// Relative standard deviation of the Gaussian noise added to floats
pub const FLOAT_NOISE_RATIO: f64 = 0.05;

/// Adds small random noise to numeric values
///
/// Floats get Gaussian noise with a standard deviation of 5% of the value;
/// integers move by up to 2; all-digit text moves by up to 1 and is
/// re-stringified. The data type is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerturbationMasker;

impl Masker for PerturbationMasker {
    fn mask(&self, value: &ScalarValue, _policy: &MaskingPolicy) -> Result<ScalarValue> {
        Ok(perturb(value, &mut rand::thread_rng()))
    }
}

/// Perturb a value with the given random source
pub fn perturb<R: Rng + ?Sized>(value: &ScalarValue, rng: &mut R) -> ScalarValue {
    match value {
        ScalarValue::Float(v) => ScalarValue::Float(v + gaussian(rng) * (v * FLOAT_NOISE_RATIO)),
        ScalarValue::Int(v) => ScalarValue::Int(v.saturating_add(rng.gen_range(-2..=2))),
        ScalarValue::Text(s) if value.is_digit_text() => match s.parse::<i64>() {
            Ok(n) => ScalarValue::Text(n.saturating_add(rng.gen_range(-1..=1)).to_string()),
            Err(_) => value.clone(),
        },
        ScalarValue::Text(_) => value.clone(),
    }
}

/// Standard normal sample via the Box–Muller transform
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.sample(Open01);
    let u2: f64 = rng.sample(Open01);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
