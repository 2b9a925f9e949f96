//! Generalization and similarity helpers
//!
//! Pure functions shared by the grouping engine and the masking layer.

use crate::domain::{CloakError, PersonalRecord, Result};
use sha2::{Digest, Sha256};

/// Wildcard used when coarsening postal codes
pub const ZIP_WILDCARD: char = '*';

/// Age bucket of an age in years
///
/// # Examples
///
/// ```
/// use cloak::anonymization::generalize::age_range;
///
/// assert_eq!(age_range(17), "<18");
/// assert_eq!(age_range(18), "18-29");
/// assert_eq!(age_range(65), "65+");
/// ```
pub fn age_range(age: i64) -> &'static str {
    match age {
        a if a < 18 => "<18",
        a if a < 30 => "18-29",
        a if a < 50 => "30-49",
        a if a < 65 => "50-64",
        _ => "65+",
    }
}

/// First three characters followed by two wildcards; shorter codes unchanged
pub fn zip_prefix(zip: &str) -> String {
    if zip.chars().count() >= 3 {
        let mut prefix: String = zip.chars().take(3).collect();
        prefix.push(ZIP_WILDCARD);
        prefix.push(ZIP_WILDCARD);
        prefix
    } else {
        zip.to_string()
    }
}

/// Salary bucket
pub fn salary_range(salary: f64) -> &'static str {
    match salary {
        s if s < 30_000.0 => "<30K",
        s if s < 50_000.0 => "30K-50K",
        s if s < 75_000.0 => "50K-75K",
        s if s < 100_000.0 => "75K-100K",
        _ => "100K+",
    }
}

/// Mean of the ages, truncated toward zero
///
/// Returns 0 for an empty slice.
pub fn generalized_age(ages: &[u32]) -> u32 {
    if ages.is_empty() {
        return 0;
    }
    let sum: u64 = ages.iter().map(|&a| u64::from(a)).sum();
    (sum / ages.len() as u64) as u32
}

/// Longest common prefix of the codes, padded with wildcards to `width`
///
/// A common prefix shorter than two characters carries no locality, so the
/// result is all wildcards. A prefix already at or beyond `width` is returned
/// unpadded and untruncated.
///
/// # Examples
///
/// ```
/// use cloak::anonymization::generalize::generalized_zip;
///
/// assert_eq!(generalized_zip(&["10001", "10002"], 5), "1000*");
/// assert_eq!(generalized_zip(&["10001", "20002"], 5), "*****");
/// ```
pub fn generalized_zip<S: AsRef<str>>(zips: &[S], width: usize) -> String {
    let prefix = common_prefix(zips);
    let len = prefix.chars().count();

    if len < 2 {
        return ZIP_WILDCARD.to_string().repeat(width);
    }

    let mut out = prefix;
    if len < width {
        out.extend(std::iter::repeat(ZIP_WILDCARD).take(width - len));
    }
    out
}

fn common_prefix<S: AsRef<str>>(values: &[S]) -> String {
    let mut iter = values.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut prefix: Vec<char> = first.as_ref().chars().collect();
    for value in iter {
        let shared = prefix
            .iter()
            .zip(value.as_ref().chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
    }
    prefix.into_iter().collect()
}

/// Truncate `value` to a multiple of `range_size`
///
/// # Errors
///
/// Returns [`CloakError::ArithmeticDomain`] when `range_size` is zero,
/// negative or not finite.
pub fn round_to_range(value: f64, range_size: f64) -> Result<f64> {
    if !(range_size.is_finite() && range_size > 0.0) {
        return Err(CloakError::ArithmeticDomain(format!(
            "range size must be positive and finite, got {range_size}"
        )));
    }
    Ok((value / range_size).trunc() * range_size)
}

/// Dissimilarity between two records on their quasi-identifiers
///
/// Normalized age difference, plus one if the first two zip characters
/// differ, plus one if the genders differ. Lower is closer.
pub fn dissimilarity(a: &PersonalRecord, b: &PersonalRecord) -> f64 {
    let age_diff = (f64::from(a.age) - f64::from(b.age)).abs() / 100.0;
    let zip_a: String = a.zip_code.chars().take(2).collect();
    let zip_b: String = b.zip_code.chars().take(2).collect();
    let zip_term = if zip_a == zip_b { 0.0 } else { 1.0 };
    let gender_term = if a.gender == b.gender { 0.0 } else { 1.0 };
    age_diff + zip_term + gender_term
}

/// First 8 hex characters of the SHA-256 digest of `value`
pub fn short_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}
