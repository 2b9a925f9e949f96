//! Anonymization engine configuration

use crate::config::loader::parse_override;
use crate::domain::Result;
use serde::{Deserialize, Serialize};

/// Engine defaults
///
/// `default_k`, `default_l` and `privacy_budget` are the levels reported by
/// the stats snapshot and used by callers that do not pick their own; the
/// remaining fields tune generalization and diversity scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default minimum group size
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Target number of distinct sensitive values per group
    #[serde(default = "default_l")]
    pub default_l: usize,

    /// Total epsilon the caller intends to spend
    #[serde(default = "default_privacy_budget")]
    pub privacy_budget: f64,

    /// Bucket size used when generalizing float numeric data
    #[serde(default = "default_numeric_range_size")]
    pub numeric_range_size: f64,

    /// Extra-attribute name scored for l-diversity (`None` scores `condition`)
    #[serde(default)]
    pub diversity_attribute: Option<String>,
}

fn default_k() -> usize {
    3
}

fn default_l() -> usize {
    2
}

fn default_privacy_budget() -> f64 {
    1.0
}

fn default_numeric_range_size() -> f64 {
    1000.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            default_l: default_l(),
            privacy_budget: default_privacy_budget(),
            numeric_range_size: default_numeric_range_size(),
            diversity_attribute: None,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.default_k == 0 {
            return Err("engine.default_k must be at least 1".to_string());
        }
        if self.default_l == 0 {
            return Err("engine.default_l must be at least 1".to_string());
        }
        if !(self.privacy_budget.is_finite() && self.privacy_budget > 0.0) {
            return Err(format!(
                "engine.privacy_budget must be a positive number, got {}",
                self.privacy_budget
            ));
        }
        if !(self.numeric_range_size.is_finite() && self.numeric_range_size > 0.0) {
            return Err(format!(
                "engine.numeric_range_size must be a positive number, got {}",
                self.numeric_range_size
            ));
        }
        if let Some(ref name) = self.diversity_attribute {
            if name.trim().is_empty() {
                return Err("engine.diversity_attribute cannot be empty".to_string());
            }
        }
        Ok(())
    }

    /// Apply `CLOAK_ENGINE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CLOAK_ENGINE_DEFAULT_K") {
            self.default_k = parse_override("CLOAK_ENGINE_DEFAULT_K", &val)?;
        }

        if let Ok(val) = std::env::var("CLOAK_ENGINE_DEFAULT_L") {
            self.default_l = parse_override("CLOAK_ENGINE_DEFAULT_L", &val)?;
        }

        if let Ok(val) = std::env::var("CLOAK_ENGINE_PRIVACY_BUDGET") {
            self.privacy_budget = parse_override("CLOAK_ENGINE_PRIVACY_BUDGET", &val)?;
        }

        if let Ok(val) = std::env::var("CLOAK_ENGINE_NUMERIC_RANGE_SIZE") {
            self.numeric_range_size = parse_override("CLOAK_ENGINE_NUMERIC_RANGE_SIZE", &val)?;
        }

        if let Ok(val) = std::env::var("CLOAK_ENGINE_DIVERSITY_ATTRIBUTE") {
            self.diversity_attribute = Some(val);
        }

        Ok(())
    }
}
