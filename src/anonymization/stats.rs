//! Anonymization statistics
//!
//! The engine keeps no counters of its own. Callers own an
//! [`AnonymizationTally`], pass it to the batch operations, and combine it
//! with the configured defaults into an [`AnonymizationStats`] snapshot.

use serde::{Deserialize, Serialize};

/// Running counters of work done through the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationTally {
    /// Records released by k-anonymity batches
    pub records_anonymized: usize,

    /// Numeric series passed through the Laplace mechanism
    pub series_perturbed: usize,

    /// Total epsilon spent across those series
    pub epsilon_spent: f64,
}

impl AnonymizationTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a released k-anonymity batch
    pub fn record_batch(&mut self, records: usize) {
        self.records_anonymized += records;
    }

    /// Count one noisy series
    pub fn record_noise(&mut self, epsilon: f64) {
        self.series_perturbed += 1;
        self.epsilon_spent += epsilon;
    }

    /// Total anonymization operations (records plus series)
    pub fn total_anonymizations(&self) -> usize {
        self.records_anonymized + self.series_perturbed
    }
}

/// Snapshot of the engine's configured defaults and accumulated work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationStats {
    /// Number of retention policies in effect
    pub configured_policies: usize,

    /// Records and series anonymized so far
    pub total_anonymizations: usize,

    /// Default k
    pub k_anonymity_level: usize,

    /// Default l
    pub l_diversity_level: usize,

    /// Configured privacy budget
    pub differential_privacy_budget: f64,

    /// Epsilon spent so far
    pub privacy_budget_spent: f64,
}

impl AnonymizationStats {
    /// Budget left, never negative
    pub fn privacy_budget_remaining(&self) -> f64 {
        (self.differential_privacy_budget - self.privacy_budget_spent).max(0.0)
    }

    /// Whether more epsilon has been spent than configured
    pub fn budget_exceeded(&self) -> bool {
        self.privacy_budget_spent > self.differential_privacy_budget
    }

    /// Format the snapshot for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push_str("═══════════════════════════════════════════════\n");
        output.push_str("             ANONYMIZATION STATISTICS          \n");
        output.push_str("═══════════════════════════════════════════════\n");
        output.push_str(&format!(
            "  Configured Policies:     {}\n",
            self.configured_policies
        ));
        output.push_str(&format!(
            "  Total Anonymizations:    {}\n",
            self.total_anonymizations
        ));
        output.push_str(&format!(
            "  k-Anonymity Level:       {}\n",
            self.k_anonymity_level
        ));
        output.push_str(&format!(
            "  l-Diversity Level:       {}\n",
            self.l_diversity_level
        ));
        output.push_str(&format!(
            "  Privacy Budget:          {:.3} (spent {:.3})\n",
            self.differential_privacy_budget, self.privacy_budget_spent
        ));

        if self.budget_exceeded() {
            output.push_str("\n⚠️  Privacy budget exceeded\n");
        }

        output
    }

    /// Format the snapshot as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
