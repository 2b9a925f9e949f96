//! Policy-driven masking of single field values
//!
//! Each [`MaskingTechnique`] has one [`Masker`] implementation. The
//! [`MaskingDispatcher`] picks the implementation named by the policy and
//! turns any failure into a pass-through of the original value, so masking a
//! field never aborts a batch.

pub mod generalization;
pub mod hash;
pub mod perturbation;
pub mod substitution;
pub mod suppression;
pub mod tokenization;

use crate::anonymization::models::{MaskingPolicy, MaskingTechnique};
use crate::domain::{Result, ScalarValue};
use crate::store::PolicyStore;
use std::sync::Arc;

pub use generalization::GeneralizationMasker;
pub use hash::HashMasker;
pub use perturbation::PerturbationMasker;
pub use substitution::SubstitutionMasker;
pub use suppression::SuppressionMasker;
pub use tokenization::TokenMasker;

/// Trait for masking technique implementations
///
/// Implementations never mutate the input. Combinations a technique does not
/// support return the value unchanged.
pub trait Masker: Send + Sync {
    /// Mask a value under the given policy
    fn mask(&self, value: &ScalarValue, policy: &MaskingPolicy) -> Result<ScalarValue>;
}

/// Routes a value to the masker of its policy's technique
pub struct MaskingDispatcher {
    hash: HashMasker,
    generalization: GeneralizationMasker,
    suppression: SuppressionMasker,
    perturbation: PerturbationMasker,
    substitution: SubstitutionMasker,
    tokenization: TokenMasker,
}

impl MaskingDispatcher {
    /// Create a dispatcher
    ///
    /// `numeric_range_size` is the bucket width used when generalizing
    /// float data; tokens are written to `store`.
    pub fn new(numeric_range_size: f64, store: Arc<dyn PolicyStore>) -> Self {
        Self {
            hash: HashMasker,
            generalization: GeneralizationMasker::new(numeric_range_size),
            suppression: SuppressionMasker,
            perturbation: PerturbationMasker,
            substitution: SubstitutionMasker::new(),
            tokenization: TokenMasker::new(store),
        }
    }

    fn masker(&self, technique: MaskingTechnique) -> &dyn Masker {
        match technique {
            MaskingTechnique::Hash => &self.hash,
            MaskingTechnique::Generalization => &self.generalization,
            MaskingTechnique::Suppression => &self.suppression,
            MaskingTechnique::Perturbation => &self.perturbation,
            MaskingTechnique::Substitution => &self.substitution,
            MaskingTechnique::Tokenization => &self.tokenization,
        }
    }

    /// Original string form behind a token issued by this dispatcher
    pub fn resolve_token(&self, token: &str) -> Result<Option<String>> {
        self.tokenization.resolve(token)
    }

    /// Mask `value` under `policy`, falling back to the original on error
    pub fn mask(&self, value: &ScalarValue, policy: &MaskingPolicy) -> ScalarValue {
        match self.masker(policy.technique).mask(value, policy) {
            Ok(masked) => masked,
            Err(e) => {
                tracing::debug!(
                    technique = ?policy.technique,
                    data_type = %policy.data_type,
                    kind = value.kind(),
                    error = %e,
                    "Masking failed, passing value through"
                );
                value.clone()
            }
        }
    }
}

/// First character followed by `***`
pub(crate) fn initial_mask(text: &str) -> String {
    let mut out: String = text.chars().take(1).collect();
    out.push_str("***");
    out
}
