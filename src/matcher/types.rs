use serde::{Deserialize, Serialize};

use crate::constants::round_to;
use crate::decompose::FeatureCategory;
use crate::scoring::{MatchTier, ScoredFeature};

/// One row of the persisted feature breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBreakdown {
    pub feature: String,
    /// Similarity rounded to 3 decimal places.
    pub similarity: f64,
    pub status: MatchTier,
    pub category: FeatureCategory,
}

impl From<&ScoredFeature> for FeatureBreakdown {
    fn from(scored: &ScoredFeature) -> Self {
        Self {
            feature: scored.feature.phrase.clone(),
            similarity: round_to(f64::from(scored.similarity), 3),
            status: scored.status,
            category: scored.feature.category,
        }
    }
}

/// Score plus explanation for one image/prompt pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Full-prompt similarity in percent, 2 decimal places.
    pub final_score: f64,
    /// Features in decomposition order.
    pub feature_breakdown: Vec<FeatureBreakdown>,
    pub explanation_text: String,
}

impl MatchResult {
    pub fn new(final_score: f64, scored: &[ScoredFeature], explanation_text: String) -> Self {
        Self {
            final_score,
            feature_breakdown: scored.iter().map(FeatureBreakdown::from).collect(),
            explanation_text,
        }
    }
}
