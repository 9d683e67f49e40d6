use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{PARTIAL_THRESHOLD, STRONG_THRESHOLD};
use crate::decompose::Feature;

/// How well one feature is reflected in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Strong,
    Partial,
    Weak,
}

impl MatchTier {
    /// Classifies `similarity` against `thresholds` (inclusive lower bounds).
    pub fn from_similarity(similarity: f32, thresholds: &TierThresholds) -> Self {
        if similarity >= thresholds.strong {
            MatchTier::Strong
        } else if similarity >= thresholds.partial {
            MatchTier::Partial
        } else {
            MatchTier::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Strong => "strong",
            MatchTier::Partial => "partial",
            MatchTier::Weak => "weak",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Cut points between feature tiers.
pub struct TierThresholds {
    /// Similarity at or above which a feature is strong.
    pub strong: f32,
    /// Similarity at or above which a feature is partial.
    pub partial: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            strong: STRONG_THRESHOLD,
            partial: PARTIAL_THRESHOLD,
        }
    }
}

impl TierThresholds {
    /// Returns `true` if `partial < strong` and both are finite.
    pub fn is_ordered(&self) -> bool {
        self.strong.is_finite() && self.partial.is_finite() && self.partial < self.strong
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A feature with its image similarity and tier.
pub struct ScoredFeature {
    pub feature: Feature,
    /// Cosine similarity with the image embedding.
    pub similarity: f32,
    pub status: MatchTier,
}

impl ScoredFeature {
    pub fn new(feature: Feature, similarity: f32, thresholds: &TierThresholds) -> Self {
        Self {
            status: MatchTier::from_similarity(similarity, thresholds),
            feature,
            similarity,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.feature.phrase
    }
}
