use tracing::debug;

use crate::decompose::Feature;
use crate::embedding::{EmbeddingProvider, dot, normalize};

use super::error::ScoringError;
use super::types::{ScoredFeature, TierThresholds};

/// Scores features against an image embedding.
#[derive(Debug, Clone, Default)]
pub struct FeatureScorer {
    thresholds: TierThresholds,
}

impl FeatureScorer {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    /// Embeds every phrase in a single batch call and tiers the similarities.
    ///
    /// Output order matches `features`. An empty input returns immediately
    /// without touching the embedder.
    pub fn score(
        &self,
        embedder: &dyn EmbeddingProvider,
        image_embedding: &[f32],
        features: Vec<Feature>,
    ) -> Result<Vec<ScoredFeature>, ScoringError> {
        if features.is_empty() {
            return Ok(vec![]);
        }

        let image = normalize(image_embedding.to_vec());
        let phrases: Vec<&str> = features.iter().map(|f| f.phrase.as_str()).collect();
        let vectors = embedder.encode_text(&phrases)?;

        if vectors.len() != features.len() {
            return Err(ScoringError::CountMismatch {
                expected: features.len(),
                actual: vectors.len(),
            });
        }

        let scored = features
            .into_iter()
            .zip(vectors)
            .map(|(feature, vector)| {
                let similarity = dot(&image, &normalize(vector))?;
                Ok(ScoredFeature::new(feature, similarity, &self.thresholds))
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;

        debug!(
            count = scored.len(),
            strong = self.thresholds.strong,
            partial = self.thresholds.partial,
            "Scored features"
        );
        Ok(scored)
    }
}
