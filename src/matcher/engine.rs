use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::constants::round_to;
use crate::decompose::{Feature, PromptDecomposer};
use crate::embedding::{EmbeddingError, EmbeddingProvider, dot, normalize};
use crate::narrative::Narrator;
use crate::scoring::{FeatureScorer, ScoredFeature};

use super::error::MatchError;
use super::types::MatchResult;

/// Unit image embedding and the frozen overall score.
struct Anchor {
    image_embedding: Vec<f32>,
    score: f64,
}

/// Scores an image against a prompt and explains the score.
///
/// The overall score is the full-prompt cosine similarity and is fixed before
/// decomposition runs; the feature breakdown only annotates it.
pub struct ExplainableMatcher {
    embedder: Arc<dyn EmbeddingProvider>,
    decomposer: Arc<dyn PromptDecomposer>,
    scorer: FeatureScorer,
    narrator: Narrator,
}

impl std::fmt::Debug for ExplainableMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainableMatcher")
            .field("embedder_stub", &self.embedder.is_stub())
            .field("decomposer", &self.decomposer.kind())
            .field("scorer", &self.scorer)
            .field("narrator", &self.narrator)
            .finish()
    }
}

impl ExplainableMatcher {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, decomposer: Arc<dyn PromptDecomposer>) -> Self {
        Self {
            embedder,
            decomposer,
            scorer: FeatureScorer::default(),
            narrator: Narrator::default(),
        }
    }

    pub fn with_scorer(mut self, scorer: FeatureScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn decomposer(&self) -> &Arc<dyn PromptDecomposer> {
        &self.decomposer
    }

    /// Full-prompt similarity in percent (2 dp, may be negative), without decomposition.
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn compute_score(&self, image: Vec<u8>, prompt: &str) -> Result<f64, MatchError> {
        validate(&image, prompt)?;
        Ok(self.anchor(image, prompt).await?.score)
    }

    /// Full pipeline: score, decompose, score features, narrate.
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn explain(&self, image: Vec<u8>, prompt: &str) -> Result<MatchResult, MatchError> {
        validate(&image, prompt)?;

        // An anchor failure drops the in-flight decomposition.
        let (anchor, features) = tokio::try_join!(self.anchor(image, prompt), async {
            Ok::<_, MatchError>(self.decomposer.decompose(prompt).await)
        })?;
        debug!(
            score = anchor.score,
            features = features.len(),
            decomposer = %self.decomposer.kind(),
            "Score frozen, scoring features"
        );

        let scored = self.score_features(anchor.image_embedding, features).await;
        let explanation_text = self.narrator.render(&scored, anchor.score);

        Ok(MatchResult::new(anchor.score, &scored, explanation_text))
    }

    async fn anchor(&self, image: Vec<u8>, prompt: &str) -> Result<Anchor, MatchError> {
        let embedder = Arc::clone(&self.embedder);
        let prompt = prompt.to_string();

        let (image_embedding, text_embedding) = tokio::task::spawn_blocking(move || {
            let image_embedding = normalize(embedder.encode_image(&image)?);
            let text_embedding = embedder
                .encode_text(&[prompt.as_str()])?
                .into_iter()
                .next()
                .ok_or_else(|| EmbeddingError::InferenceFailed {
                    reason: "text encoder returned an empty batch".to_string(),
                })?;
            Ok::<_, EmbeddingError>((image_embedding, normalize(text_embedding)))
        })
        .await
        .map_err(|e| MatchError::Task(e.to_string()))??;

        let similarity = dot(&image_embedding, &text_embedding)?;
        let score = round_to(f64::from(similarity) * 100.0, 2);

        Ok(Anchor {
            image_embedding,
            score,
        })
    }

    /// Feature scoring never fails the request; errors degrade to no breakdown.
    async fn score_features(
        &self,
        image_embedding: Vec<f32>,
        features: Vec<Feature>,
    ) -> Vec<ScoredFeature> {
        if features.is_empty() {
            return vec![];
        }

        let embedder = Arc::clone(&self.embedder);
        let scorer = self.scorer.clone();
        let result = tokio::task::spawn_blocking(move || {
            scorer.score(embedder.as_ref(), &image_embedding, features)
        })
        .await;

        match result {
            Ok(Ok(scored)) => scored,
            Ok(Err(e)) => {
                warn!(error = %e, "Feature scoring failed, returning score-only explanation");
                vec![]
            }
            Err(e) => {
                warn!(error = %e, "Feature scoring task failed, returning score-only explanation");
                vec![]
            }
        }
    }
}

fn validate(image: &[u8], prompt: &str) -> Result<(), MatchError> {
    if image.is_empty() {
        return Err(MatchError::InvalidInput("image is empty".to_string()));
    }
    if prompt.trim().is_empty() {
        return Err(MatchError::InvalidInput("prompt is empty".to_string()));
    }
    Ok(())
}
