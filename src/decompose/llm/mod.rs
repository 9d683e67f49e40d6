//! LLM-backed decomposition with heuristic fallback.

pub mod extractor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub(crate) mod parse;

pub use extractor::{FeatureExtractor, GenaiExtractor};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockExtractor;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::error::DecomposeError;
use super::types::Feature;
use super::{DecomposerKind, HeuristicDecomposer, PromptDecomposer};

/// Fixed instruction sent ahead of every prompt.
pub const SYSTEM_INSTRUCTION: &str = r#"You are an expert at analyzing interior design prompts.
Extract key visual features from the given prompt and categorize them.

Categories:
- style: overall design style (modern, rustic, minimalist, etc.)
- layout: spatial arrangement (open concept, island, L-shaped, etc.)
- material: materials and colors (wood, marble, sage green, etc.)
- lighting: lighting features (pendant lights, natural light, LED, etc.)
- fixtures: appliances and fixtures (stainless steel appliances, farmhouse sink, etc.)
- photography: photo characteristics (wide-angle, close-up, etc.)
- general: anything else important

Return ONLY a JSON array of objects with 'feature' and 'category' keys.
Each feature should be a short, specific phrase (3-8 words).
Example: [{"feature": "modern minimalist kitchen", "category": "style"}, {"feature": "sage green lower cabinets", "category": "material"}]"#;

/// Builds the user turn for `prompt`.
pub fn user_message(prompt: &str) -> String {
    format!("Extract visual features from this prompt: {}", prompt)
}

/// Asks a remote model for features; any failure degrades to `fallback`.
pub struct LlmDecomposer<E: FeatureExtractor> {
    extractor: E,
    fallback: HeuristicDecomposer,
    timeout: Duration,
}

impl<E: FeatureExtractor> std::fmt::Debug for LlmDecomposer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmDecomposer")
            .field("model", &self.extractor.model())
            .field("fallback", &self.fallback.kind())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<E: FeatureExtractor> LlmDecomposer<E> {
    pub fn new(extractor: E, fallback: HeuristicDecomposer, timeout: Duration) -> Self {
        Self {
            extractor,
            fallback,
            timeout,
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn fallback(&self) -> &HeuristicDecomposer {
        &self.fallback
    }

    /// Runs the remote call under the timeout and parses its reply.
    pub async fn try_extract(&self, prompt: &str) -> Result<Vec<Feature>, DecomposeError> {
        let user = user_message(prompt);
        let reply = tokio::time::timeout(
            self.timeout,
            self.extractor.extract(SYSTEM_INSTRUCTION, &user),
        )
        .await
        .map_err(|_| DecomposeError::Timeout(self.timeout))??;

        parse::parse_features(&reply)
    }
}

#[async_trait]
impl<E: FeatureExtractor> PromptDecomposer for LlmDecomposer<E> {
    async fn decompose(&self, prompt: &str) -> Vec<Feature> {
        match self.try_extract(prompt).await {
            Ok(features) => {
                info!(
                    model = %self.extractor.model(),
                    count = features.len(),
                    "LLM extracted features from prompt"
                );
                features
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = %self.fallback.kind(),
                    "LLM extraction failed, using heuristic fallback"
                );
                let features = self.fallback.decompose_sync(prompt);
                debug!(count = features.len(), "Fallback decomposition complete");
                features
            }
        }
    }

    fn kind(&self) -> DecomposerKind {
        DecomposerKind::Llm
    }
}
