//! Scriptable embedding provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::error::EmbeddingError;
use super::provider::EmbeddingProvider;

const MOCK_DIM: usize = 3;

/// Embedder whose image vector is fixed at `[1, 0, 0]` and whose text vectors
/// are chosen so that each registered text has an exact cosine similarity
/// with the image. Unregistered texts map to a vector orthogonal to the image.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    texts: RwLock<HashMap<String, Vec<f32>>>,
    fail_image: bool,
    fail_text: bool,
    text_calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` so that its similarity with the image is `similarity`.
    pub fn with_similarity(self, text: &str, similarity: f32) -> Self {
        self.set_similarity(text, similarity);
        self
    }

    pub fn set_similarity(&self, text: &str, similarity: f32) {
        let s = similarity.clamp(-1.0, 1.0);
        // Scaled by 2 so callers must normalise before the dot product.
        let v = vec![2.0 * s, 2.0 * (1.0 - s * s).sqrt(), 0.0];
        self.texts.write().insert(text.to_string(), v);
    }

    /// Makes every `encode_image` call fail.
    pub fn failing_image(mut self) -> Self {
        self.fail_image = true;
        self
    }

    /// Makes every `encode_text` call fail.
    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    /// Number of `encode_text` calls observed.
    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail_image || image.is_empty() {
            return Err(EmbeddingError::InvalidImage {
                reason: "mock image failure".to_string(),
            });
        }
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn encode_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_text {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock text failure".to_string(),
            });
        }
        let registered = self.texts.read();
        Ok(texts
            .iter()
            .map(|t| {
                registered
                    .get(*t)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0, 0.0, 1.0])
            })
            .collect())
    }

    fn embedding_dim(&self) -> usize {
        MOCK_DIM
    }

    fn is_stub(&self) -> bool {
        true
    }
}
