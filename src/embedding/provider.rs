use super::error::EmbeddingError;

/// Joint image/text embedding model.
///
/// Both encoders return raw (not normalised) vectors; callers normalise with
/// [`normalize`] before taking dot products. Implementations are shared across
/// requests behind an `Arc` and must be safe for concurrent read-only use.
pub trait EmbeddingProvider: Send + Sync {
    /// Encodes one image given its encoded file bytes (PNG, JPEG, ...).
    fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbeddingError>;

    /// Encodes a batch of texts, one vector per input, in input order.
    fn encode_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimension of both encoders.
    fn embedding_dim(&self) -> usize;

    /// `true` when vectors come from a model-free stand-in.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Divides `v` by its L2 norm. Zero vectors are returned unchanged.
pub fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Cosine similarity of two raw vectors (normalises both).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    let a = normalize(a.to_vec());
    let b = normalize(b.to_vec());
    dot(&a, &b)
}
