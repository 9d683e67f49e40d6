use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default CLIP embedding dimension.
pub const CLIP_EMBEDDING_DIM: usize = crate::constants::CLIP_EMBEDDING_DIM;

/// Default CLIP text context length.
pub const CLIP_MAX_SEQ_LEN: usize = crate::constants::CLIP_MAX_SEQ_LEN;

/// Default CLIP input resolution.
pub const CLIP_IMAGE_SIZE: usize = crate::constants::CLIP_IMAGE_SIZE;

const WEIGHTS_FILENAME: &str = "model.safetensors";
const TOKENIZER_FILENAME: &str = "tokenizer.json";

#[derive(Debug, Clone)]
/// Configuration for [`ClipEmbedder`](super::ClipEmbedder).
pub struct ClipConfig {
    /// Path to the safetensors weights.
    pub weights_path: PathBuf,
    /// Path to `tokenizer.json`.
    pub tokenizer_path: PathBuf,
    /// Max text tokens (longer prompts are truncated).
    pub max_seq_len: usize,
    /// Square input resolution for the vision tower.
    pub image_size: usize,
    /// Output embedding dimension.
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::new(),
            tokenizer_path: PathBuf::new(),
            max_seq_len: CLIP_MAX_SEQ_LEN,
            image_size: CLIP_IMAGE_SIZE,
            embedding_dim: CLIP_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl ClipConfig {
    /// Creates a config for a model directory holding `model.safetensors` and `tokenizer.json`.
    pub fn from_dir<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();
        Self {
            weights_path: model_dir.join(WEIGHTS_FILENAME),
            tokenizer_path: model_dir.join(TOKENIZER_FILENAME),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be non-zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.max_seq_len == 0 || self.image_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len and image_size must be non-zero".to_string(),
            });
        }

        for path in [&self.weights_path, &self.tokenizer_path] {
            if path.as_os_str().is_empty() {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "model paths are required (stubbing is disabled)".to_string(),
                });
            }
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path: path.clone() });
            }
        }

        Ok(())
    }
}
