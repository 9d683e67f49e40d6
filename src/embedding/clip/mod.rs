//! CLIP embedder (safetensors weights + tokenizer).
//!
//! Use [`ClipConfig::stub`] for tests/examples without model files.

/// CLIP configuration.
pub mod config;
pub(crate) mod preprocess;


pub use config::{CLIP_EMBEDDING_DIM, CLIP_IMAGE_SIZE, CLIP_MAX_SEQ_LEN, ClipConfig};

use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig as CandleClipConfig, ClipModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::provider::EmbeddingProvider;

use preprocess::{decode_image, image_to_tensor};

const END_OF_TEXT: &str = "<|endoftext|>";

enum EmbedderBackend {
    Model {
        model: Arc<ClipModel>,
        tokenizer: Arc<Tokenizer>,
        pad_id: u32,
        device: Device,
    },
    Stub,
}

/// Joint image/text encoder backed by CLIP ViT-B/32 (supports stub mode).
pub struct ClipEmbedder {
    backend: EmbedderBackend,
    config: ClipConfig,
}

impl std::fmt::Debug for ClipEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl ClipEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: ClipConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("CLIP running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for CLIP");

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;
        let pad_id = tokenizer
            .token_to_id(END_OF_TEXT)
            .ok_or_else(|| EmbeddingError::ModelLoadFailed {
                reason: format!("tokenizer has no {} token", END_OF_TEXT),
            })?;

        let model_config = CandleClipConfig::vit_base_patch32();
        // SAFETY: the weights file is opened read-only and is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&config.weights_path], DType::F32, &device)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to map weights: {}", e),
        })?;
        let model =
            ClipModel::new(vb, &model_config).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to build CLIP model: {}", e),
            })?;

        info!(
            weights_path = %config.weights_path.display(),
            embedding_dim = config.embedding_dim,
            image_size = config.image_size,
            "CLIP model loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                model: Arc::new(model),
                tokenizer: Arc::new(tokenizer),
                pad_id,
                device,
            },
            config,
        })
    }

    /// Creates a stub embedder.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(ClipConfig::stub())
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    fn tokenize_batch(
        &self,
        texts: &[&str],
        tokenizer: &Tokenizer,
        pad_id: u32,
        device: &Device,
    ) -> Result<Tensor, EmbeddingError> {
        let mut rows = Vec::with_capacity(texts.len());
        for text in texts {
            let encoding =
                tokenizer
                    .encode(*text, true)
                    .map_err(|e| EmbeddingError::TokenizationFailed {
                        reason: e.to_string(),
                    })?;
            rows.push(fit_to_context(
                encoding.get_ids().to_vec(),
                self.config.max_seq_len,
                pad_id,
            ));
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(1);
        let mut flat = Vec::with_capacity(rows.len() * width);
        for mut ids in rows {
            ids.resize(width, pad_id);
            flat.extend(ids);
        }

        Ok(Tensor::from_vec(flat, (texts.len(), width), device)?)
    }

    fn stub_vector(&self, seed_bytes: &[u8]) -> Vec<f32> {
        let hash = blake3::hash(seed_bytes);
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&hash.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed);

        (0..self.config.embedding_dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }
}

/// Truncates `ids` to `max_len`, keeping `<|endoftext|>` as the last token.
///
/// The text tower pools at the highest token id, which must be the end token.
fn fit_to_context(mut ids: Vec<u32>, max_len: usize, eot_id: u32) -> Vec<u32> {
    if ids.len() > max_len {
        ids.truncate(max_len);
        if let Some(last) = ids.last_mut() {
            *last = eot_id;
        }
    }
    if ids.is_empty() {
        ids.push(eot_id);
    }
    ids
}

impl EmbeddingProvider for ClipEmbedder {
    fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        let decoded = decode_image(image)?;

        match &self.backend {
            EmbedderBackend::Model { model, device, .. } => {
                let pixels = image_to_tensor(&decoded, self.config.image_size, device)?;
                let features = model.get_image_features(&pixels)?;
                let embedding = features.squeeze(0)?.to_vec1::<f32>()?;
                debug!(dim = embedding.len(), "Encoded image");
                Ok(embedding)
            }
            EmbedderBackend::Stub => {
                debug!(bytes = image.len(), "Generating stub image embedding");
                Ok(self.stub_vector(image))
            }
        }
    }

    fn encode_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EmbedderBackend::Model {
                model,
                tokenizer,
                pad_id,
                device,
            } => {
                let input_ids = self.tokenize_batch(texts, tokenizer, *pad_id, device)?;
                debug!(batch = texts.len(), "Encoding text batch");
                let features = model.get_text_features(&input_ids)?;
                Ok(features.to_vec2::<f32>()?)
            }
            EmbedderBackend::Stub => Ok(texts
                .iter()
                .map(|text| self.stub_vector(text.as_bytes()))
                .collect()),
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }
}
