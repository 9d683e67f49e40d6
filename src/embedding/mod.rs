//! Embedding + model utilities.
//!
//! - [`provider`] defines the [`EmbeddingProvider`] seam used by the matcher.
//! - [`clip`] provides the CLIP-backed implementation.

/// CLIP joint image/text embedder.
pub mod clip;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Provider trait and vector helpers.
pub mod provider;

pub use clip::{CLIP_EMBEDDING_DIM, CLIP_IMAGE_SIZE, CLIP_MAX_SEQ_LEN, ClipConfig, ClipEmbedder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use provider::{EmbeddingProvider, cosine_similarity, dot, normalize};
