//! RoomLens library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Matching
//! - [`ExplainableMatcher`] - Overall score plus per-feature explanation
//! - [`MatchResult`], [`FeatureBreakdown`] - Explain output
//!
//! ## Embedding & Scoring
//! - [`ClipEmbedder`], [`ClipConfig`] - Joint image/text embeddings
//! - [`EmbeddingProvider`] - Seam for alternative encoders
//! - [`FeatureScorer`], [`MatchTier`], [`TierThresholds`] - Feature tiers
//!
//! ## Prompt Decomposition
//! - [`PromptDecomposer`], [`build_decomposer`] - LLM or heuristic strategies
//! - [`Feature`], [`FeatureCategory`]
//!
//! ## Narrative
//! - [`Narrator`], [`NarrativeTemplates`] - Plain-text explanation
//!
//! ## Persistence & HTTP
//! - [`MatchStore`], [`InMemoryMatchStore`], [`ImageStore`] - Users, history, uploads
//! - [`gateway::create_router_with_state`] - Axum router
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod decompose;
pub mod embedding;
pub mod gateway;
pub mod matcher;
pub mod narrative;
pub mod scoring;
pub mod storage;

pub use config::{Config, ConfigError};
pub use decompose::{
    DecomposeError, DecomposerConfig, DecomposerKind, Feature, FeatureCategory,
    HeuristicDecomposer, HeuristicKind, PromptDecomposer, build_decomposer,
};
#[cfg(any(test, feature = "mock"))]
pub use decompose::MockExtractor;
pub use embedding::{ClipConfig, ClipEmbedder, EmbeddingError, EmbeddingProvider};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use gateway::{AppState, GatewayError};
pub use matcher::{ExplainableMatcher, FeatureBreakdown, MatchError, MatchResult};
pub use narrative::{NarrativeTemplates, Narrator, NarratorConfig};
pub use scoring::{FeatureScorer, MatchTier, ScoredFeature, ScoringError, TierThresholds};
pub use storage::{
    ImageStore, InMemoryMatchStore, MatchRecord, MatchStore, NewMatch, StoreError, User,
};
