//! Prompt decomposition: free text → ordered, categorized feature phrases.
//!
//! Three interchangeable strategies sit behind [`PromptDecomposer`]:
//!
//! - [`LlmDecomposer`] asks a chat model for `{feature, category}` JSON and
//!   falls back to a heuristic on any failure.
//! - [`DelimiterDecomposer`] splits on commas and "and"/"with" and tags each
//!   fragment by keyword.
//! - [`PatternDecomposer`] runs fixed per-category regexes.
//!
//! None of them can fail a request: the worst outcome is an empty list.

pub mod config;
pub mod delimiter;
pub mod error;
pub mod llm;
pub mod pattern;
pub mod types;


pub use config::{DecomposerConfig, HeuristicKind};
pub use delimiter::DelimiterDecomposer;
pub use error::DecomposeError;
pub use llm::{FeatureExtractor, GenaiExtractor, LlmDecomposer};
#[cfg(any(test, feature = "mock"))]
pub use llm::MockExtractor;
pub use pattern::PatternDecomposer;
pub use types::{Feature, FeatureCategory};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

/// Turns a prompt into features. Never fails; degrades instead.
#[async_trait]
pub trait PromptDecomposer: Send + Sync {
    async fn decompose(&self, prompt: &str) -> Vec<Feature>;

    fn kind(&self) -> DecomposerKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecomposerKind {
    Llm,
    Delimiter,
    Pattern,
}

impl DecomposerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecomposerKind::Llm => "llm",
            DecomposerKind::Delimiter => "delimiter",
            DecomposerKind::Pattern => "pattern",
        }
    }
}

impl fmt::Display for DecomposerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either deterministic strategy.
#[derive(Debug, Clone)]
pub enum HeuristicDecomposer {
    Delimiter(DelimiterDecomposer),
    Pattern(PatternDecomposer),
}

impl HeuristicDecomposer {
    pub fn new(kind: HeuristicKind) -> Result<Self, DecomposeError> {
        Ok(match kind {
            HeuristicKind::Delimiter => Self::Delimiter(DelimiterDecomposer::new()?),
            HeuristicKind::Pattern => Self::Pattern(PatternDecomposer::new()?),
        })
    }

    pub fn decompose_sync(&self, prompt: &str) -> Vec<Feature> {
        match self {
            Self::Delimiter(d) => d.decompose(prompt),
            Self::Pattern(p) => p.decompose(prompt),
        }
    }

    pub fn kind(&self) -> DecomposerKind {
        match self {
            Self::Delimiter(_) => DecomposerKind::Delimiter,
            Self::Pattern(_) => DecomposerKind::Pattern,
        }
    }
}

#[async_trait]
impl PromptDecomposer for HeuristicDecomposer {
    async fn decompose(&self, prompt: &str) -> Vec<Feature> {
        self.decompose_sync(prompt)
    }

    fn kind(&self) -> DecomposerKind {
        HeuristicDecomposer::kind(self)
    }
}

/// Builds the configured strategy. Called once at startup.
pub fn build_decomposer(
    config: &DecomposerConfig,
) -> Result<Arc<dyn PromptDecomposer>, DecomposeError> {
    let heuristic = HeuristicDecomposer::new(config.heuristic)?;

    if config.credential_present {
        info!(
            model = %config.llm_model,
            timeout_secs = config.llm_timeout.as_secs(),
            key_var = %config.api_key_var,
            fallback = %heuristic.kind(),
            "Prompt decomposition via LLM"
        );
        let extractor = GenaiExtractor::from_config(config);
        return Ok(Arc::new(LlmDecomposer::new(
            extractor,
            heuristic,
            config.llm_timeout,
        )));
    }

    info!(
        strategy = %heuristic.kind(),
        key_var = %config.api_key_var,
        "No LLM credential configured, using heuristic decomposition"
    );
    Ok(Arc::new(heuristic))
}
