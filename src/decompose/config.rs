use std::env;
use std::time::Duration;

use crate::constants::DEFAULT_LLM_TIMEOUT_SECS;

use super::DecomposerKind;

/// Which heuristic runs when no LLM is configured (and as the LLM's fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeuristicKind {
    Delimiter,
    #[default]
    Pattern,
}

impl std::str::FromStr for HeuristicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delimiter" | "split" => Ok(Self::Delimiter),
            "pattern" | "regex" => Ok(Self::Pattern),
            other => Err(format!("Unknown heuristic: {}", other)),
        }
    }
}

impl From<HeuristicKind> for DecomposerKind {
    fn from(kind: HeuristicKind) -> Self {
        match kind {
            HeuristicKind::Delimiter => DecomposerKind::Delimiter,
            HeuristicKind::Pattern => DecomposerKind::Pattern,
        }
    }
}

/// Prompt decomposition settings.
#[derive(Debug, Clone)]
pub struct DecomposerConfig {
    /// Heuristic used standalone or as the LLM fallback.
    pub heuristic: HeuristicKind,
    /// Chat model used by the LLM strategy. Default: `gpt-4o`.
    pub llm_model: String,
    /// Upper bound on the remote call. Default: 10s.
    pub llm_timeout: Duration,
    /// Env var holding the provider credential. Default: `OPENAI_API_KEY`.
    pub api_key_var: String,
    /// Set when `api_key_var` held a non-empty value at load time.
    pub credential_present: bool,
}

/// Default chat model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

/// Default credential env var.
pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self {
            heuristic: HeuristicKind::default(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            credential_present: false,
        }
    }
}

impl DecomposerConfig {
    const ENV_HEURISTIC: &'static str = "ROOMLENS_HEURISTIC";
    const ENV_LLM_MODEL: &'static str = "ROOMLENS_LLM_MODEL";
    const ENV_LLM_TIMEOUT_SECS: &'static str = "ROOMLENS_LLM_TIMEOUT_SECS";
    const ENV_API_KEY_VAR: &'static str = "ROOMLENS_LLM_API_KEY_VAR";

    /// Loads config from environment variables (with defaults).
    ///
    /// A missing credential is not an error; it selects the heuristic strategy.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let heuristic = env::var(Self::ENV_HEURISTIC)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.heuristic);
        let llm_model = env::var(Self::ENV_LLM_MODEL)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.llm_model);
        let llm_timeout = env::var(Self::ENV_LLM_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.llm_timeout);
        let api_key_var = env::var(Self::ENV_API_KEY_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_key_var);
        let credential_present = env::var(&api_key_var).is_ok_and(|v| !v.trim().is_empty());

        Self {
            heuristic,
            llm_model,
            llm_timeout,
            api_key_var,
            credential_present,
        }
    }

    /// Heuristic-only config.
    pub fn heuristic(kind: HeuristicKind) -> Self {
        Self {
            heuristic: kind,
            ..Default::default()
        }
    }

    /// Strategy that [`build_decomposer`](super::build_decomposer) will select.
    pub fn selected_kind(&self) -> DecomposerKind {
        if self.credential_present {
            DecomposerKind::Llm
        } else {
            self.heuristic.into()
        }
    }
}
