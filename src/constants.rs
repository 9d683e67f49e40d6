//! Cross-cutting, shared constants.
//!
//! Tier thresholds and the narrative cutoff are fixed values inherited from the
//! scoring model's calibration. They are exposed as constants so every module
//! agrees on the same defaults, and carried at runtime through
//! [`TierThresholds`](crate::scoring::TierThresholds) and
//! [`NarratorConfig`](crate::narrative::NarratorConfig) so they stay configurable.

/// Feature similarity at or above which a feature is a strong match.
pub const STRONG_THRESHOLD: f32 = 0.45;

/// Feature similarity at or above which a feature is (at least) a partial match.
pub const PARTIAL_THRESHOLD: f32 = 0.25;

/// Overall score (percent) at or above which the match is labelled strong.
pub const STRONG_SCORE_PERCENT: f64 = 45.0;

/// Overall score (percent) at or above which the match is labelled moderate.
pub const MODERATE_SCORE_PERCENT: f64 = 25.0;

/// Max features listed per tier section of the explanation.
pub const DEFAULT_TOP_N: usize = 3;

/// Minimum phrase length (exclusive, in chars) for any decomposed feature.
pub const MIN_PHRASE_LEN: usize = 5;

/// Minimum fragment length (exclusive) for the pattern strategy's comma/period fallback.
pub const MIN_FRAGMENT_LEN: usize = 10;

/// CLIP ViT-B/32 joint embedding dimension.
pub const CLIP_EMBEDDING_DIM: usize = 512;

/// CLIP text encoder context length.
pub const CLIP_MAX_SEQ_LEN: usize = 77;

/// CLIP ViT-B/32 input resolution.
pub const CLIP_IMAGE_SIZE: usize = 224;

/// Default upper bound for uploaded request bodies (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Default timeout for the remote decomposition call.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 10;

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Response header carrying a short machine-readable status.
pub const STATUS_HEADER: &str = "x-roomlens-status";

/// Status value for a healthy liveness check.
pub const STATUS_HEALTHY: &str = "healthy";

/// Status value for a ready component.
pub const STATUS_READY: &str = "ready";

/// Status value for a failed component.
pub const STATUS_ERROR: &str = "error";
