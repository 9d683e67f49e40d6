//! Per-feature similarity scoring.
//!
//! Each decomposed phrase is embedded (one batch call per request), compared
//! with the image embedding, and classified into a [`MatchTier`]. The result
//! only explains the overall score; it never changes it.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::FeatureScorer;
pub use types::{MatchTier, ScoredFeature, TierThresholds};
