//! The explainable matching pipeline.
//!
//! ```text
//! (image, prompt)
//!   ├─ full-prompt similarity ─────────────► final_score (frozen)
//!   └─ decompose ─► score features ─► narrate ─► explanation
//! ```

pub mod engine;
pub mod error;
pub mod types;


pub use engine::ExplainableMatcher;
pub use error::MatchError;
pub use types::{FeatureBreakdown, MatchResult};
