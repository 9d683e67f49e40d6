//! Human-readable explanation of a match score.
//!
//! The [`Narrator`] turns scored features and the overall score into fixed,
//! template-driven prose. Every sentence comes from [`NarrativeTemplates`], so
//! the wording can be swapped without touching the rendering logic.

pub mod narrator;
pub mod templates;


pub use narrator::{Narrator, NarratorConfig};
pub use templates::{NarrativeTemplates, ScoreBand, SectionTemplate};
