use std::cmp::Ordering;

use crate::constants::{DEFAULT_TOP_N, MODERATE_SCORE_PERCENT, STRONG_SCORE_PERCENT};
use crate::scoring::{MatchTier, ScoredFeature};

use super::templates::{NarrativeTemplates, ScoreBand, SectionTemplate};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Score bands and section size for the [`Narrator`].
pub struct NarratorConfig {
    /// Overall score (percent) at or above which the match reads as strong.
    pub strong_score: f64,
    /// Overall score (percent) at or above which the match reads as moderate.
    pub moderate_score: f64,
    /// Max features listed per section.
    pub top_n: usize,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            strong_score: STRONG_SCORE_PERCENT,
            moderate_score: MODERATE_SCORE_PERCENT,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Renders the explanation text. Pure; same input, same output.
#[derive(Debug, Clone, Default)]
pub struct Narrator {
    templates: NarrativeTemplates,
    config: NarratorConfig,
}

impl Narrator {
    pub fn new(templates: NarrativeTemplates, config: NarratorConfig) -> Self {
        Self { templates, config }
    }

    pub fn with_config(config: NarratorConfig) -> Self {
        Self::new(NarrativeTemplates::DEFAULT, config)
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Band for an overall score in percent.
    pub fn band(&self, score_percent: f64) -> &ScoreBand {
        if score_percent >= self.config.strong_score {
            &self.templates.strong_band
        } else if score_percent >= self.config.moderate_score {
            &self.templates.moderate_band
        } else {
            &self.templates.weak_band
        }
    }

    pub fn render(&self, features: &[ScoredFeature], score_percent: f64) -> String {
        let strong = tier(features, MatchTier::Strong);
        let partial = tier(features, MatchTier::Partial);
        let weak = tier(features, MatchTier::Weak);
        let band = self.band(score_percent);
        let (n_strong, n_partial, n_weak) = (strong.len(), partial.len(), weak.len());

        let mut out = format!(
            "Overall Match Score: {:.2}% ({})\n{}",
            score_percent, band.label, band.assessment
        );

        self.section(&mut out, &self.templates.strong_section, strong, true);
        self.section(&mut out, &self.templates.partial_section, partial, true);
        self.section(&mut out, &self.templates.weak_section, weak, false);

        out.push_str(&format!(
            "\n\nSummary: Out of {} identified features, {} are strong matches, {} are partial matches, and {} are weak/missing. {}",
            features.len(),
            n_strong,
            n_partial,
            n_weak,
            band.closing
        ));
        out
    }

    fn section(
        &self,
        out: &mut String,
        template: &SectionTemplate,
        mut features: Vec<&ScoredFeature>,
        descending: bool,
    ) {
        if features.is_empty() {
            return;
        }

        // Stable sort: ties keep decomposition order.
        features.sort_by(|a, b| {
            let ord = a
                .similarity
                .partial_cmp(&b.similarity)
                .unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        });

        out.push_str("\n\n");
        out.push_str(template.heading);
        for f in features.into_iter().take(self.config.top_n) {
            out.push_str(&format!(
                "\n{}'{}' {} (feature similarity: {:.2})",
                self.templates.bullet,
                f.phrase(),
                template.predicate,
                f.similarity
            ));
        }
    }
}

fn tier(features: &[ScoredFeature], status: MatchTier) -> Vec<&ScoredFeature> {
    features.iter().filter(|f| f.status == status).collect()
}
