/// Wording for one overall-score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBand {
    /// Label in the header, e.g. `Strong Match`.
    pub label: &'static str,
    /// Sentence following the header.
    pub assessment: &'static str,
    /// Sentence closing the summary.
    pub closing: &'static str,
}

/// Wording for one feature-tier section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTemplate {
    pub heading: &'static str,
    /// Predicate after the quoted phrase, e.g. `is clearly present`.
    pub predicate: &'static str,
}

/// All fixed text used by the [`Narrator`](super::Narrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeTemplates {
    pub strong_band: ScoreBand,
    pub moderate_band: ScoreBand,
    pub weak_band: ScoreBand,
    pub strong_section: SectionTemplate,
    pub partial_section: SectionTemplate,
    pub weak_section: SectionTemplate,
    pub bullet: &'static str,
}

impl NarrativeTemplates {
    pub const DEFAULT: NarrativeTemplates = NarrativeTemplates {
        strong_band: ScoreBand {
            label: "Strong Match",
            assessment: "This high score indicates the image aligns well with the prompt.",
            closing: "This explains the high overall match score.",
        },
        moderate_band: ScoreBand {
            label: "Moderate Match",
            assessment: "This moderate score suggests some alignment with mixed results.",
            closing: "The mixed results explain the moderate overall score.",
        },
        weak_band: ScoreBand {
            label: "Weak Match",
            assessment: "This low score indicates significant misalignment with the prompt.",
            closing: "The lack of strong matches explains the low overall score.",
        },
        strong_section: SectionTemplate {
            heading: "✓ Strong Matches (Contributing to the score):",
            predicate: "is clearly present",
        },
        partial_section: SectionTemplate {
            heading: "◐ Partial Matches (Somewhat contributing):",
            predicate: "is partially visible",
        },
        weak_section: SectionTemplate {
            heading: "✗ Weak/Missing Features (Lowering the score):",
            predicate: "is not clearly visible",
        },
        bullet: "  • ",
    };
}

impl Default for NarrativeTemplates {
    fn default() -> Self {
        Self::DEFAULT
    }
}
