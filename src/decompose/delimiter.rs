use regex::Regex;
use tracing::debug;

use crate::constants::MIN_PHRASE_LEN;

use super::error::DecomposeError;
use super::types::{Feature, FeatureCategory, FeatureCollector, split_fragments};

const STYLE_KEYWORDS: &[&str] = &[
    "modern",
    "contemporary",
    "traditional",
    "rustic",
    "industrial",
    "minimalist",
    "scandinavian",
    "farmhouse",
    "elegant",
    "luxury",
    "cozy",
];

const MATERIAL_KEYWORDS: &[&str] = &[
    "cabinet",
    "countertop",
    "backsplash",
    "wood",
    "marble",
    "granite",
    "quartz",
    "stone",
    "flooring",
    "tile",
];

const LIGHTING_KEYWORDS: &[&str] = &["light", "pendant", "chandelier", "led", "lamp", "sconce"];

const LAYOUT_KEYWORDS: &[&str] = &[
    "island",
    "layout",
    "open concept",
    "shaped",
    "galley",
    "peninsula",
    "dining area",
    "bar seating",
];

const FIXTURE_KEYWORDS: &[&str] = &[
    "appliance",
    "sink",
    "faucet",
    "oven",
    "refrigerator",
    "fridge",
    "stove",
];

/// Checked in order; the first set with a hit decides the category.
const KEYWORD_SETS: &[(FeatureCategory, &[&str])] = &[
    (FeatureCategory::Style, STYLE_KEYWORDS),
    (FeatureCategory::Material, MATERIAL_KEYWORDS),
    (FeatureCategory::Lighting, LIGHTING_KEYWORDS),
    (FeatureCategory::Layout, LAYOUT_KEYWORDS),
    (FeatureCategory::Fixtures, FIXTURE_KEYWORDS),
];

/// Splits the prompt on commas and the conjunctions "and"/"with", then tags
/// each fragment by keyword membership.
#[derive(Debug, Clone)]
pub struct DelimiterDecomposer {
    splitter: Regex,
}

impl DelimiterDecomposer {
    pub fn new() -> Result<Self, DecomposeError> {
        Ok(Self {
            splitter: Regex::new(r"(?i),|\s+and\s+|\s+with\s+")?,
        })
    }

    pub fn decompose(&self, prompt: &str) -> Vec<Feature> {
        let mut collector = FeatureCollector::new(MIN_PHRASE_LEN);
        for fragment in self.splitter.split(prompt) {
            collector.push(fragment, categorize(fragment));
        }

        if collector.is_empty() {
            debug!("Delimiter split produced nothing, falling back to raw fragments");
            return split_fragments(prompt, MIN_PHRASE_LEN);
        }

        let features = collector.into_features();
        debug!(count = features.len(), "Delimiter decomposition complete");
        features
    }
}

/// Returns the category of the first keyword set matching `fragment`.
pub(crate) fn categorize(fragment: &str) -> FeatureCategory {
    let lower = fragment.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let padded = format!(" {} ", words.join(" "));

    KEYWORD_SETS
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|kw| {
                if kw.contains(' ') {
                    padded.contains(&format!(" {} ", kw))
                } else {
                    words.iter().any(|w| w.starts_with(kw))
                }
            })
        })
        .map(|(category, _)| *category)
        .unwrap_or(FeatureCategory::General)
}
