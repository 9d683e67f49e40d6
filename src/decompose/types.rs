use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MIN_PHRASE_LEN;

/// Closed taxonomy of prompt features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Style,
    Layout,
    Material,
    Lighting,
    Fixtures,
    Photography,
    General,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 7] = [
        FeatureCategory::Style,
        FeatureCategory::Layout,
        FeatureCategory::Material,
        FeatureCategory::Lighting,
        FeatureCategory::Fixtures,
        FeatureCategory::Photography,
        FeatureCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCategory::Style => "style",
            FeatureCategory::Layout => "layout",
            FeatureCategory::Material => "material",
            FeatureCategory::Lighting => "lighting",
            FeatureCategory::Fixtures => "fixtures",
            FeatureCategory::Photography => "photography",
            FeatureCategory::General => "general",
        }
    }

    /// Parses a category label, mapping anything unrecognised to `General`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(FeatureCategory::General)
    }
}

impl FromStr for FeatureCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "style" => Ok(Self::Style),
            "layout" => Ok(Self::Layout),
            "material" | "materials" => Ok(Self::Material),
            "lighting" => Ok(Self::Lighting),
            "fixtures" | "fixture" => Ok(Self::Fixtures),
            "photography" => Ok(Self::Photography),
            "general" => Ok(Self::General),
            other => Err(format!("Unknown feature category: {}", other)),
        }
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decomposed, categorized span of the prompt (not yet scored).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub phrase: String,
    pub category: FeatureCategory,
}

impl Feature {
    /// Trims `phrase`; returns `None` unless it is longer than `min_len` chars.
    pub fn new(phrase: &str, category: FeatureCategory, min_len: usize) -> Option<Self> {
        let phrase = phrase.trim();
        if phrase.chars().count() <= min_len {
            return None;
        }
        Some(Self {
            phrase: phrase.to_string(),
            category,
        })
    }
}

/// Accumulates features in order, enforcing the length gate and phrase uniqueness.
#[derive(Debug)]
pub(crate) struct FeatureCollector {
    min_len: usize,
    seen: HashSet<String>,
    features: Vec<Feature>,
}

impl FeatureCollector {
    pub(crate) fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(MIN_PHRASE_LEN),
            seen: HashSet::new(),
            features: Vec::new(),
        }
    }

    /// Adds a phrase unless it is too short or already present (first occurrence wins).
    pub(crate) fn push(&mut self, phrase: &str, category: FeatureCategory) -> bool {
        let Some(feature) = Feature::new(phrase, category, self.min_len) else {
            return false;
        };
        if !self.seen.insert(feature.phrase.to_lowercase()) {
            return false;
        }
        self.features.push(feature);
        true
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub(crate) fn into_features(self) -> Vec<Feature> {
        self.features
    }
}

/// Splits on commas and periods, keeping fragments longer than `min_len` as `General`.
///
/// If every fragment is too short, the whole trimmed prompt becomes the single
/// feature (when it is itself longer than `min_len`).
pub(crate) fn split_fragments(prompt: &str, min_len: usize) -> Vec<Feature> {
    let mut collector = FeatureCollector::new(min_len);
    for fragment in prompt.split([',', '.']) {
        collector.push(fragment, FeatureCategory::General);
    }
    if collector.is_empty() {
        collector.push(prompt, FeatureCategory::General);
    }
    collector.into_features()
}
