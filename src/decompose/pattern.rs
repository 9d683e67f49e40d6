use regex::Regex;
use tracing::debug;

use crate::constants::{MIN_FRAGMENT_LEN, MIN_PHRASE_LEN};

use super::error::DecomposeError;
use super::types::{Feature, FeatureCategory, FeatureCollector, split_fragments};

const STYLE_PATTERNS: &[&str] = &[
    r"\b(?:modern|contemporary|traditional|rustic|industrial|minimalist|scandinavian|farmhouse|elegant|luxury|luxurious|cozy|transitional|coastal)(?:\s+(?:modern|contemporary|traditional|rustic|industrial|minimalist|scandinavian|farmhouse|elegant|luxury|cozy))?\s+(?:kitchen|style|design|interior|space|room|home|aesthetic|decor)\b",
];

const LAYOUT_PATTERNS: &[&str] = &[
    r"\b(?:(?:large|small|center|central|kitchen|waterfall)\s+)?island\b",
    r"\bopen[- ]concept(?:\s+(?:layout|design|kitchen|space|floor plan|living area))?\b",
    r"\b[lui][- ]shaped(?:\s+(?:layout|kitchen|counter|island))?\b",
    r"\bgalley(?:\s+(?:kitchen|layout))?\b",
    r"\bpeninsula\b",
    r"\bbreakfast\s+(?:counter|bar|nook)\b",
    r"\bdining\s+area\b",
    r"\bbar\s+seating\b",
];

const MATERIAL_PATTERNS: &[&str] = &[
    r"\b(?:(?:white|black|grey|gray|dark|light|natural|polished|honed|reclaimed)\s+)?(?:wooden|wood|oak|walnut|marble|granite|quartz|stone|concrete|butcher block|stainless steel|brass)\s+(?:cabinets?|cabinetry|countertops?|counters?|backsplash|flooring|floors?|walls?|shelves|shelving)\b",
    r"\b(?:sage green|forest green|navy blue|white|black|grey|gray|navy|beige|cream|brown|green|blue)\s+(?:(?:lower|upper|shaker|flat[- ]panel|painted)\s+)?(?:cabinets?|cabinetry|countertops?|backsplash|flooring|floors?|walls?)\b",
    r"\b(?:subway|zellige|ceramic|mosaic|herringbone)\s+tiles?(?:\s+backsplash)?\b",
];

const LIGHTING_PATTERNS: &[&str] = &[
    r"\b(?:warm|cool|soft|bright|natural|led|pendant|recessed|track|ambient|accent|task)\s+(?:lighting|lights?|lamps?)\b",
    r"\bunder[- ]cabinet\s+(?:lighting|lights?)\b",
    r"\b(?:(?:crystal|brass|modern|glass)\s+)?chandeliers?\b",
    r"\bnatural\s+(?:daylight|sunlight)\b",
];

const FIXTURE_PATTERNS: &[&str] = &[
    r"\b(?:stainless steel|black stainless|matte black|matte white|brushed nickel|brushed brass|black|white|matte|chrome|brass|gold)\s+(?:appliances|refrigerator|fridge|oven|stove|range hood|range|dishwasher|sink|faucets?|hardware)\b",
    r"\b(?:farmhouse|undermount|double|single|apron[- ]front)\s+(?:(?:basin|bowl)\s+)?sinks?\b",
];

const PHOTOGRAPHY_PATTERNS: &[&str] = &[
    r"\b(?:wide[- ]angle|close[- ]up|panoramic|aerial|overhead|eye[- ]level)\s+(?:shot|view|photo|photograph|perspective|lens)\b",
    r"\binterior\s+photography\b",
    r"\barchitectural\s+(?:shot|photo|photography)\b",
    r"\b(?:professional|real estate|editorial)\s+photo(?:graphy|graph)?\b",
];

/// Category order is also output order.
const PATTERN_TABLE: &[(FeatureCategory, &[&str])] = &[
    (FeatureCategory::Style, STYLE_PATTERNS),
    (FeatureCategory::Layout, LAYOUT_PATTERNS),
    (FeatureCategory::Material, MATERIAL_PATTERNS),
    (FeatureCategory::Lighting, LIGHTING_PATTERNS),
    (FeatureCategory::Fixtures, FIXTURE_PATTERNS),
    (FeatureCategory::Photography, PHOTOGRAPHY_PATTERNS),
];

/// Extracts features by running per-category regexes over the lowercased prompt.
#[derive(Debug, Clone)]
pub struct PatternDecomposer {
    patterns: Vec<(FeatureCategory, Regex)>,
}

impl PatternDecomposer {
    pub fn new() -> Result<Self, DecomposeError> {
        let mut patterns = Vec::new();
        for (category, sources) in PATTERN_TABLE {
            for source in *sources {
                patterns.push((*category, Regex::new(source)?));
            }
        }
        Ok(Self { patterns })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn decompose(&self, prompt: &str) -> Vec<Feature> {
        let lower = prompt.to_lowercase();
        let mut collector = FeatureCollector::new(MIN_PHRASE_LEN);

        for (category, pattern) in &self.patterns {
            for m in pattern.find_iter(&lower) {
                collector.push(m.as_str(), *category);
            }
        }

        if collector.is_empty() {
            debug!("No pattern matched, splitting prompt into general fragments");
            return split_fragments(prompt, MIN_FRAGMENT_LEN);
        }

        let features = collector.into_features();
        debug!(count = features.len(), "Pattern decomposition complete");
        features
    }
}
