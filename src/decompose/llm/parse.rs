use serde::Deserialize;

use crate::constants::MIN_PHRASE_LEN;
use crate::decompose::error::DecomposeError;
use crate::decompose::types::{Feature, FeatureCategory, FeatureCollector};

#[derive(Debug, Deserialize)]
struct RawFeature {
    feature: String,
    #[serde(default)]
    category: Option<String>,
}

/// Strips a surrounding markdown code fence (with or without a language tag).
pub(crate) fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let inner = trimmed.split("```").nth(1).unwrap_or_default();
    let inner = match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &inner[4..],
        _ => inner,
    };
    inner.trim()
}

/// Parses a provider reply into features, applying the usual phrase invariants.
pub(crate) fn parse_features(reply: &str) -> Result<Vec<Feature>, DecomposeError> {
    let body = strip_code_fence(reply);
    let body = match (body.find('['), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(DecomposeError::MalformedResponse(
                "reply contains no JSON array".to_string(),
            ));
        }
    };

    let raw: Vec<RawFeature> = serde_json::from_str(body)?;

    let mut collector = FeatureCollector::new(MIN_PHRASE_LEN);
    for item in raw {
        let category = item
            .category
            .as_deref()
            .map(FeatureCategory::parse_lenient)
            .unwrap_or(FeatureCategory::General);
        collector.push(&item.feature, category);
    }

    if collector.is_empty() {
        return Err(DecomposeError::NoFeatures);
    }
    Ok(collector.into_features())
}
