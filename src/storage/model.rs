use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matcher::{FeatureBreakdown, MatchResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login_id: String,
    pub created_at: DateTime<Utc>,
}

/// A match to be saved. The image bytes are written to the upload directory.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub user_id: String,
    pub prompt: String,
    /// Filename as uploaded by the client.
    pub image_filename: String,
    pub image_bytes: Vec<u8>,
    pub match_score: f64,
    pub explanation: String,
    pub feature_breakdown: Vec<FeatureBreakdown>,
}

impl NewMatch {
    pub fn from_result(
        user_id: impl Into<String>,
        prompt: impl Into<String>,
        image_filename: impl Into<String>,
        image_bytes: Vec<u8>,
        result: &MatchResult,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            prompt: prompt.into(),
            image_filename: image_filename.into(),
            image_bytes,
            match_score: result.final_score,
            explanation: result.explanation_text.clone(),
            feature_breakdown: result.feature_breakdown.clone(),
        }
    }
}

/// A saved match as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub image_filename: String,
    /// Name of the image file in the upload directory.
    pub stored_filename: String,
    pub image_path: String,
    pub match_score: f64,
    pub explanation: String,
    pub feature_breakdown: Vec<FeatureBreakdown>,
    pub created_at: DateTime<Utc>,
}
