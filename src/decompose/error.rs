use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("invalid extraction pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("decomposition provider request failed: {0}")]
    Provider(String),

    #[error("decomposition provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider returned no usable features")]
    NoFeatures,
}

impl From<serde_json::Error> for DecomposeError {
    fn from(err: serde_json::Error) -> Self {
        DecomposeError::MalformedResponse(err.to_string())
    }
}
