use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding task failed: {0}")]
    Task(String),
}

impl MatchError {
    /// Returns `true` if the caller supplied bad input (as opposed to a model failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, MatchError::InvalidInput(_))
    }
}
