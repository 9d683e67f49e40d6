use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the persistence layer.
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("login id cannot be empty")]
    EmptyLoginId,

    #[error("upload directory unavailable: {path}")]
    UploadDirUnavailable { path: PathBuf },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
