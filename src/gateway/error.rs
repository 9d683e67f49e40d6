use axum::{
    Json,
    extract::multipart::MultipartError,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::STATUS_HEADER;
use crate::embedding::EmbeddingError;
use crate::matcher::MatchError;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("match failed: {0}")]
    Match(#[from] MatchError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Multipart(e) => (e.status(), "invalid_upload"),
            GatewayError::Match(MatchError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            GatewayError::Match(MatchError::Embedding(EmbeddingError::InvalidImage { .. })) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_image")
            }
            GatewayError::Match(MatchError::Embedding(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error")
            }
            GatewayError::Match(MatchError::Task(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            GatewayError::Storage(StoreError::EmptyLoginId) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            GatewayError::Storage(StoreError::UnknownUser(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            GatewayError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, roomlens_status) = self.classify();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(roomlens_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
