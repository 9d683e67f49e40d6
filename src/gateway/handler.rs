use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::gateway::error::GatewayError;
use crate::gateway::state::AppState;
use crate::matcher::MatchResult;
use crate::storage::{MatchRecord, MatchStore, NewMatch, StoreResult, User};

/// Filename recorded when the client sends none.
const DEFAULT_UPLOAD_NAME: &str = "image";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserCheckResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarityResponse {
    /// Percent, formatted with two decimals.
    pub similarity: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    #[serde(flatten)]
    pub result: MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user: User,
    pub matches: Vec<MatchRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Fields of an image/prompt upload.
#[derive(Debug)]
pub(crate) struct MatchUpload {
    pub image: Vec<u8>,
    pub filename: Option<String>,
    pub prompt: String,
    pub user_id: Option<String>,
}

pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<MatchUpload, GatewayError> {
    let mut image = None;
    let mut filename = None;
    let mut prompt = None;
    let mut user_id = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                filename = field.file_name().map(str::to_string);
                image = Some(field.bytes().await?.to_vec());
            }
            Some("prompt") => prompt = Some(field.text().await?),
            Some("user_id") => {
                user_id = Some(field.text().await?)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty());
            }
            other => debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    let image =
        image.ok_or_else(|| GatewayError::InvalidRequest("No image file provided".to_string()))?;
    let prompt =
        prompt.ok_or_else(|| GatewayError::InvalidRequest("No prompt provided".to_string()))?;

    Ok(MatchUpload {
        image,
        filename,
        prompt,
        user_id,
    })
}

/// Runs a store call on the blocking pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, GatewayError>
where
    T: Send + 'static,
    F: FnOnce(&dyn MatchStore) -> StoreResult<T> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| GatewayError::Internal(format!("Store task failed: {}", e)))?
        .map_err(GatewayError::from)
}

#[instrument(skip(state, request))]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, GatewayError> {
    let login_id = request
        .login_id
        .ok_or_else(|| GatewayError::InvalidRequest("Login ID is required".to_string()))?;
    let login_id = login_id.trim().to_string();
    if login_id.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "Login ID cannot be empty".to_string(),
        ));
    }

    let user = with_store(&state, move |s| s.create_or_get_user(&login_id)).await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        user,
    })
    .into_response())
}

#[instrument(skip(state))]
pub async fn check_user_handler(
    State(state): State<AppState>,
    Path(login_id): Path<String>,
) -> Result<Response, GatewayError> {
    let user = with_store(&state, move |s| s.find_user_by_login(&login_id)).await?;

    let status = if user.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((
        status,
        Json(UserCheckResponse {
            exists: user.is_some(),
            user,
        }),
    )
        .into_response())
}

/// Similarity only, nothing stored.
#[instrument(skip(state, multipart))]
pub async fn match_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let upload = read_upload(multipart).await?;
    let score = state
        .matcher
        .compute_score(upload.image, &upload.prompt)
        .await?;

    Ok(Json(SimilarityResponse {
        similarity: format!("{:.2}", score),
    })
    .into_response())
}

/// Score plus explanation; saved when `user_id` names a known user.
#[instrument(skip(state, multipart), fields(user_id = tracing::field::Empty))]
pub async fn explain_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let upload = read_upload(multipart).await?;

    let Some(user_id) = upload.user_id.clone() else {
        let result = state
            .matcher
            .explain(upload.image, &upload.prompt)
            .await?;
        return Ok(Json(ExplainResponse {
            result,
            saved: None,
            match_id: None,
        })
        .into_response());
    };
    tracing::Span::current().record("user_id", tracing::field::display(&user_id));

    let result = state
        .matcher
        .explain(upload.image.clone(), &upload.prompt)
        .await?;

    let (saved, match_id) = match save_result(&state, user_id, upload, &result).await {
        Ok(Some(match_id)) => (Some(true), Some(match_id)),
        Ok(None) => (None, None),
        Err(e) => {
            warn!(error = %e, "Failed to save match, returning unsaved result");
            (Some(false), None)
        }
    };

    Ok(Json(ExplainResponse {
        result,
        saved,
        match_id,
    })
    .into_response())
}

/// Returns `Ok(None)` if `user_id` is not a known user.
async fn save_result(
    state: &AppState,
    user_id: String,
    upload: MatchUpload,
    result: &MatchResult,
) -> Result<Option<String>, GatewayError> {
    let lookup_id = user_id.clone();
    if with_store(state, move |s| s.get_user(&lookup_id))
        .await?
        .is_none()
    {
        debug!(user_id = %user_id, "Unknown user, result not saved");
        return Ok(None);
    }

    let new_match = NewMatch::from_result(
        user_id,
        upload.prompt,
        upload
            .filename
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string()),
        upload.image,
        result,
    );
    let match_id = with_store(state, move |s| s.save_match(new_match)).await?;

    info!(match_id = %match_id, score = result.final_score, "Match saved");
    Ok(Some(match_id))
}

#[instrument(skip(state))]
pub async fn history_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, GatewayError> {
    let lookup_id = user_id.clone();
    let user = with_store(&state, move |s| s.get_user(&lookup_id))
        .await?
        .ok_or_else(|| GatewayError::NotFound("User not found".to_string()))?;

    let matches = with_store(&state, move |s| s.list_matches(&user_id)).await?;

    Ok(Json(HistoryResponse { user, matches }).into_response())
}

#[instrument(skip(state))]
pub async fn match_detail_handler(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Response, GatewayError> {
    let record = with_store(&state, move |s| s.get_match(&match_id))
        .await?
        .ok_or_else(|| GatewayError::NotFound("Match not found".to_string()))?;

    Ok(Json(record).into_response())
}

#[instrument(skip(state))]
pub async fn delete_match_handler(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Response, GatewayError> {
    let deleted = with_store(&state, move |s| s.delete_match(&match_id)).await?;
    if !deleted {
        return Err(GatewayError::NotFound(
            "Match not found or deletion failed".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Match deleted successfully",
    })
    .into_response())
}
