//! HTTP gateway (Axum) over the matcher and the match store.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    check_user_handler, delete_match_handler, explain_handler, history_handler, login_handler,
    match_detail_handler, match_handler,
};
pub use state::AppState;

use crate::constants::{STATUS_ERROR, STATUS_HEADER, STATUS_HEALTHY, STATUS_READY};

pub fn create_router_with_state(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/check/{login_id}", get(check_user_handler))
        .route("/api/match", post(match_handler))
        .route("/api/explain", post(explain_handler))
        .route("/api/history/{user_id}", get(history_handler))
        .route(
            "/api/history/match/{match_id}",
            get(match_detail_handler).delete(delete_match_handler),
        )
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub uploads: &'static str,
    pub embedder_mode: &'static str,
    pub decomposer: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_HEALTHY));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let uploads = if state.upload_dir.is_dir() {
        STATUS_READY
    } else {
        STATUS_ERROR
    };

    let embedder_mode = if state.matcher.embedder().is_stub() {
        "stub"
    } else {
        "real"
    };

    let components = ComponentStatus {
        http: STATUS_READY,
        uploads,
        embedder_mode,
        decomposer: state.matcher.decomposer().kind().as_str(),
    };

    let is_ready = components.uploads == STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
