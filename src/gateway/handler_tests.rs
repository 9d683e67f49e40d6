//! Router-level tests for the gateway handlers.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::constants::STATUS_HEADER;
use crate::decompose::{HeuristicDecomposer, HeuristicKind};
use crate::embedding::MockEmbedder;
use crate::gateway::{AppState, create_router_with_state};
use crate::matcher::ExplainableMatcher;
use crate::storage::{ImageStore, InMemoryMatchStore, MatchStore};

const PROMPT: &str = "modern kitchen, sage green cabinets, pendant lighting";
const BOUNDARY: &str = "roomlens-test-boundary";
const IMAGE_BYTES: &[u8] = b"\x89PNG fake image bytes";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

struct TestApp {
    router: Router,
    store: Arc<InMemoryMatchStore>,
    _dir: TempDir,
}

fn test_matcher() -> ExplainableMatcher {
    let embedder = MockEmbedder::new()
        .with_similarity(PROMPT, 0.4632)
        .with_similarity("modern kitchen", 0.62)
        .with_similarity("sage green cabinets", 0.31)
        .with_similarity("pendant lighting", 0.12);
    ExplainableMatcher::new(
        Arc::new(embedder),
        Arc::new(HeuristicDecomposer::new(HeuristicKind::Pattern).unwrap()),
    )
}

fn build_app(max_upload_bytes: usize, broken_uploads: bool) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let upload_dir = dir.path().join("uploads");
    if broken_uploads {
        std::fs::write(&upload_dir, b"not a directory").unwrap();
    } else {
        std::fs::create_dir_all(&upload_dir).unwrap();
    }

    let store = Arc::new(InMemoryMatchStore::new(ImageStore::new(upload_dir.clone())));
    let state = AppState::new(
        Arc::new(test_matcher()),
        store.clone(),
        upload_dir,
        max_upload_bytes,
    );

    TestApp {
        router: create_router_with_state(state),
        store,
        _dir: dir,
    }
}

fn test_app() -> TestApp {
    build_app(1024 * 1024, false)
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn explain_parts<'a>(user_id: Option<&'a str>) -> Vec<Part<'a>> {
    let mut parts = vec![
        Part::File("image", "My Kitchen.png", IMAGE_BYTES),
        Part::Text("prompt", PROMPT),
    ];
    if let Some(id) = user_id {
        parts.push(Part::Text("user_id", id));
    }
    parts
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(empty_request("GET", "/healthz"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(STATUS_HEADER).unwrap(), "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_components() {
        let app = test_app();
        let (status, json) = send(&app.router, empty_request("GET", "/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["components"]["embedder_mode"], "stub");
        assert_eq!(json["components"]["decomposer"], "pattern");
        assert_eq!(json["components"]["uploads"], "ready");
    }

    #[tokio::test]
    async fn test_ready_unavailable_without_upload_dir() {
        let app = build_app(1024, true);
        let (status, json) = send(&app.router, empty_request("GET", "/ready")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["components"]["uploads"], "error");
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_creates_then_returns_user() {
        let app = test_app();
        let body = serde_json::json!({"login_id": "alice"});

        let (status, first) = send(&app.router, json_request("POST", "/api/auth/login", body.clone())).await;
        let (_, second) = send(&app.router, json_request("POST", "/api/auth/login", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["message"], "Login successful");
        assert_eq!(first["user"]["login_id"], "alice");
        assert_eq!(first["user"]["id"], second["user"]["id"]);
    }

    #[tokio::test]
    async fn test_login_requires_login_id() {
        let app = test_app();

        let (status, json) =
            send(&app.router, json_request("POST", "/api/auth/login", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 400);
        assert!(json["error"].as_str().unwrap().contains("Login ID is required"));

        let (status, json) = send(
            &app.router,
            json_request("POST", "/api/auth/login", serde_json::json!({"login_id": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn test_check_user() {
        let app = test_app();

        let (status, json) = send(&app.router, empty_request("GET", "/api/auth/check/bob")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({"exists": false}));

        app.store.create_or_get_user("bob").unwrap();
        let (status, json) = send(&app.router, empty_request("GET", "/api/auth/check/bob")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["exists"], true);
        assert_eq!(json["user"]["login_id"], "bob");
    }
}

mod match_tests {
    use super::*;

    #[tokio::test]
    async fn test_match_returns_formatted_similarity() {
        let app = test_app();
        let request = multipart_request(
            "/api/match",
            &[
                Part::File("image", "kitchen.png", IMAGE_BYTES),
                Part::Text("prompt", PROMPT),
            ],
        );

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"similarity": "46.32"}));
        assert_eq!(app.store.match_count(), 0);
    }

    #[tokio::test]
    async fn test_match_requires_image() {
        let app = test_app();
        let request = multipart_request("/api/match", &[Part::Text("prompt", PROMPT)]);

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("No image file provided"));
    }

    #[tokio::test]
    async fn test_match_requires_prompt() {
        let app = test_app();
        let request = multipart_request(
            "/api/match",
            &[Part::File("image", "kitchen.png", IMAGE_BYTES)],
        );

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("No prompt provided"));
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected() {
        let app = test_app();
        let request = multipart_request(
            "/api/match",
            &[
                Part::File("image", "kitchen.png", IMAGE_BYTES),
                Part::Text("prompt", "   "),
            ],
        );

        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(STATUS_HEADER).unwrap(),
            "invalid_request"
        );
    }

    #[tokio::test]
    async fn test_upload_over_limit_rejected() {
        let app = build_app(256, false);
        let big = vec![7u8; 4096];
        let request = multipart_request(
            "/api/match",
            &[
                Part::File("image", "big.png", &big),
                Part::Text("prompt", PROMPT),
            ],
        );

        let (status, _) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}

mod explain_tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_explain_is_not_saved() {
        let app = test_app();
        let request = multipart_request("/api/explain", &explain_parts(None));

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["final_score"], 46.32);
        assert_eq!(json["feature_breakdown"].as_array().unwrap().len(), 3);
        assert_eq!(json["feature_breakdown"][0]["feature"], "modern kitchen");
        assert_eq!(json["feature_breakdown"][0]["status"], "strong");
        assert!(
            json["explanation_text"]
                .as_str()
                .unwrap()
                .starts_with("Overall Match Score: 46.32% (Strong Match)")
        );
        assert!(json.get("saved").is_none());
        assert!(json.get("match_id").is_none());
        assert_eq!(app.store.match_count(), 0);
    }

    #[tokio::test]
    async fn test_explain_saves_for_known_user() {
        let app = test_app();
        let user = app.store.create_or_get_user("alice").unwrap();
        let request = multipart_request("/api/explain", &explain_parts(Some(&user.id)));

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["saved"], true);
        let match_id = json["match_id"].as_str().unwrap();

        let record = app.store.get_match(match_id).unwrap().unwrap();
        assert_eq!(record.prompt, PROMPT);
        assert_eq!(record.image_filename, "My Kitchen.png");
        assert_eq!(record.stored_filename, format!("{}_My_Kitchen_1.png", user.id));
        assert_eq!(record.match_score, 46.32);
        assert_eq!(record.feature_breakdown.len(), 3);
    }

    #[tokio::test]
    async fn test_explain_unknown_user_not_saved() {
        let app = test_app();
        let request = multipart_request("/api/explain", &explain_parts(Some("ghost")));

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.get("saved").is_none());
        assert_eq!(app.store.match_count(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_still_returns_result() {
        let app = build_app(1024 * 1024, true);
        let user = app.store.create_or_get_user("alice").unwrap();
        let request = multipart_request("/api/explain", &explain_parts(Some(&user.id)));

        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["saved"], false);
        assert!(json.get("match_id").is_none());
        assert_eq!(json["final_score"], 46.32);
    }
}

mod history_tests {
    use super::*;

    async fn saved_match(app: &TestApp) -> (String, String) {
        let user = app.store.create_or_get_user("alice").unwrap();
        let request = multipart_request("/api/explain", &explain_parts(Some(&user.id)));
        let (_, json) = send(&app.router, request).await;
        (user.id, json["match_id"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_history_lists_saved_matches() {
        let app = test_app();
        let (user_id, match_id) = saved_match(&app).await;

        let (status, json) =
            send(&app.router, empty_request("GET", &format!("/api/history/{}", user_id))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["id"], user_id.as_str());
        assert_eq!(json["matches"][0]["id"], match_id.as_str());
    }

    #[tokio::test]
    async fn test_history_unknown_user() {
        let app = test_app();
        let (status, json) = send(&app.router, empty_request("GET", "/api/history/ghost")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "User not found");
    }

    #[tokio::test]
    async fn test_match_detail_and_uploaded_image() {
        let app = test_app();
        let (_, match_id) = saved_match(&app).await;

        let (status, json) = send(
            &app.router,
            empty_request("GET", &format!("/api/history/match/{}", match_id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let stored = json["stored_filename"].as_str().unwrap().to_string();

        let response = app
            .router
            .clone()
            .oneshot(empty_request("GET", &format!("/uploads/{}", stored)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), IMAGE_BYTES);
    }

    #[tokio::test]
    async fn test_delete_match() {
        let app = test_app();
        let (_, match_id) = saved_match(&app).await;
        let uri = format!("/api/history/match/{}", match_id);

        let (status, json) = send(&app.router, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Match deleted successfully");

        let (status, _) = send(&app.router, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app.router, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
