//! End-to-end HTTP tests against a spawned server.

mod common;

use reqwest::multipart::{Form, Part};
use roomlens::constants::STATUS_HEADER;

use common::fixtures::{KITCHEN_PROMPT, png_bytes};
use common::harness::{TestServerConfig, spawn_test_server};

fn upload_form(prompt: &str, user_id: Option<&str>) -> Form {
    let image = Part::bytes(png_bytes([180, 200, 170]))
        .file_name("kitchen.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new().part("image", image).text("prompt", prompt.to_string());
    match user_id {
        Some(id) => form.text("user_id", id.to_string()),
        None => form,
    }
}

#[tokio::test]
async fn test_health_and_ready() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = reqwest::Client::new();

    let health = client.get(server.url("/healthz")).send().await.unwrap();
    assert!(health.status().is_success());
    assert_eq!(health.headers()[STATUS_HEADER], "healthy");

    let ready: serde_json::Value = client
        .get(server.url("/ready"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ready["status"], "ok");
    assert_eq!(ready["components"]["decomposer"], "pattern");
}

#[tokio::test]
async fn test_match_endpoint() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = reqwest::Client::new();

    let resp = client
        .post(server.url("/api/match"))
        .multipart(upload_form(KITCHEN_PROMPT, None))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["similarity"], "46.32");
}

#[tokio::test]
async fn test_login_explain_history_delete_flow() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = reqwest::Client::new();

    let login: serde_json::Value = client
        .post(server.url("/api/auth/login"))
        .json(&serde_json::json!({"login_id": "designer-7"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = login["user"]["id"].as_str().unwrap().to_string();

    let check = client
        .get(server.url("/api/auth/check/designer-7"))
        .send()
        .await
        .unwrap();
    assert_eq!(check.status(), 200);

    let explained: serde_json::Value = client
        .post(server.url("/api/explain"))
        .multipart(upload_form(KITCHEN_PROMPT, Some(&user_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(explained["saved"], true);
    assert_eq!(explained["final_score"], 46.32);
    let match_id = explained["match_id"].as_str().unwrap().to_string();

    let history: serde_json::Value = client
        .get(server.url(&format!("/api/history/{}", user_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let matches = history["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], match_id.as_str());
    assert_eq!(matches[0]["image_filename"], "kitchen.png");

    let stored = matches[0]["stored_filename"].as_str().unwrap().to_string();
    assert!(server.upload_dir.join(&stored).exists());

    let image = client
        .get(server.url(&format!("/uploads/{}", stored)))
        .send()
        .await
        .unwrap();
    assert_eq!(image.status(), 200);

    let deleted = client
        .delete(server.url(&format!("/api/history/match/{}", match_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);
    assert!(!server.upload_dir.join(&stored).exists());

    let history: serde_json::Value = client
        .get(server.url(&format!("/api/history/{}", user_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history["matches"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_second_upload_gets_next_number() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = reqwest::Client::new();

    let login: serde_json::Value = client
        .post(server.url("/api/auth/login"))
        .json(&serde_json::json!({"login_id": "alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = login["user"]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let resp = client
            .post(server.url("/api/explain"))
            .multipart(upload_form(KITCHEN_PROMPT, Some(&user_id)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    assert!(server.upload_dir.join(format!("{}_kitchen_1.png", user_id)).exists());
    assert!(server.upload_dir.join(format!("{}_kitchen_2.png", user_id)).exists());
}

#[tokio::test]
async fn test_errors_carry_status_header() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = reqwest::Client::new();

    let resp = client
        .post(server.url("/api/explain"))
        .multipart(Form::new().text("prompt", KITCHEN_PROMPT))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.headers()[STATUS_HEADER], "invalid_request");

    let resp = client
        .get(server.url("/api/history/match/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()[STATUS_HEADER], "not_found");
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let server = spawn_test_server(TestServerConfig {
        max_upload_bytes: 64,
        ..Default::default()
    })
    .await
    .expect("Server should start");
    let client = reqwest::Client::new();

    let resp = client
        .post(server.url("/api/match"))
        .multipart(upload_form(KITCHEN_PROMPT, None))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 413);
}
