//! End-to-end tests for `POST /api/generate` against a mocked upstream.

use serde_json::{json, Value};
use stillwater_core::storage::GuidanceConfig;
use stillwater_core::GuidanceClient;
use stillwater_server::{router, AppState};

async fn spawn(client: GuidanceClient) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::new(client))).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_for(upstream: &mockito::ServerGuard) -> GuidanceClient {
    GuidanceClient::new(GuidanceConfig {
        api_base: upstream.url(),
        ..GuidanceConfig::default()
    })
    .with_api_key("sk-test")
}

async fn post(base: &str, body: &str) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn returns_generated_content() {
    let mut upstream = mockito::Server::new_async().await;
    let mock = upstream
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::Regex("topic=sleep".into()))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Rest here."}}]}"#)
        .create_async()
        .await;

    let base = spawn(client_for(&upstream)).await;
    let (status, body) = post(&base, r#"{"mood":"okay","topic":"sleep"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "content": "Rest here." }));
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let upstream = mockito::Server::new_async().await;
    let base = spawn(client_for(&upstream)).await;
    let (status, body) = post(&base, "{oops").await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Bad request" }));
}

#[tokio::test]
async fn upstream_failure_is_server_error() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let base = spawn(client_for(&upstream)).await;
    let (status, body) = post(&base, "{}").await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "overloaded" }));
}

#[tokio::test]
async fn missing_key_is_reported() {
    let client = GuidanceClient::new(GuidanceConfig {
        api_key_env: "STILLWATER_SERVER_TEST_NO_KEY".into(),
        ..GuidanceConfig::default()
    });
    let base = spawn(client).await;
    let (status, body) = post(&base, "{}").await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Missing STILLWATER_SERVER_TEST_NO_KEY" }));
}

#[tokio::test]
async fn missing_key_wins_over_malformed_body() {
    let client = GuidanceClient::new(GuidanceConfig {
        api_key_env: "STILLWATER_SERVER_TEST_NO_KEY_2".into(),
        ..GuidanceConfig::default()
    });
    let base = spawn(client).await;
    let (status, body) = post(&base, "{oops").await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Missing STILLWATER_SERVER_TEST_NO_KEY_2" }));
}

#[tokio::test]
async fn health_check() {
    let upstream = mockito::Server::new_async().await;
    let base = spawn(client_for(&upstream)).await;
    let text = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "ok");
}
