//! Integration tests for the SubWatch REST API.
//!
//! Drives the router directly via `tower::ServiceExt` (no TCP listener),
//! with snapshot and token files in a temp directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use subwatch_config::SubwatchConfig;
use subwatch_core::{SnapshotStore, Subscription, SubscriptionSet, TokenStore, WebhookNotifier};
use subwatch_server::handlers;
use subwatch_server::state::AppState;
use subwatch_server::types::{StatusResponse, SubscriptionsResponse};

fn test_state(dir: &tempfile::TempDir, webhook_url: Option<String>, client_id: &str) -> Arc<AppState> {
    let mut config = SubwatchConfig::default();
    config.monitor.snapshot_path = dir
        .path()
        .join("subscriptions.json")
        .to_string_lossy()
        .into_owned();
    config.youtube.token_path = dir.path().join("token.json").to_string_lossy().into_owned();
    config.youtube.client_id = client_id.to_string();
    config.webhook.url = webhook_url.clone();

    let client = reqwest::Client::new();
    let tokens = Arc::new(TokenStore::new(
        &config.youtube.token_path,
        client.clone(),
        config.youtube.client_id.clone(),
        config.youtube.client_secret.clone(),
    ));
    let store = SnapshotStore::new(&config.monitor.snapshot_path);
    let notifier = WebhookNotifier::new(client, webhook_url);

    Arc::new(AppState::new(config, store, notifier, tokens))
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::status_handler))
        .route("/subscriptions", get(handlers::subscriptions_handler))
        .route("/test-webhook", post(handlers::test_webhook_handler))
        .route("/authorize", get(handlers::authorize_handler))
        .route("/oauth2callback", get(handlers::oauth2callback_handler))
        .with_state(state)
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_status_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, ""));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status: StatusResponse = body_json(response).await;
    assert!(status.status.contains("running"));
    assert!(!status.webhook_configured);
    assert!(!status.authenticated);
}

#[tokio::test]
async fn test_subscriptions_empty_before_first_sync() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, ""));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/subscriptions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: SubscriptionsResponse = body_json(response).await;
    assert_eq!(body.count, 0);
    assert!(body.subscriptions.is_empty());
}

#[tokio::test]
async fn test_subscriptions_reflects_snapshot_in_title_order() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir, None, "");

    let set: SubscriptionSet = vec![
        Subscription::new("1", "zebra"),
        Subscription::new("2", "Apple"),
    ]
    .into_iter()
    .collect();
    state.store.save(&set).unwrap();

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/subscriptions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: SubscriptionsResponse = body_json(response).await;
    assert_eq!(body.count, 2);
    assert_eq!(body.subscriptions[0].title, "Apple");
    assert_eq!(body.subscriptions[1].title, "zebra");
}

#[tokio::test]
async fn test_subscriptions_tolerates_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir, None, "");
    std::fs::write(dir.path().join("subscriptions.json"), "not json").unwrap();

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/subscriptions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: SubscriptionsResponse = body_json(response).await;
    assert_eq!(body.count, 0);
}

#[tokio::test]
async fn test_test_webhook_without_sink_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, ""));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/test-webhook")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_authorize_without_client_id_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, ""));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/authorize")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authorize_redirects_to_consent_screen() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, "my-client-id"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/authorize")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/auth"));
    assert!(location.contains("client_id=my-client-id"));
}

#[tokio::test]
async fn test_oauth2callback_without_code_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, "my-client-id"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/oauth2callback")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oauth2callback_denied_consent_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(test_state(&dir, None, "my-client-id"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/oauth2callback?error=access_denied")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("access_denied"));
}
