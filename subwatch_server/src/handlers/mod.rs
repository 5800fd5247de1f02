//! Axum route handlers for the SubWatch REST API.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;

use subwatch_core::authorize_url;

use crate::error::AppError;
use crate::state::AppState;
use crate::types::*;

/// Fixed message sent by the `/test-webhook` endpoint.
const TEST_MESSAGE: &str = "This is a test notification from the SubWatch subscription monitor.";

/// Liveness/status endpoint.
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "SubWatch subscription monitor is running".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        webhook_configured: state.notifier.is_configured(),
        authenticated: state.tokens.is_authenticated(),
    })
}

/// Returns the last persisted subscription snapshot with its count.
///
/// Reads the snapshot file fresh on every request. The monitor's
/// rename-based save means this never observes a torn write; a missing or
/// corrupt snapshot reads as empty.
pub async fn subscriptions_handler(
    State(state): State<Arc<AppState>>,
) -> Json<SubscriptionsResponse> {
    let set = state.store.load().unwrap_or_default();
    let subscriptions = set.sorted_by_title();
    Json(SubscriptionsResponse {
        count: subscriptions.len(),
        subscriptions,
    })
}

/// Sends a fixed test message to the configured webhook sink.
pub async fn test_webhook_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestWebhookResponse>, AppError> {
    if !state.notifier.is_configured() {
        return Err(AppError::bad_request("No webhook URL configured"));
    }

    let status = state
        .notifier
        .send_text(TEST_MESSAGE)
        .await
        .map_err(|e| AppError::bad_gateway(e.to_string()))?;

    Ok(Json(TestWebhookResponse {
        status: "Test message sent".into(),
        webhook_response_status: status,
    }))
}

/// Redirects the browser to Google's OAuth2 consent screen.
pub async fn authorize_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Redirect, AppError> {
    let youtube = &state.config.youtube;
    if youtube.client_id.is_empty() {
        return Err(AppError::bad_request(
            "youtube.client_id is not configured; set it in subwatch.toml or SUBWATCH_YOUTUBE_CLIENT_ID",
        ));
    }

    let url = authorize_url(&youtube.client_id, &youtube.redirect_uri)
        .map_err(|e| AppError::internal(e.to_string()))?;
    tracing::info!("Redirecting to OAuth2 consent screen");
    Ok(Redirect::temporary(&url))
}

/// Completes the OAuth2 flow: exchanges the authorization code and persists
/// the resulting tokens for the monitor's fetches.
pub async fn oauth2callback_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<AuthorizedResponse>, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::bad_request(format!(
            "Authorization was denied: {}",
            error
        )));
    }
    let code = query
        .code
        .ok_or_else(|| AppError::bad_request("No code provided in OAuth2 callback"))?;

    state
        .tokens
        .exchange_code(&code, &state.config.youtube.redirect_uri)
        .await
        .map_err(|e| AppError::bad_gateway(format!("Token exchange failed: {}", e)))?;

    Ok(Json(AuthorizedResponse {
        status: "Authentication successful, credentials saved".into(),
    }))
}
