//! Request and response bodies for the SubWatch REST API.

use serde::{Deserialize, Serialize};

use subwatch_core::Subscription;

/// Response for `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Whether a webhook sink URL is configured.
    pub webhook_configured: bool,
    /// Whether a stored OAuth2 authorization exists.
    pub authenticated: bool,
}

/// Response for `GET /subscriptions`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionsResponse {
    pub count: usize,
    /// Ordered case-insensitively by title, like the snapshot file.
    pub subscriptions: Vec<Subscription>,
}

/// Response for `POST /test-webhook`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TestWebhookResponse {
    pub status: String,
    pub webhook_response_status: u16,
}

/// Response for `GET /oauth2callback`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizedResponse {
    pub status: String,
}

/// Query parameters Google appends to the `/oauth2callback` redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Set instead of `code` when the user denies consent.
    pub error: Option<String>,
}
