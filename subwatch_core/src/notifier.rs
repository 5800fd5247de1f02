//! Delta formatting and webhook delivery.

use serde::Serialize;

use crate::error::MonitorError;
use crate::subscription::Delta;

/// JSON body accepted by the webhook sink (Discord-compatible).
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Delivers change notifications to an external sink.
#[allow(async_fn_in_trait)]
pub trait Notifier: Send + Sync {
    /// Delivers a single notification for `delta`. At-most-once: a failure
    /// is reported to the caller but never retried here.
    async fn notify(&self, delta: &Delta) -> Result<(), MonitorError>;
}

/// Builds the notification text for a delta.
///
/// One `Added: [titles...]` line when any channel was added, one
/// `Removed: [titles...]` line when any was removed, joined and trimmed.
pub fn format_delta(delta: &Delta) -> String {
    let mut lines = Vec::new();
    if !delta.added.is_empty() {
        let titles: Vec<&str> = delta.added.iter().map(|s| s.title.as_str()).collect();
        lines.push(format!("Added: [{}]", titles.join(", ")));
    }
    if !delta.removed.is_empty() {
        let titles: Vec<&str> = delta.removed.iter().map(|s| s.title.as_str()).collect();
        lines.push(format!("Removed: [{}]", titles.join(", ")));
    }
    lines.join("\n")
}

/// Webhook implementation of [`Notifier`].
///
/// When no sink URL is configured, notifications are logged and dropped —
/// an unconfigured sink is not an error.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    /// The `client` should carry the configured delivery timeout; a hung
    /// sink must not stall the poll loop.
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Posts a raw text message to the sink.
    ///
    /// Used by [`Notifier::notify`] and by the server's test endpoint.
    /// Returns the sink's HTTP status on success.
    pub async fn send_text(&self, content: &str) -> Result<u16, MonitorError> {
        let Some(url) = &self.url else {
            return Err(MonitorError::NotifyFailed(
                "no webhook URL configured".into(),
            ));
        };

        let resp = self
            .client
            .post(url)
            .json(&WebhookMessage { content })
            .send()
            .await
            .map_err(|e| MonitorError::NotifyFailed(format!("webhook unreachable: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MonitorError::NotifyFailed(format!(
                "webhook rejected notification: HTTP {}",
                status
            )));
        }
        Ok(status.as_u16())
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, delta: &Delta) -> Result<(), MonitorError> {
        if self.url.is_none() {
            tracing::info!(
                added = delta.added.len(),
                removed = delta.removed.len(),
                "No webhook URL configured, dropping change notification"
            );
            return Ok(());
        }

        let content = format_delta(delta);
        self.send_text(&content).await?;
        tracing::info!(
            added = delta.added.len(),
            removed = delta.removed.len(),
            "Delivered change notification"
        );
        Ok(())
    }
}
