//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Instant;

use subwatch_config::SubwatchConfig;
use subwatch_core::{SnapshotStore, TokenStore, WebhookNotifier};

/// Shared application state threaded through Axum handlers.
///
/// Wrapped in `Arc` and shared via Axum's `State` extractor. The snapshot
/// store is read fresh per request — the monitor task owns the writes, and
/// its rename-based saves keep concurrent reads consistent.
pub struct AppState {
    /// Full configuration.
    pub config: SubwatchConfig,
    /// Read-side handle on the persisted subscription snapshot.
    pub store: SnapshotStore,
    /// Webhook sink, shared with the monitor task.
    pub notifier: WebhookNotifier,
    /// OAuth2 token storage, shared with the subscription source.
    pub tokens: Arc<TokenStore>,
    /// Server start time (for the uptime field of the status endpoint).
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: SubwatchConfig,
        store: SnapshotStore,
        notifier: WebhookNotifier,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
            tokens,
            start_time: Instant::now(),
        }
    }
}
