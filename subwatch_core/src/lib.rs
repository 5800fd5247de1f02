//! SubWatch Core — subscription change detection and notification.
//!
//! This crate owns the full poll cycle: fetch the authoritative subscription
//! set, reconcile it against the last-known snapshot, notify a webhook sink
//! about additions/removals, and persist the new snapshot.
//!
//! # Modules
//!
//! - [`subscription`]: Domain types and the set-reconciliation algorithm
//! - [`snapshot`]: Durable, atomically-replaced snapshot file
//! - [`auth`]: OAuth2 token storage and refresh
//! - [`source`]: The [`SubscriptionSource`] trait and its YouTube implementation
//! - [`notifier`]: Delta formatting and webhook delivery
//! - [`monitor`]: The fixed-interval poll loop
//! - [`error`]: Failure taxonomy shared by the above

pub mod auth;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod snapshot;
pub mod source;
pub mod subscription;

// Re-export primary types for convenience
pub use auth::{authorize_url, StoredToken, TokenStore};
pub use error::MonitorError;
pub use monitor::{CycleOutcome, Monitor};
pub use notifier::{format_delta, Notifier, WebhookNotifier};
pub use snapshot::SnapshotStore;
pub use source::{SubscriptionSource, YouTubeSource};
pub use subscription::{reconcile, Delta, Subscription, SubscriptionSet};
