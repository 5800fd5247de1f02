//! Failure taxonomy for the monitor and its collaborators.

use thiserror::Error;

/// Errors raised by the collaborators of one poll cycle.
///
/// None of these are fatal to the process. The monitor loop logs the variant
/// with context and continues on the next interval:
///
/// - [`AuthMissing`](MonitorError::AuthMissing) and
///   [`SourceUnavailable`](MonitorError::SourceUnavailable) abort only the
///   current cycle (no persistence, no notification).
/// - [`SnapshotCorrupt`](MonitorError::SnapshotCorrupt) degrades to "no
///   previous state" at startup.
/// - [`NotifyFailed`](MonitorError::NotifyFailed) never blocks persistence.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// No usable OAuth2 credential. Resolved by completing the `/authorize`
    /// flow; until then every fetch attempt fails with this.
    #[error("not authenticated: {0}")]
    AuthMissing(String),

    /// The subscription source could not be fetched: transport failure,
    /// rejected credential, or a malformed page in the paginated response.
    #[error("subscription source unavailable: {0}")]
    SourceUnavailable(anyhow::Error),

    /// The persisted snapshot exists but cannot be parsed. Recoverable by
    /// treating it as absent.
    #[error("snapshot unreadable: {0}")]
    SnapshotCorrupt(String),

    /// The webhook sink was unreachable or rejected the notification.
    /// Delivery is at-most-once; this is logged, never retried.
    #[error("notification delivery failed: {0}")]
    NotifyFailed(String),
}
