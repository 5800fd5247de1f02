//! The fixed-interval poll loop that detects and reports subscription changes.

use std::time::Duration;

use tokio::sync::watch;

use crate::notifier::Notifier;
use crate::snapshot::SnapshotStore;
use crate::source::SubscriptionSource;
use crate::subscription::{reconcile, SubscriptionSet};

/// What a single poll cycle did. The loop logs the outcome and moves on
/// either way; no cycle result ever terminates the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch succeeded: the delta (possibly empty) was computed, the
    /// snapshot was refreshed, and the in-memory baseline advanced.
    Synced {
        added: usize,
        removed: usize,
        total: usize,
    },
    /// Fetch failed: nothing was persisted or notified this cycle.
    FetchFailed,
}

/// Owns the in-memory previous snapshot and drives
/// fetch → reconcile → notify → persist on a fixed interval.
///
/// Single task, cooperatively scheduled: cycles never overlap, and the
/// `previous` field is touched by nobody else for the process lifetime.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    store: SnapshotStore,
    interval: Duration,
    previous: Option<SubscriptionSet>,
}

impl<S: SubscriptionSource, N: Notifier> Monitor<S, N> {
    /// Creates a monitor, loading the prior snapshot exactly once.
    ///
    /// A missing or corrupt snapshot starts the monitor with no previous
    /// state; the first successful fetch then becomes the baseline.
    pub fn new(source: S, notifier: N, store: SnapshotStore, interval: Duration) -> Self {
        let previous = store.load();
        match &previous {
            Some(set) => {
                tracing::info!("Loaded previous snapshot with {} subscriptions", set.len());
            }
            None => {
                tracing::info!(
                    "No previous snapshot; the first successful fetch becomes the baseline"
                );
            }
        }
        Self {
            source,
            notifier,
            store,
            interval,
            previous,
        }
    }

    /// The in-memory baseline (last successfully fetched set).
    pub fn previous(&self) -> Option<&SubscriptionSet> {
        self.previous.as_ref()
    }

    /// Runs one fetch/reconcile/notify/persist cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let fetched = match self.source.fetch_all().await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!("Skipping cycle, fetch failed: {}", e);
                return CycleOutcome::FetchFailed;
            }
        };

        let current = SubscriptionSet::from_list(fetched);
        let delta = reconcile(self.previous.as_ref(), &current);

        if !delta.is_empty() {
            if let Err(e) = self.notifier.notify(&delta).await {
                // Delivery is at-most-once; the snapshot still advances.
                tracing::error!("Notification failed: {}", e);
            }
        }

        // Persist even when the delta is empty, so title-only renames reach
        // the snapshot file despite producing no notification.
        if let Err(e) = self.store.save(&current) {
            tracing::error!("Failed to persist snapshot: {}", e);
        }

        let outcome = CycleOutcome::Synced {
            added: delta.added.len(),
            removed: delta.removed.len(),
            total: current.len(),
        };
        self.previous = Some(current);
        outcome
    }

    /// Polls until `shutdown` flips to true or its sender is dropped.
    ///
    /// Each cycle runs to completion before the next tick. A failed cycle
    /// is retried on the same fixed interval, with no backoff — an explicit
    /// simplicity choice.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        CycleOutcome::Synced { added, removed, total } => {
                            if added > 0 || removed > 0 {
                                tracing::info!(added, removed, total, "Subscription changes detected");
                            } else {
                                tracing::debug!(total, "No subscription changes");
                            }
                        }
                        // The failure was already logged with its cause.
                        CycleOutcome::FetchFailed => {}
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Subscription monitor shutting down");
                        break;
                    }
                }
            }
        }
    }
}
