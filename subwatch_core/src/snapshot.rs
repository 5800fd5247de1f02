//! Durable persistence of the last-known subscription set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::MonitorError;
use crate::subscription::{Subscription, SubscriptionSet};

/// Reads and writes the subscription snapshot file.
///
/// The on-disk format is a JSON array of `{channelId, title}` records,
/// ordered case-insensitively by title so diffs of the file stay readable.
/// Saves write to a sibling temp file and rename it into place, so a
/// concurrent reader (the status endpoint) never observes a torn write.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the last persisted snapshot.
    ///
    /// Returns `None` when no snapshot exists yet, and also when the file is
    /// present but unreadable or unparseable — a corrupt snapshot degrades
    /// to "no previous state" with a warning rather than an error.
    pub fn load(&self) -> Option<SubscriptionSet> {
        match self.read() {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(
                    "Ignoring snapshot at {}, starting without previous state: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Reads the snapshot, reporting corruption instead of swallowing it.
    ///
    /// `Ok(None)` means no snapshot has been written yet.
    pub fn read(&self) -> Result<Option<SubscriptionSet>, MonitorError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MonitorError::SnapshotCorrupt(e.to_string())),
        };

        let records: Vec<Subscription> = serde_json::from_str(&contents)
            .map_err(|e| MonitorError::SnapshotCorrupt(e.to_string()))?;
        Ok(Some(SubscriptionSet::from_list(records)))
    }

    /// Persists the set, replacing any prior snapshot.
    ///
    /// The write goes to `<path>.tmp` first and is renamed over the target,
    /// so readers see either the old snapshot or the new one, never a
    /// partial file.
    pub fn save(&self, set: &SubscriptionSet) -> Result<()> {
        let records = set.sorted_by_title();
        let json =
            serde_json::to_string_pretty(&records).context("Failed to serialize snapshot")?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write temp snapshot '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("Failed to move snapshot into place at '{}'", self.path.display())
        })?;

        tracing::debug!(
            "Saved {} subscriptions to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
