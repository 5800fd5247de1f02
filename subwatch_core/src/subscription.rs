//! Subscription records, set reconciliation, and change deltas.
//!
//! Identity of a subscription is carried by its channel ID alone; the title
//! is display metadata. A channel whose title changed between two polls is
//! the same subscription, not an add+remove pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single channel subscription as returned by the subscription source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Stable identity key, unique within a set.
    pub channel_id: String,
    /// Display name. Mutable, not identity-bearing.
    pub title: String,
}

impl Subscription {
    pub fn new(channel_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            title: title.into(),
        }
    }
}

/// The complete subscription set from one poll, keyed by channel ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionSet {
    entries: HashMap<String, Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a fetched sequence.
    ///
    /// The source is assumed not to return duplicate channel IDs in one
    /// fetch; if it does, the last occurrence wins.
    pub fn from_list(subs: Vec<Subscription>) -> Self {
        let entries = subs
            .into_iter()
            .map(|s| (s.channel_id.clone(), s))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, channel_id: &str) -> bool {
        self.entries.contains_key(channel_id)
    }

    pub fn get(&self, channel_id: &str) -> Option<&Subscription> {
        self.entries.get(channel_id)
    }

    pub fn insert(&mut self, sub: Subscription) {
        self.entries.insert(sub.channel_id.clone(), sub);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.values()
    }

    /// Records ordered case-insensitively by title, for persistence and the
    /// status surface. Order carries no weight for reconciliation.
    pub fn sorted_by_title(&self) -> Vec<Subscription> {
        let mut records: Vec<Subscription> = self.entries.values().cloned().collect();
        records.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.channel_id.cmp(&b.channel_id))
        });
        records
    }
}

impl FromIterator<Subscription> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = Subscription>>(iter: I) -> Self {
        Self::from_list(iter.into_iter().collect())
    }
}

/// Added/removed subscriptions between two polls. Computed per cycle,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub added: Vec<Subscription>,
    pub removed: Vec<Subscription>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compares two subscription sets by channel-ID membership.
///
/// `added` holds records from `current` whose key is absent from `previous`;
/// `removed` holds records from `previous` whose key is absent from
/// `current`. Output order is unspecified (set-derived).
///
/// A `previous` of `None` — first run, or prior snapshot unreadable — yields
/// an empty delta: there is nothing to compare against, and the caller must
/// persist `current` as the new baseline without notifying.
///
/// A channel present in both sets with a changed title is not reported;
/// only key membership matters.
pub fn reconcile(previous: Option<&SubscriptionSet>, current: &SubscriptionSet) -> Delta {
    let Some(previous) = previous else {
        return Delta::default();
    };

    let added = current
        .iter()
        .filter(|s| !previous.contains(&s.channel_id))
        .cloned()
        .collect();
    let removed = previous
        .iter()
        .filter(|s| !current.contains(&s.channel_id))
        .cloned()
        .collect();

    Delta { added, removed }
}
