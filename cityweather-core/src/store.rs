use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::model::Snapshot;

/// A snapshot together with the time it was published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Published {
    pub snapshot: Snapshot,
    /// `None` until the first refresh has completed.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Holds the current snapshot. Publishing swaps the whole `Arc`, so readers
/// see either the previous or the new snapshot, never a mix.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Published>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.publish_at(snapshot, Utc::now());
    }

    pub fn publish_at(&self, snapshot: Snapshot, fetched_at: DateTime<Utc>) {
        let next = Arc::new(Published { snapshot, fetched_at: Some(fetched_at) });
        *self.current.write() = next;
    }

    /// Current snapshot. The lock is only held long enough to clone the `Arc`.
    pub fn read(&self) -> Arc<Published> {
        self.current.read().clone()
    }
}
