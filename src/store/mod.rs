//! Persistence collaborators.
//!
//! A store hands out snapshots and accepts changesets keyed on the snapshot
//! version they were computed from. A stale version is rejected with
//! [`Error::Conflict`] so two writers racing on the same task cannot both win.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::future::Future;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::Event;
use crate::snapshot::{Changeset, Snapshot};

/// Events kept by a store unless configured otherwise. Older events are
/// dropped first; sequence numbers keep counting, so readers see the gap.
pub const DEFAULT_EVENT_LIMIT: usize = 10_000;

/// Where snapshots come from and changesets go.
pub trait Store: Send + Sync {
    /// Current snapshot.
    fn load(&self) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Apply `changes` if the stored version still equals `expected_version`.
    /// Returns the new snapshot.
    fn commit(
        &self,
        expected_version: u64,
        changes: Changeset,
    ) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Events with a sequence number greater than `since_seq`.
    fn events_since(&self, since_seq: u64) -> impl Future<Output = Result<Vec<Event>>> + Send;
}

/// Everything a store persists: the snapshot plus its event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    pub snapshot: Snapshot,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl StoreState {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            events: Vec::new(),
        }
    }

    /// Version check, apply, and append events with fresh sequence numbers.
    /// The log is then trimmed to the newest `event_limit` events.
    pub fn commit(
        &mut self,
        expected_version: u64,
        changes: Changeset,
        event_limit: usize,
    ) -> Result<Snapshot> {
        let found = self.snapshot.version;
        if found != expected_version {
            return Err(Error::Conflict {
                expected: expected_version,
                found,
            });
        }

        self.snapshot.apply(&changes);

        let now = Utc::now();
        let mut seq = self.events.last().map_or(0, |e| e.seq);
        for kind in changes.events {
            seq += 1;
            self.events.push(Event {
                seq,
                timestamp: now,
                kind,
            });
        }

        // At least one event stays so numbering continues from it.
        let keep = event_limit.max(1);
        if self.events.len() > keep {
            let dropped = self.events.len() - keep;
            self.events.drain(..dropped);
        }

        Ok(self.snapshot.clone())
    }

    pub fn events_since(&self, since_seq: u64) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.seq > since_seq)
            .cloned()
            .collect()
    }
}
