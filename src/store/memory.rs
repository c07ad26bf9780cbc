//! In-memory store, for tests and embedding.

use tokio::sync::Mutex;

use super::{DEFAULT_EVENT_LIMIT, Store, StoreState};
use crate::error::Result;
use crate::event::Event;
use crate::snapshot::{Changeset, Snapshot};

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    event_limit: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_snapshot(Snapshot::new())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(StoreState::new(snapshot)),
            event_limit: DEFAULT_EVENT_LIMIT,
        }
    }

    /// Keep at most `limit` events.
    pub fn event_limit(mut self, limit: usize) -> Self {
        self.event_limit = limit;
        self
    }
}

impl Store for MemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.state.lock().await.snapshot.clone())
    }

    async fn commit(&self, expected_version: u64, changes: Changeset) -> Result<Snapshot> {
        self.state
            .lock()
            .await
            .commit(expected_version, changes, self.event_limit)
    }

    async fn events_since(&self, since_seq: u64) -> Result<Vec<Event>> {
        Ok(self.state.lock().await.events_since(since_seq))
    }
}
