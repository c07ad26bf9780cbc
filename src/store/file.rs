//! JSON-file store.
//!
//! The whole floor lives in one JSON document. Every commit re-reads the
//! file under a lock, checks the version, and replaces the file through a
//! temp file + rename, so a reader never sees a half-written document.
//! A document that breaks the task invariants is refused on read.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use super::{DEFAULT_EVENT_LIMIT, Store, StoreState};
use crate::error::Result;
use crate::event::Event;
use crate::snapshot::{Changeset, Snapshot};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    event_limit: usize,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file reads as an empty floor.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            event_limit: DEFAULT_EVENT_LIMIT,
        }
    }

    /// Keep at most `limit` events in the document.
    pub fn event_limit(mut self, limit: usize) -> Self {
        self.event_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot` as the store's entire content, dropping any event log.
    pub async fn import(&self, snapshot: Snapshot) -> Result<()> {
        snapshot.validate()?;
        let _guard = self.write_lock.lock().await;
        self.write_state(&StoreState::new(snapshot)).await
    }

    async fn read_state(&self) -> Result<StoreState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let state: StoreState = serde_json::from_str(&content)?;
                state.snapshot.validate()?;
                Ok(state)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_state(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            path = %self.path.display(),
            version = state.snapshot.version,
            "store written"
        );
        Ok(())
    }
}

impl Store for JsonFileStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.read_state().await?.snapshot)
    }

    async fn commit(&self, expected_version: u64, changes: Changeset) -> Result<Snapshot> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.read_state().await?;
        let snapshot = state.commit(expected_version, changes, self.event_limit)?;
        self.write_state(&state).await?;
        Ok(snapshot)
    }

    async fn events_since(&self, since_seq: u64) -> Result<Vec<Event>> {
        Ok(self.read_state().await?.events_since(since_seq))
    }
}
