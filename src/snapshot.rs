//! Immutable snapshots of the production floor and the changesets that
//! move one snapshot to the next.
//!
//! The engine reads a snapshot and returns a [`Changeset`]; it never mutates
//! shared state. Callers own the read-modify-write cycle and commit the
//! changeset against the snapshot `version` they read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::model::*;

/// Arena of orders, tasks and workers keyed by stable ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotDocument", into = "SnapshotDocument")]
pub struct Snapshot {
    /// Bumped by every committed changeset.
    pub version: u64,
    orders: BTreeMap<OrderId, Order>,
    tasks: BTreeMap<TaskId, Task>,
    workers: BTreeMap<WorkerId, Worker>,
}

/// On-disk layout: plain record lists.
#[derive(Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    version: u64,
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    workers: Vec<Worker>,
}

impl From<SnapshotDocument> for Snapshot {
    fn from(doc: SnapshotDocument) -> Self {
        let mut snapshot = Snapshot::from_records(doc.orders, doc.tasks, doc.workers);
        snapshot.version = doc.version;
        snapshot
    }
}

impl From<Snapshot> for SnapshotDocument {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            version: snapshot.version,
            orders: snapshot.orders.into_values().collect(),
            tasks: snapshot.tasks.into_values().collect(),
            workers: snapshot.workers.into_values().collect(),
        }
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot at version 0 from record lists.
    pub fn from_records(
        orders: impl IntoIterator<Item = Order>,
        tasks: impl IntoIterator<Item = Task>,
        workers: impl IntoIterator<Item = Worker>,
    ) -> Self {
        Self {
            version: 0,
            orders: orders.into_iter().map(|o| (o.id, o)).collect(),
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            workers: workers.into_iter().map(|w| (w.id, w)).collect(),
        }
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.insert(order.id, order);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.insert(task.id, task);
        self
    }

    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.workers.insert(worker.id, worker);
        self
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn order(&self, id: OrderId) -> Result<&Order> {
        self.orders
            .get(&id)
            .ok_or_else(|| Error::not_found("order", id))
    }

    pub fn task(&self, id: TaskId) -> Result<&Task> {
        self.tasks.get(&id).ok_or_else(|| Error::not_found("task", id))
    }

    pub fn worker(&self, id: WorkerId) -> Result<&Worker> {
        self.workers
            .get(&id)
            .ok_or_else(|| Error::not_found("worker", id))
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    /// The in-progress task held by `worker`, derived from the task arena.
    pub fn current_task(&self, worker: WorkerId) -> Option<&Task> {
        self.tasks.values().find(|t| t.is_current_for(worker))
    }

    /// Tasks of `order` still open at `stage`.
    pub fn open_tasks_at(&self, order: OrderId, stage: StageId) -> impl Iterator<Item = &Task> {
        self.tasks
            .values()
            .filter(move |t| t.order_ref == order && t.stage == stage && t.is_open())
    }

    /// Check the task invariants: every holder matches its status, and no
    /// worker has more than one task in progress.
    pub fn validate(&self) -> Result<()> {
        let mut holders: BTreeMap<WorkerId, TaskId> = BTreeMap::new();
        for task in self.tasks.values() {
            if !task.is_consistent() {
                let holder = task
                    .worker_ref
                    .map_or_else(|| "none".to_string(), |w| w.to_string());
                return Err(Error::CorruptSnapshot(format!(
                    "task {} is {} with holder {holder}",
                    task.id, task.status
                )));
            }
            let Some(worker) = task.worker_ref.filter(|_| task.status == TaskStatus::InProgress)
            else {
                continue;
            };
            if let Some(other) = holders.insert(worker, task.id) {
                return Err(Error::CorruptSnapshot(format!(
                    "worker {worker} has tasks {other} and {} in progress",
                    task.id
                )));
            }
        }
        Ok(())
    }

    /// Resolve an id prefix against every record kind. Used by operator tooling.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<RecordRef> {
        let mut matches: Vec<RecordRef> = Vec::new();
        matches.extend(
            self.orders
                .keys()
                .filter(|id| id.0.to_string().starts_with(prefix))
                .map(|id| RecordRef::Order(*id)),
        );
        matches.extend(
            self.tasks
                .keys()
                .filter(|id| id.0.to_string().starts_with(prefix))
                .map(|id| RecordRef::Task(*id)),
        );
        matches.extend(
            self.workers
                .keys()
                .filter(|id| id.0.to_string().starts_with(prefix))
                .map(|id| RecordRef::Worker(*id)),
        );
        match matches.len() {
            0 => Err(Error::not_found("record", prefix)),
            1 => Ok(matches[0]),
            n => Err(Error::Other(format!(
                "{n} records match prefix '{prefix}', be more specific"
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Applying changes
    // -----------------------------------------------------------------------

    /// Upsert every record in `changes` and bump the version.
    pub fn apply(&mut self, changes: &Changeset) {
        for order in &changes.orders {
            self.orders.insert(order.id, order.clone());
        }
        for task in &changes.tasks {
            self.tasks.insert(task.id, task.clone());
        }
        for worker in &changes.workers {
            self.workers.insert(worker.id, worker.clone());
        }
        self.version += 1;
    }

    /// The snapshot that results from applying `changes`.
    pub fn applied(&self, changes: &Changeset) -> Snapshot {
        let mut next = self.clone();
        next.apply(changes);
        next
    }
}

/// A reference to any record in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    Order(OrderId),
    Task(TaskId),
    Worker(WorkerId),
}

/// Records the engine wants written, plus the events describing why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub orders: Vec<Order>,
    pub tasks: Vec<Task>,
    pub workers: Vec<Worker>,
    pub events: Vec<EventKind>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn worker(mut self, worker: Worker) -> Self {
        self.workers.push(worker);
        self
    }

    pub fn event(mut self, event: EventKind) -> Self {
        self.events.push(event);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
            && self.tasks.is_empty()
            && self.workers.is_empty()
            && self.events.is_empty()
    }
}
