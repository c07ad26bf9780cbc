//! Floor service: the read-modify-write loop around the engine.
//!
//! Each mutation loads a snapshot, asks the engine for a changeset, and
//! commits it against the version it read. On a version conflict the whole
//! cycle is recomputed from a fresh snapshot, up to the configured number
//! of attempts.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use opentelemetry::KeyValue;
use tracing::{Instrument, Span, info, warn};

use crate::attendance::{Attendance, NoAttendance};
use crate::config::DEFAULT_ASSIGN_RETRIES;
use crate::engine::{DepartmentFilter, Engine, StageColumn, StationRow, StationSummary};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::model::*;
use crate::snapshot::{Changeset, Snapshot};
use crate::store::Store;
use crate::telemetry::metrics;
use crate::telemetry::production::{
    record_attempt, record_committed_version, record_stage_transition, start_operation_span,
};

/// Tunables for the floor service.
#[derive(Debug, Clone)]
pub struct FloorConfig {
    /// Total commit attempts per operation.
    pub assign_retries: u32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            assign_retries: DEFAULT_ASSIGN_RETRIES,
        }
    }
}

/// Result of asking for a worker's next task.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignOutcome {
    Assigned(Task),
    /// No eligible task: nothing to do, not a failure.
    Idle,
}

/// What `complete` did, and whether the order can move on.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub task: Task,
    pub order: OrderId,
    /// The order has no open task left at the task's stage. Advancing it is
    /// a separate, explicit call.
    pub stage_clear: bool,
}

/// The production floor: engine + store + attendance feed.
pub struct Floor<S, A = NoAttendance> {
    store: Arc<S>,
    engine: Arc<Engine>,
    attendance: Arc<A>,
    config: FloorConfig,
}

impl<S, A> Clone for Floor<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: Arc::clone(&self.engine),
            attendance: Arc::clone(&self.attendance),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> Floor<S, NoAttendance> {
    pub fn new(store: S, engine: Engine) -> Self {
        Self::with_attendance(store, engine, NoAttendance)
    }
}

impl<S: Store, A: Attendance> Floor<S, A> {
    pub fn with_attendance(store: S, engine: Engine, attendance: A) -> Self {
        Self {
            store: Arc::new(store),
            engine: Arc::new(engine),
            attendance: Arc::new(attendance),
            config: FloorConfig::default(),
        }
    }

    pub fn config(mut self, config: FloorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Intake
    // -----------------------------------------------------------------------

    /// Accept a new order from order intake. It must be untouched (at
    /// `pending`, never started) and its id must not be on the floor yet.
    pub async fn add_order(&self, order: Order) -> Result<Order> {
        check_intake(&order)?;
        let id = order.id;
        let (next, ()) = self
            .mutate("add_order", id.to_string(), |snap| {
                if snap.order(id).is_ok() {
                    return Err(Error::AlreadyExists {
                        kind: "order",
                        id: id.to_string(),
                    });
                }
                Ok((Changeset::new().order(order.clone()), ()))
            })
            .await?;
        Ok(next.order(id)?.clone())
    }

    /// Insert or update a roster entry.
    pub async fn upsert_worker(&self, worker: Worker) -> Result<Worker> {
        let id = worker.id;
        let (next, ()) = self
            .mutate("upsert_worker", id.to_string(), |_| {
                Ok((Changeset::new().worker(worker.clone()), ()))
            })
            .await?;
        Ok(next.worker(id)?.clone())
    }

    // -----------------------------------------------------------------------
    // Stage transitions
    // -----------------------------------------------------------------------

    pub async fn start_order(&self, order: OrderId) -> Result<Order> {
        let (next, ()) = self
            .mutate("start_order", order.to_string(), |snap| {
                Ok((self.engine.start(snap, order, Utc::now())?, ()))
            })
            .await?;
        let started = next.order(order)?.clone();
        count_transition(StageId::Pending, started.stage);
        Ok(started)
    }

    pub async fn advance_order(&self, order: OrderId) -> Result<Order> {
        let (next, from) = self
            .mutate("advance_order", order.to_string(), |snap| {
                let from = snap.order(order)?.stage;
                Ok((self.engine.advance(snap, order, Utc::now())?, from))
            })
            .await?;
        let advanced = next.order(order)?.clone();
        count_transition(from, advanced.stage);
        Ok(advanced)
    }

    // -----------------------------------------------------------------------
    // Tasks and assignment
    // -----------------------------------------------------------------------

    pub async fn open_task(&self, order: OrderId) -> Result<Task> {
        let (next, task) = self
            .mutate("open_task", order.to_string(), |snap| {
                self.engine.open_task(snap, order, Utc::now())
            })
            .await?;
        Ok(next.task(task)?.clone())
    }

    pub async fn assign(&self, worker: WorkerId, task: TaskId) -> Result<Task> {
        let result = self
            .mutate("assign", worker.to_string(), |snap| {
                Ok((self.engine.assign(snap, worker, task, Utc::now())?, ()))
            })
            .await;
        match result {
            Ok((next, ())) => {
                let task = next.task(task)?.clone();
                count_assignment(Some(task.stage), "assigned");
                Ok(task)
            }
            Err(e) => {
                count_assignment(None, "error");
                Err(e)
            }
        }
    }

    /// Find and assign the worker's next task. Contention on the chosen task
    /// reruns the search against a fresh snapshot.
    pub async fn assign_next(&self, worker: WorkerId) -> Result<AssignOutcome> {
        let (next, task) = self
            .mutate("assign_next", worker.to_string(), |snap| {
                match self.engine.assign_next(snap, worker, Utc::now())? {
                    Some((changes, task)) => Ok((changes, Some(task))),
                    None => Ok((Changeset::new(), None)),
                }
            })
            .await
            .inspect_err(|_| count_assignment(None, "error"))?;

        match task {
            Some(task) => {
                let task = next.task(task)?.clone();
                count_assignment(Some(task.stage), "assigned");
                Ok(AssignOutcome::Assigned(task))
            }
            None => {
                info!(worker = %worker, "nothing to do");
                count_assignment(None, "idle");
                Ok(AssignOutcome::Idle)
            }
        }
    }

    pub async fn complete(&self, worker: WorkerId) -> Result<CompletionReport> {
        let (next, (task, order, stage_clear)) = self
            .mutate("complete", worker.to_string(), |snap| {
                let done = self.engine.complete(snap, worker, Utc::now())?;
                Ok((done.changes, (done.task, done.order, done.stage_clear)))
            })
            .await?;
        let task = next.task(task)?.clone();
        metrics::task_completions().add(
            1,
            &[
                KeyValue::new("stage", task.stage.as_str()),
                KeyValue::new("stage_clear", stage_clear),
            ],
        );
        Ok(CompletionReport {
            task,
            order,
            stage_clear,
        })
    }

    pub async fn pause(&self, worker: WorkerId) -> Result<Task> {
        let (next, task) = self
            .mutate("pause", worker.to_string(), |snap| {
                let task = snap
                    .current_task(worker)
                    .map(|t| t.id)
                    .ok_or(Error::NoCurrentTask(worker))?;
                Ok((self.engine.pause(snap, worker)?, task))
            })
            .await?;
        Ok(next.task(task)?.clone())
    }

    pub async fn resume(&self, worker: WorkerId, task: TaskId) -> Result<Task> {
        let (next, ()) = self
            .mutate("resume", worker.to_string(), |snap| {
                Ok((self.engine.resume(snap, worker, task)?, ()))
            })
            .await?;
        Ok(next.task(task)?.clone())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.store.load().await
    }

    pub async fn summary(&self, filter: &DepartmentFilter) -> Result<StationSummary> {
        let snapshot = self.store.load().await?;
        self.engine.summarize(&snapshot, filter)
    }

    pub async fn station_rows(&self, filter: &DepartmentFilter) -> Result<Vec<StationRow>> {
        let snapshot = self.store.load().await?;
        self.engine.station_rows(&snapshot, filter)
    }

    pub async fn stage_board(&self) -> Result<Vec<StageColumn>> {
        let snapshot = self.store.load().await?;
        Ok(self.engine.stage_board(&snapshot))
    }

    pub async fn performance(&self, worker: WorkerId) -> Result<PerformanceSnapshot> {
        let snapshot = self.store.load().await?;
        self.engine
            .performance(&snapshot, worker, self.attendance.as_ref())
    }

    pub async fn progress(&self, order: OrderId) -> Result<u8> {
        let snapshot = self.store.load().await?;
        self.engine.progress(&snapshot, order)
    }

    pub async fn events_since(&self, since_seq: u64) -> Result<Vec<Event>> {
        self.store.events_since(since_seq).await
    }

    // -----------------------------------------------------------------------
    // Read-modify-write
    // -----------------------------------------------------------------------

    /// Run `compute` against a fresh snapshot and commit what it returns.
    /// An empty changeset is not committed.
    async fn mutate<T, F>(
        &self,
        operation: &'static str,
        subject: String,
        compute: F,
    ) -> Result<(Snapshot, T)>
    where
        F: Fn(&Snapshot) -> Result<(Changeset, T)>,
    {
        let span = start_operation_span(operation, &subject);
        let started = Instant::now();

        let result = self
            .commit_loop(&span, operation, &compute)
            .instrument(span.clone())
            .await;

        metrics::operation_duration_ms().record(
            started.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("operation", operation)],
        );
        result
    }

    async fn commit_loop<T, F>(
        &self,
        span: &Span,
        operation: &'static str,
        compute: &F,
    ) -> Result<(Snapshot, T)>
    where
        F: Fn(&Snapshot) -> Result<(Changeset, T)>,
    {
        let attempts = self.config.assign_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            record_attempt(span, attempt);

            let snapshot = self.store.load().await?;
            let (changes, value) = compute(&snapshot)?;
            if changes.is_empty() {
                return Ok((snapshot, value));
            }

            match self.store.commit(snapshot.version, changes).await {
                Ok(next) => {
                    record_committed_version(span, next.version);
                    return Ok((next, value));
                }
                Err(Error::Conflict { expected, found }) => {
                    metrics::store_conflicts().add(1, &[KeyValue::new("operation", operation)]);
                    if attempt >= attempts {
                        warn!(operation, attempt, expected, found, "version conflict, giving up");
                        return Err(Error::Conflict { expected, found });
                    }
                    warn!(operation, attempt, expected, found, "version conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn check_intake(order: &Order) -> Result<()> {
    if order.stage != StageId::Pending {
        return Err(Error::InvalidTransition {
            from: order.stage,
            to: StageId::Pending,
        });
    }
    let reason = if order.status != OrderStatus::Pending {
        format!("status is {}", order.status)
    } else if order.started_at.is_some() {
        "started_at is already set".to_string()
    } else if order.completed_at.is_some() {
        "completed_at is already set".to_string()
    } else {
        return Ok(());
    };
    Err(Error::InvalidIntake {
        order: order.id,
        reason,
    })
}

fn count_transition(from: StageId, to: StageId) {
    record_stage_transition(&Span::current(), from.as_str(), to.as_str());
    metrics::order_transitions().add(
        1,
        &[
            KeyValue::new("from", from.as_str()),
            KeyValue::new("to", to.as_str()),
        ],
    );
}

fn count_assignment(stage: Option<StageId>, result: &'static str) {
    metrics::task_assignments().add(
        1,
        &[
            KeyValue::new("stage", stage.map_or("none", StageId::as_str)),
            KeyValue::new("result", result),
        ],
    );
}
