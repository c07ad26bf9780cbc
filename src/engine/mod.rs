//! Production engine: stage transitions, assignment matching, metrics and
//! station views over a [`Snapshot`].
//!
//! Every operation is synchronous and does no I/O. Mutations return a
//! [`Changeset`] for the caller to commit.

pub mod matcher;
pub mod performance;
pub mod station;
pub mod transition;

pub use matcher::Completion;
pub use station::{DepartmentFilter, StageColumn, StationRow, StationSummary, WorkerState};

use chrono::{DateTime, Utc};

use crate::attendance::Attendance;
use crate::department::DepartmentMap;
use crate::error::Result;
use crate::model::*;
use crate::snapshot::{Changeset, Snapshot};

/// The production engine. Holds configuration only; all state lives in the
/// snapshots passed in.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    departments: DepartmentMap,
}

impl Engine {
    pub fn new(departments: DepartmentMap) -> Self {
        Self { departments }
    }

    pub fn departments(&self) -> &DepartmentMap {
        &self.departments
    }

    // -----------------------------------------------------------------------
    // Stage transitions
    // -----------------------------------------------------------------------

    pub fn start(
        &self,
        snapshot: &Snapshot,
        order: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Changeset> {
        transition::start_order(snapshot, order, now)
    }

    pub fn advance(
        &self,
        snapshot: &Snapshot,
        order: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Changeset> {
        transition::advance_order(snapshot, order, now)
    }

    // -----------------------------------------------------------------------
    // Tasks and assignment
    // -----------------------------------------------------------------------

    pub fn open_task(
        &self,
        snapshot: &Snapshot,
        order: OrderId,
        now: DateTime<Utc>,
    ) -> Result<(Changeset, TaskId)> {
        matcher::open_task(snapshot, order, now)
    }

    pub fn find_task_for_worker<'s>(
        &self,
        snapshot: &'s Snapshot,
        worker: WorkerId,
    ) -> Result<Option<&'s Task>> {
        let worker = snapshot.worker(worker)?;
        matcher::find_task_for_worker(&self.departments, snapshot, worker)
    }

    pub fn find_worker_for_task<'s>(
        &self,
        snapshot: &'s Snapshot,
        task: TaskId,
    ) -> Result<Option<&'s Worker>> {
        let task = snapshot.task(task)?;
        Ok(matcher::find_worker_for_task(&self.departments, snapshot, task))
    }

    pub fn assign(
        &self,
        snapshot: &Snapshot,
        worker: WorkerId,
        task: TaskId,
        now: DateTime<Utc>,
    ) -> Result<Changeset> {
        matcher::assign(&self.departments, snapshot, worker, task, now)
    }

    /// Find the worker's next task and assign it in one step.
    /// `Ok(None)` when there is nothing to do.
    pub fn assign_next(
        &self,
        snapshot: &Snapshot,
        worker: WorkerId,
        now: DateTime<Utc>,
    ) -> Result<Option<(Changeset, TaskId)>> {
        let Some(task) = self.find_task_for_worker(snapshot, worker)? else {
            return Ok(None);
        };
        let task = task.id;
        let changes = self.assign(snapshot, worker, task, now)?;
        Ok(Some((changes, task)))
    }

    pub fn complete(
        &self,
        snapshot: &Snapshot,
        worker: WorkerId,
        now: DateTime<Utc>,
    ) -> Result<Completion> {
        matcher::complete(snapshot, worker, now)
    }

    pub fn pause(&self, snapshot: &Snapshot, worker: WorkerId) -> Result<Changeset> {
        matcher::pause(snapshot, worker)
    }

    pub fn resume(&self, snapshot: &Snapshot, worker: WorkerId, task: TaskId) -> Result<Changeset> {
        matcher::resume(snapshot, worker, task)
    }

    // -----------------------------------------------------------------------
    // Metrics
    // -----------------------------------------------------------------------

    pub fn performance<A>(
        &self,
        snapshot: &Snapshot,
        worker: WorkerId,
        attendance: &A,
    ) -> Result<PerformanceSnapshot>
    where
        A: Attendance + ?Sized,
    {
        let worker = snapshot.worker(worker)?;
        Ok(performance::worker_performance(worker, snapshot.tasks(), attendance))
    }

    pub fn progress(&self, snapshot: &Snapshot, order: OrderId) -> Result<u8> {
        Ok(performance::order_progress(snapshot.order(order)?))
    }

    // -----------------------------------------------------------------------
    // Station views
    // -----------------------------------------------------------------------

    pub fn summarize(
        &self,
        snapshot: &Snapshot,
        filter: &DepartmentFilter,
    ) -> Result<StationSummary> {
        station::summarize(snapshot, &self.departments, filter)
    }

    pub fn station_rows(
        &self,
        snapshot: &Snapshot,
        filter: &DepartmentFilter,
    ) -> Result<Vec<StationRow>> {
        station::station_rows(snapshot, &self.departments, filter)
    }

    pub fn stage_board(&self, snapshot: &Snapshot) -> Vec<StageColumn> {
        station::stage_board(snapshot)
    }
}
