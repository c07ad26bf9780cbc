//! Assignment matching between idle workers and pending tasks.
//!
//! Eligibility: the task is pending, unheld, and at the stage the worker's
//! department maps to. Among eligible tasks the highest order priority wins,
//! then the oldest order, then the oldest task, then the lowest task id.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::department::DepartmentMap;
use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::model::*;
use crate::snapshot::{Changeset, Snapshot};

/// Outcome of completing a worker's current task.
#[derive(Debug, Clone)]
pub struct Completion {
    pub changes: Changeset,
    pub task: TaskId,
    pub order: OrderId,
    pub stage: StageId,
    /// No other task of the order is open at `stage`; the order may be
    /// advanced. Advancing is left to the caller.
    pub stage_clear: bool,
}

/// Sort key for pending tasks. Smaller sorts first.
type TaskRank<'a> = (
    Reverse<Priority>,
    DateTime<Utc>,
    DateTime<Utc>,
    TaskId,
    &'a Task,
);

/// Find the pending task `worker` should pick up next.
///
/// `Ok(None)` means there is nothing to do. Inactive workers never match.
pub fn find_task_for_worker<'s>(
    departments: &DepartmentMap,
    snapshot: &'s Snapshot,
    worker: &Worker,
) -> Result<Option<&'s Task>> {
    let stage = departments.stage_for(&worker.department)?;
    if !worker.is_active {
        debug!(worker = %worker.id, "inactive worker, no match");
        return Ok(None);
    }

    let best = snapshot
        .tasks()
        .filter(|t| is_eligible(t, stage))
        .filter_map(|t| rank(snapshot, t))
        .min_by_key(|r| (r.0, r.1, r.2, r.3))
        .map(|r| r.4);

    match best {
        Some(task) => debug!(worker = %worker.id, task = %task.id, %stage, "matched task"),
        None => debug!(worker = %worker.id, %stage, "no eligible task"),
    }
    Ok(best)
}

/// Find the idle worker that should pick up `task`.
///
/// Among active, idle workers of a matching department, the one idle the
/// longest (earliest last completion, never-assigned first) wins, then by
/// name and id. Workers whose department is unmapped are skipped.
pub fn find_worker_for_task<'s>(
    departments: &DepartmentMap,
    snapshot: &'s Snapshot,
    task: &Task,
) -> Option<&'s Worker> {
    if task.status != TaskStatus::Pending || task.worker_ref.is_some() {
        return None;
    }

    snapshot
        .workers()
        .filter(|w| w.is_active && snapshot.current_task(w.id).is_none())
        .filter(|w| match departments.stage_for(&w.department) {
            Ok(stage) => stage == task.stage,
            Err(e) => {
                warn!(worker = %w.id, department = %w.department, "{e}");
                false
            }
        })
        .min_by_key(|w| (last_completion(snapshot, w.id), w.name.clone(), w.id))
}

/// Bind `worker` to `task`.
pub fn assign(
    departments: &DepartmentMap,
    snapshot: &Snapshot,
    worker_id: WorkerId,
    task_id: TaskId,
    now: DateTime<Utc>,
) -> Result<Changeset> {
    let worker = snapshot.worker(worker_id)?;
    let task = snapshot.task(task_id)?;
    let stage = departments.stage_for(&worker.department)?;

    if let Some(current) = snapshot.current_task(worker_id) {
        return Err(Error::WorkerBusy {
            worker: worker_id,
            task: current.id,
        });
    }
    if !worker.is_active {
        return Err(Error::WorkerInactive(worker_id));
    }
    if !is_eligible(task, stage) {
        return Err(Error::TaskUnavailable(task_id));
    }

    let mut task = task.clone();
    task.move_to(TaskStatus::InProgress)?;
    task.worker_ref = Some(worker_id);
    task.assigned_at = Some(now);

    info!(worker = %worker_id, task = %task_id, %stage, "task assigned");

    Ok(Changeset::new().task(task).event(EventKind::TaskAssigned {
        task: task_id,
        worker: worker_id,
    }))
}

/// Finish the worker's current task and free the worker.
pub fn complete(
    snapshot: &Snapshot,
    worker_id: WorkerId,
    now: DateTime<Utc>,
) -> Result<Completion> {
    snapshot.worker(worker_id)?;
    let current = snapshot
        .current_task(worker_id)
        .ok_or(Error::NoCurrentTask(worker_id))?;

    let mut task = current.clone();
    task.move_to(TaskStatus::Completed)?;
    task.worker_ref = None;
    task.completed_by = Some(worker_id);
    task.completed_at = Some(now);

    let order = task.order_ref;
    let stage = task.stage;
    let stage_clear = snapshot
        .open_tasks_at(order, stage)
        .all(|t| t.id == task.id);

    info!(
        worker = %worker_id,
        task = %task.id,
        order = %order,
        stage_clear,
        "task completed"
    );

    let mut changes = Changeset::new().event(EventKind::TaskCompleted {
        task: task.id,
        worker: worker_id,
    });
    if stage_clear {
        changes = changes.event(EventKind::StageCleared { order, stage });
    }

    Ok(Completion {
        task: task.id,
        changes: changes.task(task),
        order,
        stage,
        stage_clear,
    })
}

/// Set the worker's current task aside. The worker becomes free; the task
/// stays held by them.
pub fn pause(snapshot: &Snapshot, worker_id: WorkerId) -> Result<Changeset> {
    snapshot.worker(worker_id)?;
    let current = snapshot
        .current_task(worker_id)
        .ok_or(Error::NoCurrentTask(worker_id))?;

    let mut task = current.clone();
    task.move_to(TaskStatus::Paused)?;

    info!(worker = %worker_id, task = %task.id, "task paused");

    Ok(Changeset::new()
        .event(EventKind::TaskPaused {
            task: task.id,
            worker: worker_id,
        })
        .task(task))
}

/// Pick a paused task back up.
pub fn resume(snapshot: &Snapshot, worker_id: WorkerId, task_id: TaskId) -> Result<Changeset> {
    let worker = snapshot.worker(worker_id)?;
    let task = snapshot.task(task_id)?;

    if let Some(current) = snapshot.current_task(worker_id) {
        return Err(Error::WorkerBusy {
            worker: worker_id,
            task: current.id,
        });
    }
    if !worker.is_active {
        return Err(Error::WorkerInactive(worker_id));
    }
    if task.status != TaskStatus::Paused || task.worker_ref != Some(worker_id) {
        return Err(Error::TaskUnavailable(task_id));
    }

    let mut task = task.clone();
    task.move_to(TaskStatus::InProgress)?;

    info!(worker = %worker_id, task = %task_id, "task resumed");

    Ok(Changeset::new().task(task).event(EventKind::TaskResumed {
        task: task_id,
        worker: worker_id,
    }))
}

/// Open a pending task at the order's current stage.
pub fn open_task(
    snapshot: &Snapshot,
    order_id: OrderId,
    now: DateTime<Utc>,
) -> Result<(Changeset, TaskId)> {
    let order = snapshot.order(order_id)?;
    if !order.stage.takes_tasks() {
        return Err(Error::StageTakesNoTasks {
            order: order_id,
            stage: order.stage,
        });
    }

    let task = Task::for_order(order, now);
    let id = task.id;

    info!(order = %order_id, task = %id, stage = %task.stage, "task opened");

    let changes = Changeset::new()
        .event(EventKind::TaskOpened {
            task: id,
            order: order_id,
            stage: task.stage,
        })
        .task(task);
    Ok((changes, id))
}

fn is_eligible(task: &Task, stage: StageId) -> bool {
    task.status == TaskStatus::Pending && task.worker_ref.is_none() && task.stage == stage
}

fn rank<'a>(snapshot: &Snapshot, task: &'a Task) -> Option<TaskRank<'a>> {
    match snapshot.order(task.order_ref) {
        Ok(order) => Some((
            Reverse(order.priority),
            order.created_at,
            task.created_at,
            task.id,
            task,
        )),
        Err(_) => {
            warn!(
                task = %task.id,
                order = %task.order_ref,
                "task refers to missing order, skipped"
            );
            None
        }
    }
}

fn last_completion(snapshot: &Snapshot, worker: WorkerId) -> Option<DateTime<Utc>> {
    snapshot
        .tasks()
        .filter(|t| t.completed_by == Some(worker))
        .filter_map(|t| t.completed_at)
        .max()
}
