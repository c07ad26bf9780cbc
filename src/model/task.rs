//! Tasks: one order, one production stage, at most one worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Order, OrderId, StageId, TaskId, WorkerId};
use crate::error::{Error, Result};

/// A unit of work binding an order's stage to a worker.
///
/// `worker_ref` is set only while the task is `InProgress` or `Paused`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub order_ref: OrderId,

    /// The order's stage when this task was opened.
    pub stage: StageId,

    pub status: TaskStatus,

    /// Current holder.
    pub worker_ref: Option<WorkerId>,

    /// Who finished the task. Survives `worker_ref` being cleared on completion.
    #[serde(default)]
    pub completed_by: Option<WorkerId>,

    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Open a pending task at the order's current stage.
    pub fn for_order(order: &Order, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            order_ref: order.id,
            stage: order.stage,
            status: TaskStatus::Pending,
            worker_ref: None,
            completed_by: None,
            created_at,
            assigned_at: None,
            completed_at: None,
        }
    }

    /// Is this task the one `worker` is actively working on?
    pub fn is_current_for(&self, worker: WorkerId) -> bool {
        self.status == TaskStatus::InProgress && self.worker_ref == Some(worker)
    }

    /// Has `worker` ever been assigned this task?
    pub fn was_assigned_to(&self, worker: WorkerId) -> bool {
        self.worker_ref == Some(worker) || self.completed_by == Some(worker)
    }

    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    /// Move to `to` if the lifecycle allows it. Leaves the task untouched
    /// otherwise.
    pub fn move_to(&mut self, to: TaskStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidTaskTransition {
                task: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Checks the holder/status invariant.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            TaskStatus::Pending => self.worker_ref.is_none(),
            TaskStatus::InProgress | TaskStatus::Paused => self.worker_ref.is_some(),
            TaskStatus::Completed => self.worker_ref.is_none(),
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a worker.
    Pending,
    /// Held by a worker who is actively on it.
    InProgress,
    /// Done. Terminal.
    Completed,
    /// Held by a worker who has set it aside.
    Paused,
}

impl TaskStatus {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, to),
            (Pending, InProgress)
                | (Pending, Completed)      // closed by stage advance
                | (InProgress, Completed)
                | (InProgress, Paused)
                | (Paused, InProgress)
                | (Paused, Completed) // closed by stage advance
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Paused => "paused",
        };
        write!(f, "{s}")
    }
}
