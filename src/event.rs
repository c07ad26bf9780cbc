//! Structured events emitted by the engine on every mutation.
//!
//! Consumers read the event stream to refresh station displays or build
//! audit trails. Events are ordered by a store-assigned sequence number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{OrderId, StageId, TaskId, WorkerId};

/// A structured event recorded by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number. Consumers can detect gaps.
    pub seq: u64,
    /// When this event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    OrderStarted {
        order: OrderId,
    },
    OrderAdvanced {
        order: OrderId,
        from: StageId,
        to: StageId,
        closed_tasks: Vec<TaskId>,
    },
    TaskOpened {
        task: TaskId,
        order: OrderId,
        stage: StageId,
    },
    TaskAssigned {
        task: TaskId,
        worker: WorkerId,
    },
    TaskPaused {
        task: TaskId,
        worker: WorkerId,
    },
    TaskResumed {
        task: TaskId,
        worker: WorkerId,
    },
    TaskCompleted {
        task: TaskId,
        worker: WorkerId,
    },
    /// The order has no open task left at `stage` and may be advanced.
    StageCleared {
        order: OrderId,
        stage: StageId,
    },
    /// Event type this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl EventKind {
    /// Short name used as a metric label and log field.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::OrderStarted { .. } => "order_started",
            EventKind::OrderAdvanced { .. } => "order_advanced",
            EventKind::TaskOpened { .. } => "task_opened",
            EventKind::TaskAssigned { .. } => "task_assigned",
            EventKind::TaskPaused { .. } => "task_paused",
            EventKind::TaskResumed { .. } => "task_resumed",
            EventKind::TaskCompleted { .. } => "task_completed",
            EventKind::StageCleared { .. } => "stage_cleared",
            EventKind::Unknown => "unknown",
        }
    }
}
