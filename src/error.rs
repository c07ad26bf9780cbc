//! Error types for atelier.

use thiserror::Error;

use crate::model::{OrderId, StageId, TaskId, TaskStatus, WorkerId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: StageId, to: StageId },

    #[error("task {task} cannot move from {from} to {to}")]
    InvalidTaskTransition {
        task: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("order {order} rejected at intake: {reason}")]
    InvalidIntake { order: OrderId, reason: String },

    #[error("worker {worker} is busy with task {task}")]
    WorkerBusy { worker: WorkerId, task: TaskId },

    #[error("worker {0} is not active")]
    WorkerInactive(WorkerId),

    #[error("task {0} is not available for assignment")]
    TaskUnavailable(TaskId),

    #[error("worker {0} has no task in progress")]
    NoCurrentTask(WorkerId),

    #[error("department {0:?} has no production stage mapping")]
    UnknownDepartmentMapping(String),

    #[error("order {order} is at stage {stage}, which takes no tasks")]
    StageTakesNoTasks { order: OrderId, stage: StageId },

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("snapshot version conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// True for errors a caller may resolve by reloading the snapshot and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Conflict { .. } | Error::TaskUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
