//! Station aggregation: read-only department and stage views for dashboards.

use serde::{Deserialize, Serialize};

use crate::department::DepartmentMap;
use crate::error::Result;
use crate::model::*;
use crate::snapshot::Snapshot;

use super::performance::stage_progress;

/// Which slice of the floor a view covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentFilter {
    All,
    Department(String),
}

impl DepartmentFilter {
    /// The stage this filter narrows to, or `None` for `All`.
    fn stage(&self, departments: &DepartmentMap) -> Result<Option<StageId>> {
        match self {
            DepartmentFilter::All => Ok(None),
            DepartmentFilter::Department(name) => departments.stage_for(name).map(Some),
        }
    }
}

impl std::str::FromStr for DepartmentFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(DepartmentFilter::All)
        } else {
            Ok(DepartmentFilter::Department(s.trim().to_string()))
        }
    }
}

impl std::fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepartmentFilter::All => write!(f, "all"),
            DepartmentFilter::Department(name) => write!(f, "{name}"),
        }
    }
}

/// Where a worker stands right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Active with no task in progress.
    Available,
    /// Has a task in progress.
    Busy,
    /// Inactive with no task in progress.
    Offline,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Available => "available",
            WorkerState::Busy => "busy",
            WorkerState::Offline => "offline",
        };
        write!(f, "{s}")
    }
}

/// Classify a worker. Every worker lands in exactly one state.
pub fn worker_state(snapshot: &Snapshot, worker: &Worker) -> WorkerState {
    if snapshot.current_task(worker.id).is_some() {
        WorkerState::Busy
    } else if worker.is_active {
        WorkerState::Available
    } else {
        WorkerState::Offline
    }
}

/// Summary counts for the station header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSummary {
    pub filter: DepartmentFilter,
    pub total_workers: usize,
    pub available_workers: usize,
    pub busy_workers: usize,
    pub offline_workers: usize,
    /// Tasks in progress.
    pub active_tasks: usize,
    /// Tasks waiting for a worker.
    pub pending_tasks: usize,
    /// Unfinished orders with nobody working on their current stage.
    pub pending_orders: usize,
}

/// Count workers, tasks and orders in the filtered slice.
///
/// Under a department filter, workers are those whose department maps to
/// the same stage, and tasks and orders are those at that stage.
pub fn summarize(
    snapshot: &Snapshot,
    departments: &DepartmentMap,
    filter: &DepartmentFilter,
) -> Result<StationSummary> {
    let stage = filter.stage(departments)?;

    let mut summary = StationSummary {
        filter: filter.clone(),
        total_workers: 0,
        available_workers: 0,
        busy_workers: 0,
        offline_workers: 0,
        active_tasks: 0,
        pending_tasks: 0,
        pending_orders: 0,
    };

    for worker in workers_in(snapshot, departments, stage) {
        summary.total_workers += 1;
        match worker_state(snapshot, worker) {
            WorkerState::Available => summary.available_workers += 1,
            WorkerState::Busy => summary.busy_workers += 1,
            WorkerState::Offline => summary.offline_workers += 1,
        }
    }

    for task in snapshot.tasks().filter(|t| stage.is_none_or(|s| t.stage == s)) {
        match task.status {
            TaskStatus::InProgress => summary.active_tasks += 1,
            TaskStatus::Pending => summary.pending_tasks += 1,
            TaskStatus::Paused | TaskStatus::Completed => {}
        }
    }

    summary.pending_orders = snapshot
        .orders()
        .filter(|o| stage.is_none_or(|s| o.stage == s))
        .filter(|o| is_waiting(snapshot, o))
        .count();

    Ok(summary)
}

/// One column of the production board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageColumn {
    pub stage: StageId,
    pub progress: u8,
    /// Orders at this stage, highest priority then oldest first.
    pub orders: Vec<OrderId>,
    pub open_tasks: usize,
}

/// Orders grouped by stage, one column per catalog entry.
pub fn stage_board(snapshot: &Snapshot) -> Vec<StageColumn> {
    StageId::CATALOG
        .into_iter()
        .map(|stage| {
            let mut orders: Vec<&Order> =
                snapshot.orders().filter(|o| o.stage == stage).collect();
            orders.sort_by_key(|o| (std::cmp::Reverse(o.priority), o.created_at, o.id));
            let open_tasks = snapshot
                .tasks()
                .filter(|t| t.stage == stage && t.is_open())
                .count();
            StageColumn {
                stage,
                progress: stage_progress(stage),
                orders: orders.into_iter().map(|o| o.id).collect(),
                open_tasks,
            }
        })
        .collect()
}

/// One line of the station display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRow {
    pub worker: WorkerId,
    pub name: String,
    pub department: String,
    pub state: WorkerState,
    pub current_task: Option<TaskId>,
    pub order_title: Option<String>,
    pub stage: Option<StageId>,
}

/// Per-worker rows for the station display, sorted by name.
pub fn station_rows(
    snapshot: &Snapshot,
    departments: &DepartmentMap,
    filter: &DepartmentFilter,
) -> Result<Vec<StationRow>> {
    let stage = filter.stage(departments)?;

    let mut rows: Vec<StationRow> = workers_in(snapshot, departments, stage)
        .map(|worker| {
            let current = snapshot.current_task(worker.id);
            let order_title = current
                .and_then(|t| snapshot.order(t.order_ref).ok())
                .map(|o| o.title.clone());
            StationRow {
                worker: worker.id,
                name: worker.name.clone(),
                department: worker.department.clone(),
                state: worker_state(snapshot, worker),
                current_task: current.map(|t| t.id),
                order_title,
                stage: current.map(|t| t.stage),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.worker.cmp(&b.worker)));
    Ok(rows)
}

fn workers_in<'s>(
    snapshot: &'s Snapshot,
    departments: &'s DepartmentMap,
    stage: Option<StageId>,
) -> impl Iterator<Item = &'s Worker> {
    snapshot.workers().filter(move |w| match stage {
        None => true,
        Some(stage) => departments
            .stage_for(&w.department)
            .is_ok_and(|s| s == stage),
    })
}

/// Not finished, and nothing at its current stage is in progress.
fn is_waiting(snapshot: &Snapshot, order: &Order) -> bool {
    !order.is_completed()
        && !snapshot
            .open_tasks_at(order.id, order.stage)
            .any(|t| t.status == TaskStatus::InProgress)
}
