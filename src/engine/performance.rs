//! Derived metrics: worker performance and order progress.
//!
//! Nothing here fails. Missing history or attendance data degrades to
//! explicit markers ([`Efficiency::NoHistory`], `None`) instead of numbers.

use crate::attendance::Attendance;
use crate::model::*;
use crate::snapshot::Snapshot;

/// Performance of one worker over the given task history.
pub fn worker_performance<'a, I, A>(
    worker: &Worker,
    tasks: I,
    attendance: &A,
) -> PerformanceSnapshot
where
    I: IntoIterator<Item = &'a Task>,
    A: Attendance + ?Sized,
{
    let mut assigned: u32 = 0;
    let mut completed: u32 = 0;
    for task in tasks {
        if !task.was_assigned_to(worker.id) {
            continue;
        }
        assigned += 1;
        if task.status == TaskStatus::Completed && task.completed_by == Some(worker.id) {
            completed += 1;
        }
    }

    PerformanceSnapshot {
        worker: worker.id,
        efficiency: efficiency(completed, assigned),
        completed_tasks: completed,
        assigned_tasks: assigned,
        avg_hours: attendance.average_hours(worker.id),
        quality_score: attendance.quality_score(worker.id),
    }
}

/// `completed / assigned` as a clamped percentage.
pub fn efficiency(completed: u32, assigned: u32) -> Efficiency {
    if assigned == 0 {
        return Efficiency::NoHistory;
    }
    let percent = (u64::from(completed) * 100 / u64::from(assigned)).min(100);
    Efficiency::Measured(percent as u8)
}

/// Position of the order's stage in the catalog as a rounded percentage.
///
/// A pure function of pipeline position: pending 17, design 33, cutting 50,
/// sewing 67, fitting 83, completed 100.
pub fn order_progress(order: &Order) -> u8 {
    stage_progress(order.stage)
}

pub fn stage_progress(stage: StageId) -> u8 {
    let total = StageId::CATALOG.len();
    let reached = stage.position() + 1;
    ((reached * 100 + total / 2) / total) as u8
}

/// Performance for every worker in the snapshot, in id order.
pub fn performance_for_all<A>(snapshot: &Snapshot, attendance: &A) -> Vec<PerformanceSnapshot>
where
    A: Attendance + ?Sized,
{
    snapshot
        .workers()
        .map(|w| worker_performance(w, snapshot.tasks(), attendance))
        .collect()
}

/// Progress for every order in the snapshot, in id order.
pub fn progress_for_all(snapshot: &Snapshot) -> Vec<(OrderId, u8)> {
    snapshot
        .orders()
        .map(|o| (o.id, order_progress(o)))
        .collect()
}
