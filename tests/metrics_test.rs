//! Integration tests for worker performance and order progress.

use atelier::attendance::{AttendanceRecord, AttendanceRecords, NoAttendance};
use atelier::engine::performance::{
    efficiency, order_progress, performance_for_all, progress_for_all, stage_progress,
    worker_performance,
};
use atelier::model::*;
use atelier::snapshot::Snapshot;
use chrono::{DateTime, TimeZone, Utc};
use std::io::Write;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
}

fn sewing_order() -> Order {
    let mut order = Order::new("Overalls", "client-9", Priority::Medium, t0());
    order.stage = StageId::Sewing;
    order
}

fn held_by(order: &Order, worker: &Worker, status: TaskStatus) -> Task {
    let mut task = Task::for_order(order, t0());
    task.status = status;
    task.worker_ref = Some(worker.id);
    task
}

fn finished_by(order: &Order, worker: &Worker) -> Task {
    let mut task = Task::for_order(order, t0());
    task.status = TaskStatus::Completed;
    task.completed_by = Some(worker.id);
    task.completed_at = Some(t0());
    task
}

// ---------------------------------------------------------------------------
// Efficiency
// ---------------------------------------------------------------------------

#[test]
fn no_history_is_distinct_from_zero_percent() {
    assert_eq!(efficiency(0, 0), Efficiency::NoHistory);
    assert_eq!(efficiency(0, 4), Efficiency::Measured(0));
    assert_ne!(efficiency(0, 0), efficiency(0, 4));

    assert_eq!(Efficiency::NoHistory.measured(), None);
    assert_eq!(Efficiency::Measured(0).measured(), Some(0));
    assert!(!Efficiency::NoHistory.has_history());
    assert_eq!(Efficiency::NoHistory.to_string(), "no history");
    assert_eq!(Efficiency::Measured(0).to_string(), "0%");
}

#[test]
fn no_history_never_outranks_a_measured_worker() {
    let mut ranked = vec![
        Efficiency::NoHistory,
        Efficiency::Measured(40),
        Efficiency::Measured(90),
    ];
    ranked.sort_by_key(|e| std::cmp::Reverse(e.measured()));

    assert_eq!(
        ranked,
        vec![Efficiency::Measured(90), Efficiency::Measured(40), Efficiency::NoHistory]
    );
}

#[test]
fn efficiency_is_a_clamped_percentage() {
    assert_eq!(efficiency(1, 3), Efficiency::Measured(33));
    assert_eq!(efficiency(3, 4), Efficiency::Measured(75));
    assert_eq!(efficiency(4, 4), Efficiency::Measured(100));
    assert_eq!(efficiency(9, 4), Efficiency::Measured(100));
    assert_eq!(efficiency(u32::MAX, 1), Efficiency::Measured(100));
}

#[test]
fn performance_counts_held_and_finished_tasks() {
    let order = sewing_order();
    let worker = Worker::new("Rae", "sewing");
    let someone_else = Worker::new("Sol", "sewing");

    let tasks = [
        finished_by(&order, &worker),
        finished_by(&order, &worker),
        held_by(&order, &worker, TaskStatus::InProgress),
        held_by(&order, &worker, TaskStatus::Paused),
        finished_by(&order, &someone_else),
        Task::for_order(&order, t0()),
    ];

    let perf = worker_performance(&worker, &tasks, &NoAttendance);

    assert_eq!(perf.worker, worker.id);
    assert_eq!(perf.assigned_tasks, 4);
    assert_eq!(perf.completed_tasks, 2);
    assert_eq!(perf.efficiency, Efficiency::Measured(50));
    assert!(perf.completed_tasks <= perf.assigned_tasks);
}

#[test]
fn new_worker_has_no_history() {
    let worker = Worker::new("Tam", "cutting");
    let perf = worker_performance(&worker, &[], &NoAttendance);

    assert_eq!(perf.efficiency, Efficiency::NoHistory);
    assert_eq!(perf.assigned_tasks, 0);
    assert_eq!(perf.avg_hours, None);
    assert_eq!(perf.quality_score, None);
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[test]
fn attendance_figures_pass_through_when_known() {
    let worker = Worker::new("Uma", "fitting");
    let stranger = Worker::new("Vic", "fitting");
    let records = AttendanceRecords::new().with(
        worker.id,
        AttendanceRecord {
            avg_hours: Some(7.5),
            quality_score: Some(92),
        },
    );

    let perf = worker_performance(&worker, &[], &records);
    assert_eq!(perf.avg_hours, Some(7.5));
    assert_eq!(perf.quality_score, Some(92));

    let unknown = worker_performance(&stranger, &[], &records);
    assert_eq!(unknown.avg_hours, None);
    assert_eq!(unknown.quality_score, None);
}

#[test]
fn attendance_rejects_impossible_values() {
    let worker = Worker::new("Wes", "design");
    let records = AttendanceRecords::new().with(
        worker.id,
        AttendanceRecord {
            avg_hours: Some(-2.0),
            quality_score: Some(250),
        },
    );

    let perf = worker_performance(&worker, &[], &records);
    assert_eq!(perf.avg_hours, None);
    assert_eq!(perf.quality_score, Some(100));
}

#[test]
fn attendance_loads_from_json_export() {
    let worker = Worker::new("Xia", "design");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "{}": {{ "avg_hours": 6.25, "quality_score": 88 }} }}"#,
        worker.id.0
    )
    .unwrap();

    let records = AttendanceRecords::load(file.path()).unwrap();
    let perf = worker_performance(&worker, &[], &records);
    assert_eq!(perf.avg_hours, Some(6.25));
    assert_eq!(perf.quality_score, Some(88));
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[test]
fn progress_follows_catalog_position() {
    let expected = [17, 33, 50, 67, 83, 100];
    for (stage, percent) in StageId::CATALOG.into_iter().zip(expected) {
        assert_eq!(stage_progress(stage), percent, "{stage}");
    }
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    let mut order = Order::new("Parka", "client-3", Priority::High, t0());
    let mut last = order_progress(&order);
    assert!(last > 0);

    while let Some(next) = order.stage.next() {
        order.stage = next;
        let now = order_progress(&order);
        assert!(now > last);
        last = now;
    }
    assert_eq!(last, 100);
}

#[test]
fn snapshot_wide_metrics_cover_every_record() {
    let order = sewing_order();
    let worker = Worker::new("Yan", "sewing");
    let snapshot = Snapshot::new()
        .with_order(order.clone())
        .with_task(finished_by(&order, &worker))
        .with_worker(worker.clone())
        .with_worker(Worker::new("Zoe", "cutting"));

    let perf = performance_for_all(&snapshot, &NoAttendance);
    assert_eq!(perf.len(), 2);
    let yan = perf.iter().find(|p| p.worker == worker.id).unwrap();
    assert_eq!(yan.efficiency, Efficiency::Measured(100));

    assert_eq!(progress_for_all(&snapshot), vec![(order.id, 67)]);
}
