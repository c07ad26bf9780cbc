//! Integration tests for station summaries, rows and the stage board.

use atelier::department::DepartmentMap;
use atelier::engine::{DepartmentFilter, Engine, WorkerState};
use atelier::error::Error;
use atelier::model::*;
use atelier::snapshot::Snapshot;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn order(title: &str, priority: Priority, stage: StageId, created: i64) -> Order {
    let mut order = Order::new(title, "client-4", priority, at(created));
    order.stage = stage;
    if stage != StageId::Pending {
        order.status = OrderStatus::InProgress;
        order.started_at = Some(at(created));
    }
    order
}

struct Fixture {
    snapshot: Snapshot,
    busy_sewer: Worker,
    idle_sewer: Worker,
    resting_sewer: Worker,
    cutter: Worker,
    coat: Order,
    shirt: Order,
}

/// Two orders at sewing (one being worked), one at cutting, one pending,
/// one completed. Three sewers and one cutter.
fn floor() -> Fixture {

    let coat = order("Coat", Priority::Low, StageId::Sewing, 0);
    let shirt = order("Shirt", Priority::High, StageId::Sewing, 5);
    let skirt = order("Skirt", Priority::Medium, StageId::Cutting, 1);
    let draft = order("Draft", Priority::Medium, StageId::Pending, 2);
    let shipped = order("Shipped", Priority::Medium, StageId::Completed, 3);

    let busy_sewer = Worker::new("Ada", "sewing");
    let idle_sewer = Worker::new("Ben", "sewing");
    let resting_sewer = Worker::new("Cy", "sewing").inactive();
    let cutter = Worker::new("Di", "cutting");

    let mut coat_work = Task::for_order(&coat, at(10));
    coat_work.status = TaskStatus::InProgress;
    coat_work.worker_ref = Some(busy_sewer.id);
    let shirt_work = Task::for_order(&shirt, at(11));
    let skirt_work = Task::for_order(&skirt, at(12));

    let snapshot = Snapshot::new()
        .with_order(coat.clone())
        .with_order(shirt.clone())
        .with_order(skirt)
        .with_order(draft)
        .with_order(shipped)
        .with_task(coat_work)
        .with_task(shirt_work)
        .with_task(skirt_work)
        .with_worker(busy_sewer.clone())
        .with_worker(idle_sewer.clone())
        .with_worker(resting_sewer.clone())
        .with_worker(cutter.clone());

    Fixture {
        snapshot,
        busy_sewer,
        idle_sewer,
        resting_sewer,
        cutter,
        coat,
        shirt,
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[test]
fn summary_partitions_every_worker() {
    let floor = floor();
    let summary = Engine::default()
        .summarize(&floor.snapshot, &DepartmentFilter::All)
        .unwrap();

    assert_eq!(summary.total_workers, 4);
    assert_eq!(summary.busy_workers, 1);
    assert_eq!(summary.available_workers, 2);
    assert_eq!(summary.offline_workers, 1);
    assert_eq!(
        summary.available_workers + summary.busy_workers + summary.offline_workers,
        summary.total_workers
    );

    assert_eq!(summary.active_tasks, 1);
    assert_eq!(summary.pending_tasks, 2);
    // shirt, skirt and draft wait; coat is being worked; shipped is done.
    assert_eq!(summary.pending_orders, 3);
}

#[test]
fn department_filter_narrows_to_its_stage() {
    let floor = floor();
    let filter: DepartmentFilter = "Sewing".parse().unwrap();
    let summary = Engine::default().summarize(&floor.snapshot, &filter).unwrap();

    assert_eq!(summary.total_workers, 3);
    assert_eq!(summary.busy_workers, 1);
    assert_eq!(summary.available_workers, 1);
    assert_eq!(summary.offline_workers, 1);
    assert_eq!(summary.active_tasks, 1);
    assert_eq!(summary.pending_tasks, 1);
    assert_eq!(summary.pending_orders, 1);
}

#[test]
fn filter_goes_through_the_department_map() {
    let floor = floor();
    let engine = Engine::new(
        DepartmentMap::standard()
            .with("Stitching", StageId::Sewing)
            .unwrap(),
    );

    let filter: DepartmentFilter = "stitching".parse().unwrap();
    let summary = engine.summarize(&floor.snapshot, &filter).unwrap();
    // Workers filed under "sewing" share the stage with "stitching".
    assert_eq!(summary.total_workers, 3);

    let unknown: DepartmentFilter = "millinery".parse().unwrap();
    let result = engine.summarize(&floor.snapshot, &unknown);
    assert!(matches!(result, Err(Error::UnknownDepartmentMapping(_))));
}

#[test]
fn all_filter_parses_case_insensitively() {
    assert_eq!("ALL".parse::<DepartmentFilter>().unwrap(), DepartmentFilter::All);
    assert_eq!(
        "cutting".parse::<DepartmentFilter>().unwrap(),
        DepartmentFilter::Department("cutting".to_string())
    );
    assert_eq!(DepartmentFilter::All.to_string(), "all");
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[test]
fn station_rows_show_state_and_current_work() {
    let floor = floor();
    let rows = Engine::default()
        .station_rows(&floor.snapshot, &DepartmentFilter::All)
        .unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Ada", "Ben", "Cy", "Di"]);

    let ada = &rows[0];
    assert_eq!(ada.worker, floor.busy_sewer.id);
    assert_eq!(ada.state, WorkerState::Busy);
    assert_eq!(ada.order_title.as_deref(), Some("Coat"));
    assert_eq!(ada.stage, Some(StageId::Sewing));
    assert!(ada.current_task.is_some());

    assert_eq!(rows[1].worker, floor.idle_sewer.id);
    assert_eq!(rows[1].state, WorkerState::Available);
    assert!(rows[1].current_task.is_none());

    assert_eq!(rows[2].worker, floor.resting_sewer.id);
    assert_eq!(rows[2].state, WorkerState::Offline);

    assert_eq!(rows[3].worker, floor.cutter.id);
}

#[test]
fn station_rows_respect_the_filter() {
    let floor = floor();
    let filter = DepartmentFilter::Department("cutting".to_string());
    let rows = Engine::default().station_rows(&floor.snapshot, &filter).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].worker, floor.cutter.id);
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[test]
fn stage_board_has_a_column_per_stage() {
    let floor = floor();
    let board = Engine::default().stage_board(&floor.snapshot);

    let stages: Vec<StageId> = board.iter().map(|c| c.stage).collect();
    assert_eq!(stages, StageId::CATALOG.to_vec());

    let sewing = board.iter().find(|c| c.stage == StageId::Sewing).unwrap();
    assert_eq!(sewing.progress, 67);
    assert_eq!(sewing.open_tasks, 2);
    // High priority first, even though the coat is older.
    assert_eq!(sewing.orders, vec![floor.shirt.id, floor.coat.id]);

    let total: usize = board.iter().map(|c| c.orders.len()).sum();
    assert_eq!(total, floor.snapshot.orders().count());
}
