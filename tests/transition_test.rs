//! Integration tests for stage transitions.

use atelier::engine::transition::{advance, advance_order, start, start_order};
use atelier::error::Error;
use atelier::event::EventKind;
use atelier::model::*;
use atelier::snapshot::Snapshot;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn pending_order() -> Order {
    Order::new("Wool overcoat", "client-17", Priority::Medium, at(0)).estimated_hours(10.0)
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

#[test]
fn start_moves_pending_order_to_design() {
    let order = pending_order();
    let started = start(&order, at(5)).unwrap();

    assert_eq!(started.stage, StageId::Design);
    assert_eq!(started.started_at, Some(at(5)));
    assert_eq!(started.status, OrderStatus::InProgress);
    assert!(started.completed_at.is_none());
}

#[test]
fn start_rejects_order_past_pending() {
    let order = start(&pending_order(), at(5)).unwrap();

    match start(&order, at(6)) {
        Err(Error::InvalidTransition { from, to }) => {
            assert_eq!(from, StageId::Design);
            assert_eq!(to, StageId::Design);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// advance
// ---------------------------------------------------------------------------

#[test]
fn advance_visits_every_stage_in_catalog_order() {
    let mut order = pending_order();
    let mut visited = vec![order.stage];

    for minute in 1..=5 {
        order = advance(&order, at(minute)).unwrap();
        visited.push(order.stage);
    }

    assert_eq!(visited, StageId::CATALOG.to_vec());
    for pair in visited.windows(2) {
        assert!(pair[1] > pair[0], "{} should follow {}", pair[1], pair[0]);
    }
}

#[test]
fn advance_from_pending_stamps_started_at_once() {
    let order = advance(&pending_order(), at(1)).unwrap();
    let order = advance(&order, at(2)).unwrap();

    assert_eq!(order.stage, StageId::Cutting);
    assert_eq!(order.started_at, Some(at(1)));
}

#[test]
fn reaching_completed_stamps_completed_at_and_status() {
    let mut order = pending_order();
    for minute in 1..=4 {
        order = advance(&order, at(minute)).unwrap();
        assert!(order.completed_at.is_none());
    }
    assert_eq!(order.stage, StageId::Fitting);

    let done = advance(&order, at(60)).unwrap();
    assert_eq!(done.stage, StageId::Completed);
    assert_eq!(done.completed_at, Some(at(60)));
    assert_eq!(done.status, OrderStatus::Completed);
}

#[test]
fn advance_on_completed_order_is_invalid_and_does_not_mutate() {
    let mut order = pending_order();
    for minute in 1..=5 {
        order = advance(&order, at(minute)).unwrap();
    }
    let before = order.clone();

    for _ in 0..3 {
        let result = advance(&order, at(99));
        assert!(matches!(
            result,
            Err(Error::InvalidTransition {
                from: StageId::Completed,
                to: StageId::Completed
            })
        ));
    }
    assert_eq!(order, before);
}

// ---------------------------------------------------------------------------
// Snapshot-level transitions
// ---------------------------------------------------------------------------

#[test]
fn advance_order_closes_tasks_left_at_previous_stage() {
    let order = start(&pending_order(), at(1)).unwrap();
    let worker = Worker::new("Amira", "design");

    let open = Task::for_order(&order, at(2));
    let mut held = Task::for_order(&order, at(3));
    held.status = TaskStatus::Paused;
    held.worker_ref = Some(worker.id);

    let snapshot = Snapshot::new()
        .with_order(order.clone())
        .with_task(open.clone())
        .with_task(held.clone())
        .with_worker(worker.clone());

    let changes = advance_order(&snapshot, order.id, at(10)).unwrap();
    let next = snapshot.applied(&changes);

    assert_eq!(next.order(order.id).unwrap().stage, StageId::Cutting);

    let open = next.task(open.id).unwrap();
    assert_eq!(open.status, TaskStatus::Completed);
    assert_eq!(open.completed_by, None);

    let held = next.task(held.id).unwrap();
    assert_eq!(held.status, TaskStatus::Completed);
    assert_eq!(held.worker_ref, None);
    assert_eq!(held.completed_by, Some(worker.id));
    assert!(next.tasks().all(Task::is_consistent));

    match changes.events.last() {
        Some(EventKind::OrderAdvanced {
            from,
            to,
            closed_tasks,
            ..
        }) => {
            assert_eq!(*from, StageId::Design);
            assert_eq!(*to, StageId::Cutting);
            assert_eq!(closed_tasks.len(), 2);
        }
        other => panic!("expected OrderAdvanced, got {other:?}"),
    }
}

#[test]
fn start_order_emits_started_event() {
    let order = pending_order();
    let snapshot = Snapshot::new().with_order(order.clone());

    let changes = start_order(&snapshot, order.id, at(1)).unwrap();

    assert!(
        changes
            .events
            .iter()
            .any(|e| matches!(e, EventKind::OrderStarted { order: id } if *id == order.id))
    );
}

#[test]
fn advance_order_on_unknown_order_is_not_found() {
    let result = advance_order(&Snapshot::new(), OrderId::new(), at(0));
    assert!(matches!(result, Err(Error::NotFound { kind: "order", .. })));
}

#[test]
fn stage_catalog_next_and_parse() {
    assert_eq!(StageId::Pending.next(), Some(StageId::Design));
    assert_eq!(StageId::Fitting.next(), Some(StageId::Completed));
    assert_eq!(StageId::Completed.next(), None);

    assert_eq!("sewing".parse::<StageId>(), Ok(StageId::Sewing));
    assert!("ironing".parse::<StageId>().is_err());
    assert!(serde_json::from_str::<StageId>("\"ironing\"").is_err());
}
