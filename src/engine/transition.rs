//! Stage transitions: forward-only movement of orders through the catalog.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::model::*;
use crate::snapshot::{Changeset, Snapshot};

/// Move a `pending` order onto the first work stage.
pub fn start(order: &Order, now: DateTime<Utc>) -> Result<Order> {
    if order.stage != StageId::Pending {
        return Err(Error::InvalidTransition {
            from: order.stage,
            to: StageId::Design,
        });
    }
    advance(order, now)
}

/// Move an order to the next stage in the catalog.
///
/// Leaving `pending` stamps `started_at`; reaching `completed` stamps
/// `completed_at`. A completed order is left untouched and reported as an
/// invalid transition.
pub fn advance(order: &Order, now: DateTime<Utc>) -> Result<Order> {
    let from = order.stage;
    let Some(to) = from.next() else {
        return Err(Error::InvalidTransition { from, to: from });
    };

    let mut next = order.clone();
    next.stage = to;
    if from == StageId::Pending {
        next.started_at = Some(now);
        next.status = OrderStatus::InProgress;
    }
    if to.is_terminal() {
        next.completed_at = Some(now);
        next.status = OrderStatus::Completed;
    }
    Ok(next)
}

/// Snapshot-level `start`: validates the order exists and records the event.
pub fn start_order(snapshot: &Snapshot, id: OrderId, now: DateTime<Utc>) -> Result<Changeset> {
    let order = snapshot.order(id)?;
    let started = start(order, now)?;

    info!(order = %id, stage = %started.stage, "order started");

    Ok(Changeset::new()
        .order(started)
        .event(EventKind::OrderStarted { order: id })
        .event(EventKind::OrderAdvanced {
            order: id,
            from: StageId::Pending,
            to: StageId::Design,
            closed_tasks: Vec::new(),
        }))
}

/// Snapshot-level `advance`: moves the order and closes its tasks left open
/// at the stage it is leaving.
pub fn advance_order(
    snapshot: &Snapshot,
    id: OrderId,
    now: DateTime<Utc>,
) -> Result<Changeset> {
    let order = snapshot.order(id)?;
    let from = order.stage;
    let advanced = advance(order, now)?;
    let to = advanced.stage;

    let mut changes = Changeset::new();
    let mut closed = Vec::new();
    for task in snapshot.open_tasks_at(id, from) {
        let mut task = task.clone();
        task.move_to(TaskStatus::Completed)?;
        task.completed_by = task.worker_ref.take();
        task.completed_at = Some(now);
        closed.push(task.id);
        changes = changes.task(task);
    }

    info!(
        order = %id,
        from = %from,
        to = %to,
        closed_tasks = closed.len(),
        "order advanced"
    );

    let mut changes = changes.order(advanced);
    if from == StageId::Pending {
        changes = changes.event(EventKind::OrderStarted { order: id });
    }
    Ok(changes.event(EventKind::OrderAdvanced {
        order: id,
        from,
        to,
        closed_tasks: closed,
    }))
}
