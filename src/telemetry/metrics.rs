//! Metric instrument factories.
//!
//! Instruments come from the `"atelier"` meter on the globally registered
//! `MeterProvider`; without OTLP export they are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("atelier")
}

/// Counter: order stage transitions.
/// Labels: `from`, `to`.
pub fn order_transitions() -> Counter<u64> {
    meter()
        .u64_counter("atelier.order.transitions")
        .with_description("Number of order stage transitions")
        .build()
}

/// Counter: task assignments.
/// Labels: `stage`, `result` ("assigned" | "idle" | "error").
pub fn task_assignments() -> Counter<u64> {
    meter()
        .u64_counter("atelier.task.assignments")
        .with_description("Number of worker-to-task assignment attempts")
        .build()
}

/// Counter: tasks completed by workers.
/// Labels: `stage`, `stage_clear`.
pub fn task_completions() -> Counter<u64> {
    meter()
        .u64_counter("atelier.task.completions")
        .with_description("Number of tasks completed by workers")
        .build()
}

/// Counter: commits rejected because the snapshot version moved.
/// Labels: `operation`.
pub fn store_conflicts() -> Counter<u64> {
    meter()
        .u64_counter("atelier.store.conflicts")
        .with_description("Number of snapshot version conflicts")
        .build()
}

/// Histogram: floor operation duration in milliseconds.
/// Labels: `operation`.
pub fn operation_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("atelier.operation.duration_ms")
        .with_description("Floor operation duration in milliseconds")
        .with_unit("ms")
        .build()
}
