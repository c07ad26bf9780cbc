//! Span helpers for floor operations.

use tracing::Span;

/// Start a span for one floor operation on one record.
///
/// `floor.version` is declared empty and filled in by
/// [`record_committed_version`] once the changeset lands.
pub fn start_operation_span(operation: &str, subject: &str) -> Span {
    tracing::info_span!(
        "floor.operation",
        "floor.operation" = operation,
        "floor.subject" = subject,
        "floor.attempt" = tracing::field::Empty,
        "floor.version" = tracing::field::Empty,
    )
}

pub fn record_attempt(span: &Span, attempt: u32) {
    span.record("floor.attempt", attempt);
}

pub fn record_committed_version(span: &Span, version: u64) {
    span.record("floor.version", version);
}

/// Emit a stage transition event scoped to `span`.
pub fn record_stage_transition(span: &Span, from: &str, to: &str) {
    span.in_scope(|| {
        tracing::info!(from = from, to = to, "stage_transition");
    });
}
