//! # atelier
//!
//! Production stage and worker-assignment engine for a garment workshop.
//!
//! Orders move through a fixed stage catalog, idle workers are matched to
//! pending tasks in their department, and progress and efficiency figures
//! are derived from the same snapshot. Persistence, attendance data and
//! telemetry are injected around the pure engine.

pub mod attendance;
pub mod config;
pub mod department;
pub mod engine;
pub mod error;
pub mod event;
pub mod floor;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod telemetry;
