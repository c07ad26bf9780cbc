//! Attendance and time-tracking data supplied by the biometric service.
//!
//! The engine never invents these figures: a worker without a record has
//! unknown hours and quality.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::WorkerId;

/// Source of per-worker attendance figures.
pub trait Attendance {
    /// Average hours worked per day, if tracked.
    fn average_hours(&self, worker: WorkerId) -> Option<f64>;

    /// Quality score in `0..=100`, if rated.
    fn quality_score(&self, worker: WorkerId) -> Option<u8>;
}

/// No attendance feed connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttendance;

impl Attendance for NoAttendance {
    fn average_hours(&self, _worker: WorkerId) -> Option<f64> {
        None
    }

    fn quality_score(&self, _worker: WorkerId) -> Option<u8> {
        None
    }
}

/// One worker's attendance summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub avg_hours: Option<f64>,
    #[serde(default)]
    pub quality_score: Option<u8>,
}

/// Attendance summaries keyed by worker, as exported by the attendance service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceRecords {
    records: HashMap<WorkerId, AttendanceRecord>,
}

impl AttendanceRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, worker: WorkerId, record: AttendanceRecord) {
        self.records.insert(worker, record);
    }

    pub fn with(mut self, worker: WorkerId, record: AttendanceRecord) -> Self {
        self.insert(worker, record);
        self
    }

    /// Load a JSON object mapping worker ids to records.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read attendance file {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Attendance for AttendanceRecords {
    fn average_hours(&self, worker: WorkerId) -> Option<f64> {
        self.records
            .get(&worker)
            .and_then(|r| r.avg_hours)
            .filter(|h| h.is_finite() && *h >= 0.0)
    }

    fn quality_score(&self, worker: WorkerId) -> Option<u8> {
        self.records
            .get(&worker)
            .and_then(|r| r.quality_score)
            .map(|q| q.min(100))
    }
}

impl<A: Attendance + ?Sized> Attendance for &A {
    fn average_hours(&self, worker: WorkerId) -> Option<f64> {
        (**self).average_hours(worker)
    }

    fn quality_score(&self, worker: WorkerId) -> Option<u8> {
        (**self).quality_score(worker)
    }
}
