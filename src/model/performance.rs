//! Derived worker performance figures. Never persisted authoritatively.

use serde::{Deserialize, Serialize};

use super::WorkerId;

/// Completed-over-assigned ratio for a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum Efficiency {
    /// Never assigned a task. Distinct from a measured 0%.
    NoHistory,
    /// Measured percentage in `0..=100`.
    Measured(u8),
}

impl Efficiency {
    /// The measured percentage. `None` for no history; display code must
    /// render that case itself rather than rank it as a number.
    pub fn measured(self) -> Option<u8> {
        match self {
            Efficiency::NoHistory => None,
            Efficiency::Measured(p) => Some(p),
        }
    }

    pub fn has_history(self) -> bool {
        matches!(self, Efficiency::Measured(_))
    }
}

impl std::fmt::Display for Efficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Efficiency::NoHistory => write!(f, "no history"),
            Efficiency::Measured(p) => write!(f, "{p}%"),
        }
    }
}

/// Performance figures for one worker.
///
/// `avg_hours` and `quality_score` come from attendance data; `None` means
/// the figure is unknown, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub worker: WorkerId,
    pub efficiency: Efficiency,
    pub completed_tasks: u32,
    pub assigned_tasks: u32,
    pub avg_hours: Option<f64>,
    pub quality_score: Option<u8>,
}
