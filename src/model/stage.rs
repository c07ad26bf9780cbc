//! The stage catalog: the fixed, ordered manufacturing pipeline.

use serde::{Deserialize, Serialize};

/// A step in the manufacturing pipeline.
///
/// Variants are declared in pipeline order, so the derived `Ord` is the
/// catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Accepted from order intake, no work started.
    Pending,
    Design,
    Cutting,
    Sewing,
    Fitting,
    /// Terminal.
    Completed,
}

impl StageId {
    /// Every stage in pipeline order.
    pub const CATALOG: [StageId; 6] = [
        StageId::Pending,
        StageId::Design,
        StageId::Cutting,
        StageId::Sewing,
        StageId::Fitting,
        StageId::Completed,
    ];

    /// Stages at which tasks are opened and workers assigned.
    pub const WORK_STAGES: [StageId; 4] = [
        StageId::Design,
        StageId::Cutting,
        StageId::Sewing,
        StageId::Fitting,
    ];

    /// Zero-based pipeline position.
    pub fn position(self) -> usize {
        self as usize
    }

    /// The stage immediately following this one, or `None` at `Completed`.
    pub fn next(self) -> Option<StageId> {
        Self::CATALOG.get(self.position() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == StageId::Completed
    }

    /// Does an order at this stage need workers?
    pub fn takes_tasks(self) -> bool {
        !matches!(self, StageId::Pending | StageId::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::Pending => "pending",
            StageId::Design => "design",
            StageId::Cutting => "cutting",
            StageId::Sewing => "sewing",
            StageId::Fitting => "fitting",
            StageId::Completed => "completed",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CATALOG
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage: {s}"))
    }
}
