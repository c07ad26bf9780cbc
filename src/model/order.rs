//! Orders: the manufacturing work items moving through the stage catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, StageId, WorkerId};

/// A customer order being manufactured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub title: String,
    /// Reference into the external client registry.
    pub client_ref: String,
    pub priority: Priority,

    /// Current pipeline position. Only the transition engine writes this.
    pub stage: StageId,

    /// Denormalized status mirrored for the order-management screens.
    pub status: OrderStatus,

    pub assigned_worker_ref: Option<WorkerId>,

    pub estimated_hours: f64,
    pub actual_hours: f64,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// A freshly accepted order at `pending`, as order intake produces it.
    pub fn new(
        title: impl Into<String>,
        client_ref: impl Into<String>,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            title: title.into(),
            client_ref: client_ref.into(),
            priority,
            stage: StageId::Pending,
            status: OrderStatus::Pending,
            assigned_worker_ref: None,
            estimated_hours: 0.0,
            actual_hours: 0.0,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours.max(0.0);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.stage.is_terminal()
    }
}

/// Scheduling priority. Declared low-to-high so `Ord` ranks `High` greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}
