//! Core data model.
//!
//! Orders move through the stage catalog, tasks bind an order's stage to at
//! most one worker, and workers come from an external roster. Records refer
//! to each other only through stable ids.

pub mod order;
pub mod performance;
pub mod stage;
pub mod task;
pub mod worker;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use order::{Order, OrderStatus, Priority};
pub use performance::{Efficiency, PerformanceSnapshot};
pub use stage::StageId;
pub use task::{Task, TaskStatus};
pub use worker::Worker;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                // Short display: first 8 chars of UUID
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

record_id!(
    /// Newtype for order ids.
    OrderId
);
record_id!(
    /// Newtype for task ids.
    TaskId
);
record_id!(
    /// Newtype for worker ids.
    WorkerId
);
