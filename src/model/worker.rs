//! Workers as supplied by the external roster.

use serde::{Deserialize, Serialize};

use super::{Task, WorkerId};

/// A workshop employee.
///
/// There is no stored "current task": it is derived from the task
/// collection with [`Worker::current_task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    /// Department name as the roster spells it. Matched to a stage through
    /// the department map, never by string equality with a stage name.
    pub department: String,
    pub is_active: bool,
}

impl Worker {
    pub fn new(name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: WorkerId::new(),
            name: name.into(),
            department: department.into(),
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The task this worker is actively working on, if any.
    pub fn current_task<'a, I>(&self, tasks: I) -> Option<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks.into_iter().find(|t| t.is_current_for(self.id))
    }
}
