//! Task list filtering.

use super::store::{Priority, Task, TaskStatus};

/// Conjunction of optional criteria. Unset criteria, and an empty
/// assignee, match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self.status.is_none_or(|s| task.status == s);
        let assignee_ok = match self.assignee.as_deref() {
            None | Some("") => true,
            Some(name) => task.assignee.as_deref() == Some(name),
        };
        // A task without a priority never matches a priority filter.
        let priority_ok = self.priority.is_none_or(|p| task.priority == Some(p));

        status_ok && assignee_ok && priority_ok
    }

    /// Matching tasks, in input order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
