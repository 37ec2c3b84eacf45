//! In-memory task store.
//!
//! Reads hand out copies or shared references; the store itself is the only
//! place a task is mutated. The id of a stored task never changes.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow column of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Tasks created without a priority keep `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`TaskStore::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
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
}

/// Partial update for [`TaskStore::update`]. Unknown fields, `id`
/// included, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
}

impl TaskUpdate {
    fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = Some(assignee);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = self.priority {
            task.priority = Some(priority);
        }
    }
}

/// Generate an id of the form `task-1a2b3c4d`.
pub fn generate_task_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("task-{}", &uuid[..8])
}

/// Ordered collection of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the demo board.
    #[must_use]
    pub fn with_seed_data() -> Self {
        Self {
            tasks: seed_tasks(),
        }
    }

    /// Copy of every task in insertion order.
    pub fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a task, filling in `id` and `created_at` when absent.
    pub fn add(&mut self, new: NewTask) -> Task {
        let task = Task {
            id: new.id.unwrap_or_else(generate_task_id),
            title: new.title,
            status: new.status.unwrap_or_default(),
            assignee: new.assignee,
            due_date: new.due_date,
            priority: new.priority,
            created_at: new.created_at.unwrap_or_else(Utc::now),
        };
        self.tasks.push(task.clone());
        task
    }

    /// Merge `update` into the task with `id`. Returns `None` if absent.
    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        update.apply_to(task);
        Some(task.clone())
    }

    /// Remove the task with `id`. Returns `false` if absent.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the contents with `tasks`.
    pub fn seed(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

fn seed_task(
    id: &str,
    title: &str,
    status: TaskStatus,
    assignee: &str,
    due: (i32, u32, u32),
    priority: Priority,
    created: (u32, u32),
) -> Task {
    let (day, hour) = created;
    Task {
        id: id.to_string(),
        title: title.to_string(),
        status,
        assignee: Some(assignee.to_string()),
        due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
        priority: Some(priority),
        created_at: Utc
            .with_ymd_and_hms(2025, 1, day, hour, 0, 0)
            .single()
            .unwrap_or_default(),
    }
}

fn seed_tasks() -> Vec<Task> {
    use Priority::{High, Low, Medium};
    use TaskStatus::{Done, InProgress, Todo};

    vec![
        seed_task("task-1", "Set up CI pipeline", Done, "Alice", (2025, 2, 15), High, (10, 10)),
        seed_task("task-2", "Write unit tests for auth", InProgress, "Bob", (2025, 2, 20), High, (12, 9)),
        seed_task("task-3", "Refactor database queries", Todo, "Alice", (2025, 3, 1), Medium, (15, 14)),
        seed_task("task-4", "Add error logging", Todo, "Charlie", (2025, 3, 10), Low, (18, 11)),
        seed_task("task-5", "Review pull requests", InProgress, "Bob", (2025, 2, 25), Medium, (20, 8)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_data() {
        let store = TaskStore::with_seed_data();
        assert_eq!(store.len(), 5);
        let first = store.get("task-1").unwrap();
        assert_eq!(first.title, "Set up CI pipeline");
        assert_eq!(first.status, TaskStatus::Done);
        assert_eq!(first.created_at.to_rfc3339(), "2025-01-10T10:00:00+00:00");
    }

    #[test]
    fn test_new_store_is_empty() {
        assert!(TaskStore::new().is_empty());
        assert!(TaskStore::new().all().is_empty());
    }

    #[test]
    fn test_add_generates_id_and_timestamp() {
        let mut store = TaskStore::new();
        let before = Utc::now();
        let task = store.add(NewTask::titled("Write docs").with_priority(Priority::Low));

        assert!(task.id.starts_with("task-"));
        assert_eq!(task.id.len(), "task-".len() + 8);
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.created_at >= before);
        assert_eq!(store.get(&task.id), Some(&task));
    }

    #[test]
    fn test_add_keeps_supplied_id() {
        let mut store = TaskStore::new();
        let mut new = NewTask::titled("Pinned");
        new.id = Some("task-pinned".to_string());
        assert_eq!(store.add(new).id, "task-pinned");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut store = TaskStore::new();
        let a = store.add(NewTask::titled("a"));
        let b = store.add(NewTask::titled("b"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_all_returns_copies() {
        let store = TaskStore::with_seed_data();
        let mut copy = store.all();
        copy[0].title = "changed".to_string();
        assert_eq!(store.get("task-1").unwrap().title, "Set up CI pipeline");
    }

    #[test]
    fn test_update_merges_and_keeps_id() {
        let mut store = TaskStore::with_seed_data();
        let update: TaskUpdate =
            serde_json::from_value(json!({"id": "task-99", "status": "done"})).unwrap();

        let updated = store.update("task-3", update).unwrap();
        assert_eq!(updated.id, "task-3");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, "Refactor database queries");
        assert!(store.get("task-99").is_none());
    }

    #[test]
    fn test_update_missing_returns_none() {
        let mut store = TaskStore::new();
        assert!(store.update("task-1", TaskUpdate::default()).is_none());
    }

    #[test]
    fn test_delete() {
        let mut store = TaskStore::with_seed_data();
        assert!(store.delete("task-2"));
        assert!(!store.delete("task-2"));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_seed_and_clear() {
        let mut store = TaskStore::with_seed_data();
        store.clear();
        assert!(store.is_empty());
        // Empty store: lookups must not panic
        assert!(store.get("task-1").is_none());

        store.seed(TaskStore::with_seed_data().all()[..2].to_vec());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let store = TaskStore::with_seed_data();
        let json = serde_json::to_value(store.get("task-2").unwrap()).unwrap();
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["dueDate"], "2025-02-20");
        assert_eq!(json["priority"], "high");
        assert!(json.get("createdAt").is_some());
    }
}
