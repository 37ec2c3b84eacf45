//! Task board domain used by the demo application.
//!
//! The demo patches inject bugs into exactly this logic: the priority
//! filter, lookups on an empty store and status validation. The store is an
//! explicit object rather than module-level state, so each caller (and each
//! test) owns its own board.

pub mod filters;
pub mod store;
pub mod validator;

pub use filters::TaskFilter;
pub use store::{generate_task_id, NewTask, Priority, Task, TaskStatus, TaskStore, TaskUpdate};
pub use validator::{parse_new_task, validate_task, ValidationResult, MAX_TITLE_LENGTH};
