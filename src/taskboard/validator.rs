//! Validation of incoming task data.
//!
//! Works on raw JSON so that every problem is reported at once, instead of
//! stopping at the first field serde fails to decode.

use super::store::NewTask;
use serde::Serialize;
use serde_json::Value;

/// Longest accepted title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

const STATUSES: [&str; 3] = ["todo", "in-progress", "done"];
const PRIORITIES: [&str; 3] = ["low", "medium", "high"];

/// Outcome of [`validate_task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn one_of(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().is_some_and(|s| allowed.contains(&s))
}

/// Check task data before it reaches the store.
///
/// `status` and `priority` are optional, but when present (even as `null`)
/// they must hold an allowed value.
pub fn validate_task(data: &Value) -> ValidationResult {
    let Some(object) = data.as_object() else {
        return ValidationResult::from_errors(vec!["task data must be an object".to_string()]);
    };

    let mut errors = Vec::new();

    match object.get("title").and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => {
            if title.chars().count() > MAX_TITLE_LENGTH {
                errors.push(format!(
                    "title must be {} characters or less",
                    MAX_TITLE_LENGTH
                ));
            }
        }
        _ => errors.push("title is required".to_string()),
    }

    if let Some(status) = object.get("status") {
        if !one_of(status, &STATUSES) {
            errors.push(format!("status must be one of: {}", STATUSES.join(", ")));
        }
    }

    if let Some(priority) = object.get("priority") {
        if !one_of(priority, &PRIORITIES) {
            errors.push(format!(
                "priority must be one of: {}",
                PRIORITIES.join(", ")
            ));
        }
    }

    ValidationResult::from_errors(errors)
}

/// Validate and decode task data in one step.
///
/// # Errors
///
/// Returns the validation result when the data is invalid or has fields of
/// the wrong type.
pub fn parse_new_task(data: &Value) -> Result<NewTask, ValidationResult> {
    let result = validate_task(data);
    if !result.valid {
        return Err(result);
    }

    serde_json::from_value(data.clone())
        .map_err(|e| ValidationResult::from_errors(vec![e.to_string()]))
}
