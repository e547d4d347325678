use crate::error::AppError;
use crate::model::{Task, TaskId};
use crate::storage::KeyValueStore;
use std::collections::HashSet;
use tracing::{debug, warn};

pub const TASKS_SLOT: &str = "todos";

/// Reads the task list from `slot`. A missing, unreadable or malformed slot
/// yields an empty list.
pub fn load_tasks<S: KeyValueStore + ?Sized>(store: &S, slot: &str) -> Vec<Task> {
    let content = match store.get(slot) {
        Ok(Some(content)) => content,
        Ok(None) => {
            debug!(slot, "no saved tasks");
            return Vec::new();
        }
        Err(err) => {
            warn!(slot, error = %err, "cannot read saved tasks, starting empty");
            return Vec::new();
        }
    };

    match decode_tasks(&content) {
        Ok(tasks) => {
            debug!(slot, count = tasks.len(), "loaded tasks");
            tasks
        }
        Err(err) => {
            warn!(slot, error = %err, "saved tasks are corrupt, starting empty");
            Vec::new()
        }
    }
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(
    store: &mut S,
    slot: &str,
    tasks: &[Task],
) -> Result<(), AppError> {
    let content = encode_tasks(tasks)?;
    store.set(slot, &content)?;
    debug!(slot, count = tasks.len(), "saved tasks");
    Ok(())
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Decodes a slot value. Legacy entries without an id, and entries whose id
/// repeats an earlier one, get a fresh id.
pub fn decode_tasks(content: &str) -> Result<Vec<Task>, AppError> {
    if content.trim().is_empty() || content.trim() == "null" {
        return Ok(Vec::new());
    }

    let mut tasks: Vec<Task> =
        serde_json::from_str(content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &mut tasks {
        if !seen.insert(task.id) {
            task.id = TaskId::new();
            seen.insert(task.id);
        }
    }

    Ok(tasks)
}
