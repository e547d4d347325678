//! The owned task list and its status filter.
//!
//! Tasks live in an id-keyed map with a separate ordering of ids, so a task
//! keeps its identity when earlier tasks are removed. Positions into the full
//! list are still accepted and resolve through the ordering. Every mutation
//! writes the whole list back to the storage slot before returning.

use crate::error::AppError;
use crate::model::{Task, TaskId, TaskStatus};
use crate::storage::KeyValueStore;
use crate::storage::json_store::{self, TASKS_SLOT};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    None,
    Only(TaskStatus),
}

impl Filter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::None => true,
            Self::Only(status) => task.status == *status,
        }
    }

    /// Filter-button click: the active button switches off, any other
    /// button becomes the only active one.
    pub fn toggled(self, clicked: TaskStatus) -> Self {
        match self {
            Self::Only(active) if active == clicked => Self::None,
            _ => Self::Only(clicked),
        }
    }

    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            Self::None => None,
            Self::Only(status) => Some(*status),
        }
    }
}

pub struct TaskStore<S> {
    storage: S,
    slot: String,
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task>,
    filter: Filter,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Loads the list from the default slot. Never fails: absent or corrupt
    /// data starts an empty list.
    pub fn open(storage: S) -> Self {
        Self::open_slot(storage, TASKS_SLOT)
    }

    pub fn open_slot(storage: S, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let loaded = json_store::load_tasks(&storage, &slot);
        let mut order = Vec::with_capacity(loaded.len());
        let mut tasks = HashMap::with_capacity(loaded.len());
        for task in loaded {
            order.push(task.id);
            tasks.insert(task.id, task);
        }

        Self {
            storage,
            slot,
            order,
            tasks,
            filter: Filter::None,
        }
    }

    /// Prepends a pending task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str) -> Result<Option<TaskId>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring blank task");
            return Ok(None);
        }

        let task = Task::pending(trimmed);
        let id = task.id;
        self.order.insert(0, id);
        self.tasks.insert(id, task);
        debug!(%id, "added task");

        self.persist()?;
        Ok(Some(id))
    }

    /// Returns whether a task was updated; an unknown id is a no-op.
    pub fn set_status(&mut self, id: TaskId, checked: bool) -> Result<bool, AppError> {
        let Some(task) = self.tasks.get_mut(&id) else {
            debug!(%id, "set_status on unknown task");
            return Ok(false);
        };

        task.status = TaskStatus::from_checked(checked);
        debug!(%id, status = %task.status, "updated status");

        self.persist()?;
        Ok(true)
    }

    pub fn set_status_at(&mut self, position: usize, checked: bool) -> Result<bool, AppError> {
        match self.id_at(position) {
            Some(id) => self.set_status(id, checked),
            None => {
                debug!(position, "set_status_at out of range");
                Ok(false)
            }
        }
    }

    /// Removes a task and returns it; an unknown id is a no-op.
    pub fn remove(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        let Some(position) = self.position(id) else {
            debug!(%id, "remove on unknown task");
            return Ok(None);
        };

        self.order.remove(position);
        let removed = self.tasks.remove(&id);
        debug!(%id, position, "removed task");

        self.persist()?;
        Ok(removed)
    }

    pub fn remove_at(&mut self, position: usize) -> Result<Option<Task>, AppError> {
        match self.id_at(position) {
            Some(id) => self.remove(id),
            None => {
                debug!(position, "remove_at out of range");
                Ok(None)
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), AppError> {
        self.order.clear();
        self.tasks.clear();
        debug!("cleared tasks");
        self.persist()
    }

    /// Applies a filter-button click and returns the resulting filter.
    pub fn set_filter(&mut self, clicked: TaskStatus) -> Filter {
        self.filter = self.filter.toggled(clicked);
        debug!(filter = ?self.filter, "filter changed");
        self.filter
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn id_at(&self, position: usize) -> Option<TaskId> {
        self.order.get(position).copied()
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) -> Result<(), AppError> {
        let snapshot: Vec<Task> = self.tasks().cloned().collect();
        json_store::save_tasks(&mut self.storage, &self.slot, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, TaskStore};
    use crate::error::AppError;
    use crate::model::{Task, TaskStatus};
    use crate::storage::json_store::{self, TASKS_SLOT};
    use crate::storage::{KeyValueStore, MemoryStore};

    fn store_with(names: &[&str]) -> TaskStore<MemoryStore> {
        let mut store = TaskStore::open(MemoryStore::new());
        for name in names.iter().rev() {
            store.add(name).unwrap();
        }
        store
    }

    fn names<S: KeyValueStore>(store: &TaskStore<S>) -> Vec<String> {
        store.tasks().map(|task| task.name.clone()).collect()
    }

    fn persisted(store: &TaskStore<MemoryStore>) -> Vec<Task> {
        json_store::load_tasks(store.storage(), TASKS_SLOT)
    }

    #[test]
    fn add_prepends_pending_task() {
        let mut store = store_with(&["older"]);

        let id = store.add("Buy milk").unwrap().unwrap();

        assert_eq!(store.len(), 2);
        let first = store.tasks().next().unwrap();
        assert_eq!(first.id, id);
        assert_eq!(first.name, "Buy milk");
        assert_eq!(first.status, TaskStatus::Pending);
    }

    #[test]
    fn add_stores_trimmed_text() {
        let mut store = store_with(&[]);
        store.add("  Buy milk \n").unwrap();
        assert_eq!(names(&store), vec!["Buy milk"]);
    }

    #[test]
    fn add_ignores_blank_text() {
        let mut store = store_with(&["a"]);
        let before = persisted(&store);

        assert_eq!(store.add("").unwrap(), None);
        assert_eq!(store.add("   ").unwrap(), None);

        assert_eq!(names(&store), vec!["a"]);
        assert_eq!(persisted(&store), before);
    }

    #[test]
    fn set_status_round_trip_returns_to_pending() {
        let mut store = store_with(&["a", "b"]);

        assert!(store.set_status_at(1, true).unwrap());
        assert_eq!(store.tasks().nth(1).unwrap().status, TaskStatus::Completed);
        assert_eq!(persisted(&store)[1].status, TaskStatus::Completed);

        assert!(store.set_status_at(1, false).unwrap());
        assert_eq!(store.tasks().nth(1).unwrap().status, TaskStatus::Pending);
        assert_eq!(store.tasks().next().unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn set_status_out_of_range_is_noop() {
        let mut store = store_with(&["a"]);
        assert!(!store.set_status_at(5, true).unwrap());
        assert_eq!(store.tasks().next().unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn remove_at_shifts_later_tasks_down() {
        let mut store = store_with(&["a", "b", "c"]);
        let c_id = store.id_at(2).unwrap();

        let removed = store.remove_at(1).unwrap().unwrap();

        assert_eq!(removed.name, "b");
        assert_eq!(names(&store), vec!["a", "c"]);
        assert_eq!(store.id_at(1), Some(c_id));
        assert_eq!(persisted(&store).len(), 2);
    }

    #[test]
    fn ids_survive_earlier_removals() {
        let mut store = store_with(&["a", "b", "c"]);
        let c_id = store.id_at(2).unwrap();

        store.remove_at(0).unwrap();
        store.set_status(c_id, true).unwrap();

        assert_eq!(store.get(c_id).unwrap().name, "c");
        assert_eq!(store.get(c_id).unwrap().status, TaskStatus::Completed);
        assert_eq!(store.position(c_id), Some(1));
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut store = store_with(&["a"]);
        assert!(store.remove_at(3).unwrap().is_none());
        assert!(store.remove(crate::model::TaskId::new()).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_empties_list_and_slot() {
        let mut store = store_with(&["a", "b"]);
        store.set_status_at(0, true).unwrap();

        store.clear().unwrap();

        assert!(store.is_empty());
        assert!(persisted(&store).is_empty());
    }

    #[test]
    fn reopening_reproduces_list() {
        let mut store = store_with(&["a", "b", "c"]);
        store.set_status_at(2, true).unwrap();
        store.remove_at(0).unwrap();
        let expected: Vec<Task> = store.tasks().cloned().collect();

        let reopened = TaskStore::open(store.storage().clone());

        assert_eq!(reopened.tasks().cloned().collect::<Vec<_>>(), expected);
        assert_eq!(reopened.filter(), Filter::None);
    }

    #[test]
    fn filter_toggles_like_buttons() {
        let mut store = store_with(&[]);

        assert_eq!(
            store.set_filter(TaskStatus::Pending),
            Filter::Only(TaskStatus::Pending)
        );
        assert_eq!(
            store.set_filter(TaskStatus::Completed),
            Filter::Only(TaskStatus::Completed)
        );
        assert_eq!(store.set_filter(TaskStatus::Completed), Filter::None);
        assert_eq!(store.filter().status(), None);
    }

    #[test]
    fn filter_is_not_persisted() {
        let mut store = store_with(&["a"]);
        store.set_filter(TaskStatus::Completed);

        let reopened = TaskStore::open(store.storage().clone());

        assert_eq!(reopened.filter(), Filter::None);
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::io("read-only"))
        }
    }

    #[test]
    fn write_failure_keeps_change_in_memory() {
        let mut store = TaskStore::open(ReadOnlyStore);

        let err = store.add("Buy milk").unwrap_err();
        assert_eq!(err.code(), "io_error");
        assert_eq!(names(&store), vec!["Buy milk"]);

        let id = store.id_at(0).unwrap();
        assert!(store.set_status(id, true).is_err());
        assert!(store.get(id).unwrap().is_completed());

        assert!(store.clear().is_err());
        assert!(store.is_empty());
    }
}
