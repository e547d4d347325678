//! Rendering is a pure function of the task list and the filter. User
//! intents go through [`dispatch`], which mutates the store and renders
//! again from state.

use crate::error::AppError;
use crate::model::{Task, TaskId, TaskStatus};
use crate::storage::KeyValueStore;
use crate::store::{Filter, TaskStore};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Position in the unfiltered list.
    pub index: usize,
    pub id: TaskId,
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedList {
    pub show_placeholder: bool,
    pub rows: Vec<Row>,
    pub active_filter: Option<TaskStatus>,
}

impl RenderedList {
    pub fn is_filter_active(&self, status: TaskStatus) -> bool {
        self.active_filter == Some(status)
    }
}

/// The placeholder is keyed off the unfiltered list: a list whose tasks are
/// all filtered out renders no rows and no placeholder.
pub fn render<'a>(tasks: impl IntoIterator<Item = &'a Task>, filter: Filter) -> RenderedList {
    let mut total = 0;
    let mut rows = Vec::new();
    for (index, task) in tasks.into_iter().enumerate() {
        total += 1;
        if !filter.matches(task) {
            continue;
        }
        rows.push(Row {
            index,
            id: task.id,
            name: task.name.clone(),
            checked: task.is_completed(),
        });
    }

    RenderedList {
        show_placeholder: total == 0,
        rows,
        active_filter: filter.status(),
    }
}

pub fn render_store<S: KeyValueStore>(store: &TaskStore<S>) -> RenderedList {
    render(store.tasks(), store.filter())
}

/// Digit-only input at least this long may be a short id rather than a
/// position.
const SHORT_ID_LEN: usize = 8;

/// Addresses a row either by its unfiltered position or by task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRef {
    Position(usize),
    Id(TaskId),
    /// Leading characters of an id, as shown in listings.
    IdPrefix(String),
    /// A short id made only of decimal digits. Resolves as an id prefix
    /// when one task matches, else as a position.
    Digits(String),
}

impl RowRef {
    pub fn resolve<S: KeyValueStore>(&self, store: &TaskStore<S>) -> Option<TaskId> {
        match self {
            Self::Position(position) => store.id_at(*position),
            Self::Id(id) => store.get(*id).map(|task| task.id),
            Self::IdPrefix(prefix) => unique_prefix_match(store, prefix),
            Self::Digits(digits) => unique_prefix_match(store, digits).or_else(|| {
                digits
                    .parse::<usize>()
                    .ok()
                    .and_then(|position| store.id_at(position))
            }),
        }
    }
}

fn unique_prefix_match<S: KeyValueStore>(store: &TaskStore<S>, prefix: &str) -> Option<TaskId> {
    let mut matches = store.tasks().filter(|task| {
        task.id.to_string().starts_with(prefix) || task.id.short().starts_with(prefix)
    });
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.id)
}

impl FromStr for RowRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("row is required"));
        }

        if let Ok(id) = trimmed.parse::<TaskId>() {
            return Ok(Self::Id(id));
        }

        if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            if trimmed.len() >= SHORT_ID_LEN {
                return Ok(Self::Digits(trimmed.to_string()));
            }
            if let Ok(position) = trimmed.parse::<usize>() {
                return Ok(Self::Position(position));
            }
        }

        let prefix = trimmed.to_ascii_lowercase();
        if prefix.chars().all(|ch| ch.is_ascii_hexdigit() || ch == '-') {
            Ok(Self::IdPrefix(prefix))
        } else {
            Err(AppError::invalid_input(format!("invalid row '{trimmed}'")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add(String),
    Toggle(RowRef),
    SetStatus(RowRef, bool),
    Delete(RowRef),
    Filter(TaskStatus),
    ClearAll,
    Show,
}

/// Applies an intent and re-renders. Rows that resolve to no task leave the
/// store untouched.
pub fn dispatch<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    intent: Intent,
) -> Result<RenderedList, AppError> {
    match intent {
        Intent::Add(text) => {
            store.add(&text)?;
        }
        Intent::Toggle(row) => {
            if let Some(id) = row.resolve(store)
                && let Some(task) = store.get(id)
            {
                let checked = !task.is_completed();
                store.set_status(id, checked)?;
            }
        }
        Intent::SetStatus(row, checked) => {
            if let Some(id) = row.resolve(store) {
                store.set_status(id, checked)?;
            }
        }
        Intent::Delete(row) => {
            if let Some(id) = row.resolve(store) {
                store.remove(id)?;
            }
        }
        Intent::Filter(status) => {
            store.set_filter(status);
        }
        Intent::ClearAll => store.clear()?,
        Intent::Show => {}
    }

    Ok(render_store(store))
}
