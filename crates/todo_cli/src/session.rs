use crate::cli::Command;
use crate::output;
use todo_core::config::Config;
use todo_core::error::AppError;
use todo_core::model::TaskStatus;
use todo_core::storage::KeyValueStore;
use todo_core::store::TaskStore;
use todo_core::view::{self, RenderedList};
use tracing::debug;

/// One process lifetime: the loaded list, its filter and the output settings.
pub struct Session<S> {
    store: TaskStore<S>,
    config: Config,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(storage: S, config: Config) -> Self {
        let store = TaskStore::open(storage);
        debug!(tasks = store.len(), "session started");
        Self { store, config }
    }

    pub fn with_filter(mut self, status: Option<TaskStatus>) -> Self {
        if let Some(status) = status {
            self.store.set_filter(status);
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn run(&mut self, command: Command) -> Result<RenderedList, AppError> {
        let intent = command.into_intent()?;
        debug!(?intent, "dispatching");
        view::dispatch(&mut self.store, intent)
    }

    pub fn run_and_format(&mut self, command: Command, json: bool) -> Result<String, AppError> {
        let rendered = self.run(command)?;
        if json {
            output::render_json(&rendered)
        } else {
            Ok(output::render_plain(&rendered))
        }
    }
}
