use crate::error::AppError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod json_store;

const STORE_DIR_ENV_VAR: &str = "TODOAPP_STORE_DIR";

/// Named-slot storage. A slot holds one string value and every write
/// replaces the previous one.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keeps each slot in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| AppError::io(format!("{}: {}", self.dir.display(), err)))?;

        let path = self.slot_path(key);
        std::fs::write(&path, value)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        debug!(path = %path.display(), bytes = value.len(), "wrote slot");
        Ok(())
    }
}

/// Resolves the default storage directory: `TODOAPP_STORE_DIR`, then the
/// platform config directory.
pub fn default_store_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("todoapp"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("todoapp"))
    }
}
