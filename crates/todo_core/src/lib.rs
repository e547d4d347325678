pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use error::AppError;
pub use model::{Task, TaskId, TaskStatus};
pub use store::{Filter, TaskStore};
