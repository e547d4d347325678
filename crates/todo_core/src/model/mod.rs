mod task;

pub use task::{Task, TaskId, TaskStatus};
