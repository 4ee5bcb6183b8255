use crate::models::TaskId;
use thiserror::Error;

/// Error types for task list operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The submitted name was blank or whitespace-only
    #[error("Task name cannot be empty")]
    EmptyName,

    /// A task with a case-insensitively equal name already exists
    #[error("Task '{name}' already exists")]
    DuplicateName { name: String },

    /// A view position outside `[0, len)` was requested
    #[error("Row {index} is out of range (view has {len} rows)")]
    OutOfRange { index: usize, len: usize },

    /// The task id is no longer present in the collection
    #[error("Task '{id}' not found")]
    UnknownId { id: TaskId },

    /// The simulation settings cannot drive a tick
    #[error("Invalid simulation config: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for task list operations
pub type TaskResult<T> = Result<T, TaskError>;
