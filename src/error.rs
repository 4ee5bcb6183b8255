//! Error type for the tasklist binary.

use std::io;
use thiserror::Error;

use tasklist_core::TaskError;
use tasklist_tui::TuiError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Everything that can end a `tasklist` invocation early.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Tui(#[from] TuiError),

    /// Writing output or opening the log file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode row: {0}")]
    Json(#[from] serde_json::Error),
}
