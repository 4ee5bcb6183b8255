//! Terminal front end for the task list
//!
//! Renders a `TaskManager` with ratatui and drives it from crossterm key
//! events and tokio tick timers.

pub mod app;
pub mod error;
pub mod event;
pub mod rows;
pub mod ui;

pub use app::{App, Mode, StatusMessage};
pub use error::{TuiError, TuiResult};
