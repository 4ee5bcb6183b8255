//! Core of the Tasklist task manager
//!
//! Tasks progress from 0 to 100 through randomized, timer-driven ticks.
//! A `TaskCollection` owns them, a `FilteredSortedView` projects them
//! newest-first through an All/Active/Inactive filter, and `TaskManager`
//! ties both to a `TickScheduler` behind a single command surface.

pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod manager;
pub mod models;
pub mod scheduler;
pub mod view;

pub use collection::TaskCollection;
pub use config::SimulationConfig;
pub use error::{TaskError, TaskResult};
pub use events::{ChangeKind, CollectionEvent, ViewEvent};
pub use filter::{FilterKind, NewestFirst, TaskComparator, TaskPredicate};
pub use manager::TaskManager;
pub use models::{MAX_PROGRESS, Task, TaskId, TaskRow, TaskState, TickOutcome};
pub use scheduler::{ManualScheduler, TickScheduler, TickTicket, TokioScheduler};
pub use view::FilteredSortedView;
