//! Data models for the task list
//!
//! A `Task` owns its name, creation time, progress and the small
//! Idle -> Running -> Done state machine that ticks advance.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{TaskError, TaskResult};
use crate::scheduler::TickTicket;

/// Progress value at which a task is finished
pub const MAX_PROGRESS: u8 = 100;

/// Stable task identity, assigned by the collection in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Wrap a raw id value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state derived from progress and the running flag
///
/// Done is absorbing: nothing moves a finished task back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Idle,
    Running,
    Done,
}

impl TaskState {
    /// Returns the lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Idle => "idle",
            TaskState::Running => "running",
            TaskState::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of delivering a tick to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The ticket no longer matches an armed tick; nothing changed
    Stale,
    /// Progress moved and the next tick is armed with `next`
    Advanced { progress: u8, next: TickTicket },
    /// Progress reached the maximum and the task stopped
    Finished,
}

/// A single user-created unit of work
#[derive(Debug)]
pub struct Task {
    id: TaskId,
    name: String,
    created_at: DateTime<Local>,
    progress: u8,
    running: bool,
    selected: bool,
    /// Bumped on every arm and every stop; only the latest ticket is live
    epoch: u64,
}

impl Task {
    /// Create an idle task with zero progress.
    ///
    /// The name is stored trimmed.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyName` if the name is blank.
    pub fn new(id: TaskId, name: &str, created_at: DateTime<Local>) -> TaskResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskError::EmptyName);
        }

        Ok(Self {
            id,
            name: name.to_string(),
            created_at,
            progress: 0,
            running: false,
            selected: false,
            epoch: 0,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Current progress in `[0, 100]`
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_done(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }

    /// UI-only selection flag; has no effect on the simulation
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn state(&self) -> TaskState {
        if self.running {
            TaskState::Running
        } else if self.is_done() {
            TaskState::Done
        } else {
            TaskState::Idle
        }
    }

    /// Case-insensitive name comparison used for uniqueness checks
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Move Idle -> Running.
    ///
    /// Returns the ticket for the first tick, which the caller must schedule.
    /// Returns `None` when already running or done.
    pub fn start(&mut self) -> Option<TickTicket> {
        if self.running || self.is_done() {
            return None;
        }
        self.running = true;
        Some(self.arm())
    }

    /// Move Running -> Idle, invalidating any outstanding ticket.
    ///
    /// Returns `false` when the task was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.epoch += 1;
        true
    }

    /// Apply a delivered tick with the given increment.
    ///
    /// Tickets from a previous arm, or delivered after `stop`, are stale and
    /// leave the task untouched. Reaching the maximum stops the task in the
    /// same step.
    pub fn apply_tick(&mut self, ticket: TickTicket, increment: u8) -> TickOutcome {
        if !self.is_live(ticket) {
            return TickOutcome::Stale;
        }

        self.progress = self.progress.saturating_add(increment).min(MAX_PROGRESS);

        if self.is_done() {
            self.stop();
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced {
                progress: self.progress,
                next: self.arm(),
            }
        }
    }

    /// Whether `ticket` is the one currently armed for this task
    pub fn is_live(&self, ticket: TickTicket) -> bool {
        self.running && ticket == self.live_ticket()
    }

    fn arm(&mut self) -> TickTicket {
        self.epoch += 1;
        self.live_ticket()
    }

    fn live_ticket(&self) -> TickTicket {
        TickTicket {
            task: self.id,
            epoch: self.epoch,
        }
    }
}

/// Read-only snapshot of one task, as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub name: String,
    pub created_at: DateTime<Local>,
    pub progress: u8,
    pub running: bool,
    pub selected: bool,
}

impl TaskRow {
    pub fn state(&self) -> TaskState {
        if self.running {
            TaskState::Running
        } else if self.progress >= MAX_PROGRESS {
            TaskState::Done
        } else {
            TaskState::Idle
        }
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            created_at: task.created_at,
            progress: task.progress,
            running: task.running,
            selected: task.selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Task {
        Task::new(TaskId::new(1), name, Local::now()).unwrap()
    }

    #[test]
    fn test_new_task_is_idle() {
        let t = task("Laundry");
        assert_eq!(t.progress(), 0);
        assert!(!t.is_running());
        assert!(!t.is_selected());
        assert_eq!(t.state(), TaskState::Idle);
    }

    #[test]
    fn test_new_task_trims_name() {
        let t = task("  Dishes \t");
        assert_eq!(t.name(), "Dishes");
    }

    #[test]
    fn test_new_task_rejects_blank_name() {
        let result = Task::new(TaskId::new(1), "   ", Local::now());
        assert_eq!(result.unwrap_err(), TaskError::EmptyName);
    }

    #[test]
    fn test_has_name_is_case_insensitive() {
        let t = task("Laundry");
        assert!(t.has_name("laundry"));
        assert!(t.has_name(" LAUNDRY "));
        assert!(!t.has_name("Laundromat"));
    }

    #[test]
    fn test_start_arms_first_ticket() {
        let mut t = task("a");
        let ticket = t.start().expect("idle task should start");
        assert_eq!(ticket.task, TaskId::new(1));
        assert!(t.is_running());
        assert_eq!(t.state(), TaskState::Running);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut t = task("a");
        assert!(t.start().is_some());
        assert!(t.start().is_none());
        assert!(t.is_running());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut t = task("a");
        assert!(!t.stop());
        assert_eq!(t.state(), TaskState::Idle);
    }

    #[test]
    fn test_tick_advances_and_rearms() {
        let mut t = task("a");
        let ticket = t.start().unwrap();
        match t.apply_tick(ticket, 3) {
            TickOutcome::Advanced { progress, next } => {
                assert_eq!(progress, 3);
                assert_ne!(next, ticket);
            }
            other => panic!("expected Advanced, got {:?}", other),
        }
        assert_eq!(t.progress(), 3);
    }

    #[test]
    fn test_ticket_is_single_use() {
        let mut t = task("a");
        let ticket = t.start().unwrap();
        assert!(matches!(t.apply_tick(ticket, 1), TickOutcome::Advanced { .. }));
        assert_eq!(t.apply_tick(ticket, 1), TickOutcome::Stale);
        assert_eq!(t.progress(), 1);
    }

    #[test]
    fn test_tick_after_stop_is_stale() {
        let mut t = task("a");
        let ticket = t.start().unwrap();
        assert!(t.stop());
        assert_eq!(t.apply_tick(ticket, 2), TickOutcome::Stale);
        assert_eq!(t.progress(), 0);
    }

    #[test]
    fn test_tick_from_previous_run_is_stale_after_restart() {
        let mut t = task("a");
        let old = t.start().unwrap();
        t.stop();
        let fresh = t.start().unwrap();
        assert_eq!(t.apply_tick(old, 2), TickOutcome::Stale);
        assert!(matches!(t.apply_tick(fresh, 2), TickOutcome::Advanced { .. }));
    }

    #[test]
    fn test_tick_clamps_and_finishes() {
        let mut t = task("a");
        let mut ticket = t.start().unwrap();
        loop {
            match t.apply_tick(ticket, 3) {
                TickOutcome::Advanced { next, .. } => ticket = next,
                TickOutcome::Finished => break,
                TickOutcome::Stale => panic!("live ticket reported stale"),
            }
        }
        assert_eq!(t.progress(), MAX_PROGRESS);
        assert!(!t.is_running());
        assert_eq!(t.state(), TaskState::Done);
    }

    #[test]
    fn test_done_is_absorbing() {
        let mut t = task("a");
        let ticket = t.start().unwrap();
        assert_eq!(t.apply_tick(ticket, 100), TickOutcome::Finished);
        assert!(t.start().is_none());
        assert!(!t.stop());
        assert_eq!(t.state(), TaskState::Done);
    }

    #[test]
    fn test_task_row_snapshot() {
        let mut t = task("Report");
        t.set_selected(true);
        let row = TaskRow::from(&t);
        assert_eq!(row.name, "Report");
        assert_eq!(row.progress, 0);
        assert!(!row.running);
        assert!(row.selected);
        assert_eq!(row.state(), TaskState::Idle);
    }

    #[test]
    fn test_task_state_serialization() {
        let json = serde_json::to_string(&TaskState::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(TaskState::Done.to_string(), "done");
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId::new(12).to_string(), "#12");
        assert_eq!(TaskId::new(12).get(), 12);
    }
}
