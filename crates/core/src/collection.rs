//! Task collection
//!
//! Owns every `Task` in insertion order, enforces case-insensitive name
//! uniqueness, and records a `CollectionEvent` for each mutation.

use chrono::{DateTime, Local};
use tracing::{debug, trace};

use crate::error::{TaskError, TaskResult};
use crate::events::{ChangeKind, CollectionEvent};
use crate::models::{Task, TaskId, TickOutcome};
use crate::scheduler::TickTicket;

/// Insertion-ordered registry of tasks
#[derive(Debug, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    last_id: u64,
    pending: Vec<CollectionEvent>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a task and append it.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyName` for a blank name and
    /// `TaskError::DuplicateName` if the name is already taken, ignoring case.
    pub fn add(&mut self, name: &str, created_at: DateTime<Local>) -> TaskResult<TaskId> {
        if self.has_name(name) {
            return Err(TaskError::DuplicateName {
                name: name.trim().to_string(),
            });
        }

        let id = TaskId::new(self.last_id + 1);
        let task = Task::new(id, name, created_at)?;
        self.last_id += 1;

        debug!("Adding task {} with name: {}", id, task.name());
        let position = self.tasks.len();
        self.tasks.push(task);
        self.pending.push(CollectionEvent::Inserted { id, position });
        Ok(id)
    }

    /// Remove a task and hand it back. Unknown ids are ignored.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let position = self.position_of(id)?;
        debug!("Removing task {}", id);
        let task = self.tasks.remove(position);
        self.pending.push(CollectionEvent::Removed { id, position });
        Some(task)
    }

    /// Remove every task matching `predicate`, one event per removal.
    ///
    /// Removal runs back to front so each reported position is valid at the
    /// moment it is reported.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Task) -> bool) -> Vec<Task> {
        let mut removed = Vec::new();
        for position in (0..self.tasks.len()).rev() {
            if predicate(&self.tasks[position]) {
                let task = self.tasks.remove(position);
                debug!("Removing task {}", task.id());
                self.pending.push(CollectionEvent::Removed {
                    id: task.id(),
                    position,
                });
                removed.push(task);
            }
        }
        removed
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id() == id)
    }

    /// All tasks in insertion order
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Case-insensitive existence check on trimmed names
    pub fn has_name(&self, name: &str) -> bool {
        self.tasks.iter().any(|t| t.has_name(name))
    }

    /// Start a task. Returns the first ticket to schedule.
    pub fn start(&mut self, id: TaskId) -> Option<TickTicket> {
        let position = self.position_of(id)?;
        let ticket = self.tasks[position].start()?;
        debug!("Started task {}", id);
        self.changed(id, position, ChangeKind::State);
        Some(ticket)
    }

    /// Stop a task. Returns `false` if unknown or not running.
    pub fn stop(&mut self, id: TaskId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        if !self.tasks[position].stop() {
            return false;
        }
        debug!("Stopped task {}", id);
        self.changed(id, position, ChangeKind::State);
        true
    }

    /// Deliver a tick.
    ///
    /// Tickets for removed, stopped or re-armed tasks are stale, and
    /// `increment` is only called for a live ticket.
    pub fn apply_tick(
        &mut self,
        ticket: TickTicket,
        increment: impl FnOnce() -> u8,
    ) -> TickOutcome {
        let Some(position) = self.position_of(ticket.task) else {
            trace!("Dropping tick for removed task {}", ticket.task);
            return TickOutcome::Stale;
        };
        if !self.tasks[position].is_live(ticket) {
            trace!("Dropping stale tick for task {}", ticket.task);
            return TickOutcome::Stale;
        }

        let outcome = self.tasks[position].apply_tick(ticket, increment());
        match outcome {
            TickOutcome::Stale => {}
            TickOutcome::Advanced { progress, .. } => {
                trace!("Task {} progressed to {}", ticket.task, progress);
                self.changed(ticket.task, position, ChangeKind::Progress);
            }
            TickOutcome::Finished => {
                debug!("Task {} finished", ticket.task);
                self.changed(ticket.task, position, ChangeKind::Progress);
                self.changed(ticket.task, position, ChangeKind::State);
            }
        }
        outcome
    }

    /// Set the UI selection flag. Returns `false` if unknown or unchanged.
    pub fn set_selected(&mut self, id: TaskId, selected: bool) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        if self.tasks[position].is_selected() == selected {
            return false;
        }
        self.tasks[position].set_selected(selected);
        self.changed(id, position, ChangeKind::Selection);
        true
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<CollectionEvent> {
        std::mem::take(&mut self.pending)
    }

    fn changed(&mut self, id: TaskId, position: usize, kind: ChangeKind) {
        self.pending.push(CollectionEvent::Changed { id, position, kind });
    }
}
