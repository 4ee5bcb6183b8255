//! Change notifications
//!
//! The collection records a `CollectionEvent` after every mutation. The
//! view turns those into `ViewEvent`s, which are positional and enough
//! for a presentation layer to redraw incrementally.

use crate::models::TaskId;

/// What about a task changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Progress value moved
    Progress,
    /// Running flag flipped (start, stop or finish)
    State,
    /// UI selection toggled
    Selection,
}

/// Notification raised by the collection, positions are in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEvent {
    Inserted { id: TaskId, position: usize },
    Removed { id: TaskId, position: usize },
    Changed { id: TaskId, position: usize, kind: ChangeKind },
}

impl CollectionEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            CollectionEvent::Inserted { id, .. }
            | CollectionEvent::Removed { id, .. }
            | CollectionEvent::Changed { id, .. } => *id,
        }
    }
}

/// Notification raised by the view, positions are view rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    RowInserted { position: usize, id: TaskId },
    RowRemoved { position: usize, id: TaskId },
    RowChanged { position: usize, id: TaskId, kind: ChangeKind },
}

impl ViewEvent {
    pub fn position(&self) -> usize {
        match self {
            ViewEvent::RowInserted { position, .. }
            | ViewEvent::RowRemoved { position, .. }
            | ViewEvent::RowChanged { position, .. } => *position,
        }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            ViewEvent::RowInserted { id, .. }
            | ViewEvent::RowRemoved { id, .. }
            | ViewEvent::RowChanged { id, .. } => *id,
        }
    }
}
