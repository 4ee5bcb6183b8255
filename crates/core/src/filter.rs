//! Filter and ordering strategies for the task view
//!
//! The view is composed with a `TaskPredicate` that decides membership and
//! a `TaskComparator` that decides row order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// Decides whether a task belongs in the view
pub trait TaskPredicate {
    fn accepts(&self, task: &Task) -> bool;
}

/// Orders tasks in the view; `Less` means "shown above"
pub trait TaskComparator {
    fn compare(&self, a: &Task, b: &Task) -> Ordering;
}

/// Which tasks the view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    All,
    /// Running tasks only
    Active,
    /// Idle and finished tasks
    Inactive,
}

impl FilterKind {
    /// Returns the lowercase name of the filter
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::All => "all",
            FilterKind::Active => "active",
            FilterKind::Inactive => "inactive",
        }
    }

    /// Cycle All -> Active -> Inactive -> All
    pub fn next(self) -> Self {
        match self {
            FilterKind::All => FilterKind::Active,
            FilterKind::Active => FilterKind::Inactive,
            FilterKind::Inactive => FilterKind::All,
        }
    }

    /// Position of the filter in the cycle (0, 1, or 2)
    pub fn index(self) -> usize {
        match self {
            FilterKind::All => 0,
            FilterKind::Active => 1,
            FilterKind::Inactive => 2,
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(FilterKind::All),
            "active" => Ok(FilterKind::Active),
            "inactive" => Ok(FilterKind::Inactive),
            _ => Err(format!(
                "invalid filter '{}'. Valid values: all, active, inactive",
                s
            )),
        }
    }
}

impl TaskPredicate for FilterKind {
    fn accepts(&self, task: &Task) -> bool {
        match self {
            FilterKind::All => true,
            FilterKind::Active => task.is_running(),
            FilterKind::Inactive => !task.is_running(),
        }
    }
}

impl<F> TaskPredicate for F
where
    F: Fn(&Task) -> bool,
{
    fn accepts(&self, task: &Task) -> bool {
        self(task)
    }
}

/// Newest creation time first.
///
/// Equal timestamps fall back to the id, which grows with insertion, so the
/// later-added task is shown first.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewestFirst;

impl TaskComparator for NewestFirst {
    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    }
}

impl<F> TaskComparator for F
where
    F: Fn(&Task, &Task) -> Ordering,
{
    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        self(a, b)
    }
}
