//! Filtered, sorted projection of the task collection
//!
//! The view stores task ids only. It is patched from `CollectionEvent`s so
//! that after every mutation its rows equal
//! `sort(filter(collection, predicate), comparator)`.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::collection::TaskCollection;
use crate::error::{TaskError, TaskResult};
use crate::events::{CollectionEvent, ViewEvent};
use crate::filter::{FilterKind, NewestFirst, TaskComparator, TaskPredicate};
use crate::models::{Task, TaskId};

/// Derived read view over a `TaskCollection`
pub struct FilteredSortedView {
    /// Set while membership comes from one of the built-in filters
    filter: Option<FilterKind>,
    predicate: Box<dyn TaskPredicate + Send>,
    comparator: Box<dyn TaskComparator + Send>,
    rows: Vec<TaskId>,
}

impl std::fmt::Debug for FilteredSortedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredSortedView")
            .field("filter", &self.filter)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

impl FilteredSortedView {
    /// Build a newest-first view over `collection`
    pub fn new(filter: FilterKind, collection: &TaskCollection) -> Self {
        Self::with_comparator(filter, NewestFirst, collection)
    }

    /// Build a view with a custom row order
    pub fn with_comparator<C>(
        filter: FilterKind,
        comparator: C,
        collection: &TaskCollection,
    ) -> Self
    where
        C: TaskComparator + Send + 'static,
    {
        let mut view = Self::with_strategies(filter, comparator, collection);
        view.filter = Some(filter);
        view
    }

    /// Build a view with custom membership and row order
    pub fn with_strategies<P, C>(predicate: P, comparator: C, collection: &TaskCollection) -> Self
    where
        P: TaskPredicate + Send + 'static,
        C: TaskComparator + Send + 'static,
    {
        let mut view = Self {
            filter: None,
            predicate: Box::new(predicate),
            comparator: Box::new(comparator),
            rows: Vec::new(),
        };
        view.rebuild(collection);
        view
    }

    /// The built-in filter in use, or `None` for a custom predicate
    pub fn filter(&self) -> Option<FilterKind> {
        self.filter
    }

    /// Number of rows currently shown
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Task ids in row order
    pub fn ids(&self) -> &[TaskId] {
        &self.rows
    }

    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.rows.iter().position(|row| *row == id)
    }

    /// Resolve a row to its task id.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::OutOfRange` if `index >= len()`.
    pub fn position_to_task_id(&self, index: usize) -> TaskResult<TaskId> {
        self.rows
            .get(index)
            .copied()
            .ok_or(TaskError::OutOfRange {
                index,
                len: self.rows.len(),
            })
    }

    /// Tasks in row order
    pub fn tasks<'a>(&'a self, collection: &'a TaskCollection) -> impl Iterator<Item = &'a Task> {
        self.rows.iter().filter_map(|id| collection.get(*id))
    }

    /// Replace the filter and patch membership.
    ///
    /// Setting the current filter again does nothing and reports nothing.
    pub fn set_filter(
        &mut self,
        filter: FilterKind,
        collection: &TaskCollection,
    ) -> Vec<ViewEvent> {
        if self.filter == Some(filter) {
            return Vec::new();
        }

        debug!("Switching view filter to {}", filter);
        let events = self.set_predicate(filter, collection);
        self.filter = Some(filter);
        events
    }

    /// Install a custom membership predicate and patch membership.
    ///
    /// Rows that no longer match are removed back to front, then newly
    /// matching tasks are inserted in order.
    pub fn set_predicate<P>(&mut self, predicate: P, collection: &TaskCollection) -> Vec<ViewEvent>
    where
        P: TaskPredicate + Send + 'static,
    {
        self.filter = None;
        self.predicate = Box::new(predicate);

        let mut events = Vec::new();
        for position in (0..self.rows.len()).rev() {
            let id = self.rows[position];
            let keep = collection.get(id).is_some_and(|t| self.predicate.accepts(t));
            if !keep {
                self.rows.remove(position);
                events.push(ViewEvent::RowRemoved { position, id });
            }
        }

        let shown: HashSet<TaskId> = self.rows.iter().copied().collect();
        for task in collection.iter() {
            if self.predicate.accepts(task) && !shown.contains(&task.id()) {
                let position = self.insert(task, collection);
                events.push(ViewEvent::RowInserted {
                    position,
                    id: task.id(),
                });
            }
        }

        events
    }

    /// Patch the view after a collection mutation, appending row events
    pub fn apply(
        &mut self,
        event: &CollectionEvent,
        collection: &TaskCollection,
        events: &mut Vec<ViewEvent>,
    ) {
        match *event {
            CollectionEvent::Inserted { id, .. } => {
                if let Some(task) = collection.get(id)
                    && self.predicate.accepts(task)
                    && self.position_of(id).is_none()
                {
                    let position = self.insert(task, collection);
                    events.push(ViewEvent::RowInserted { position, id });
                }
            }
            CollectionEvent::Removed { id, .. } => {
                if let Some(position) = self.position_of(id) {
                    self.rows.remove(position);
                    events.push(ViewEvent::RowRemoved { position, id });
                }
            }
            CollectionEvent::Changed { id, kind, .. } => {
                let shown = self.position_of(id);
                let task = collection.get(id);
                let accepted = task.is_some_and(|t| self.predicate.accepts(t));

                match (task, shown) {
                    (Some(task), Some(position)) if accepted => {
                        if self.in_order_at(position, collection) {
                            events.push(ViewEvent::RowChanged { position, id, kind });
                        } else {
                            self.rows.remove(position);
                            events.push(ViewEvent::RowRemoved { position, id });
                            let position = self.insert(task, collection);
                            events.push(ViewEvent::RowInserted { position, id });
                        }
                    }
                    (Some(task), None) if accepted => {
                        let position = self.insert(task, collection);
                        events.push(ViewEvent::RowInserted { position, id });
                    }
                    (_, Some(position)) => {
                        self.rows.remove(position);
                        events.push(ViewEvent::RowRemoved { position, id });
                    }
                    (_, None) => {}
                }
            }
        }
    }

    /// Recompute every row from scratch
    pub fn rebuild(&mut self, collection: &TaskCollection) {
        self.rows = self.expected_rows(collection);
    }

    /// Whether the rows equal a fresh filter + sort over `collection`
    pub fn is_consistent_with(&self, collection: &TaskCollection) -> bool {
        self.rows == self.expected_rows(collection)
    }

    fn expected_rows(&self, collection: &TaskCollection) -> Vec<TaskId> {
        let mut tasks: Vec<&Task> = collection
            .iter()
            .filter(|t| self.predicate.accepts(t))
            .collect();
        tasks.sort_by(|a, b| self.comparator.compare(a, b));
        tasks.iter().map(|t| t.id()).collect()
    }

    fn insert(&mut self, task: &Task, collection: &TaskCollection) -> usize {
        let position = self.insertion_point(task, collection);
        self.rows.insert(position, task.id());
        position
    }

    fn insertion_point(&self, task: &Task, collection: &TaskCollection) -> usize {
        self.rows.partition_point(|row| match collection.get(*row) {
            Some(other) => self.comparator.compare(other, task) != Ordering::Greater,
            None => true,
        })
    }

    fn in_order_at(&self, position: usize, collection: &TaskCollection) -> bool {
        let Some(task) = collection.get(self.rows[position]) else {
            return false;
        };
        let before = position
            .checked_sub(1)
            .and_then(|p| collection.get(self.rows[p]));
        let after = self.rows.get(position + 1).and_then(|id| collection.get(*id));

        before.is_none_or(|b| self.comparator.compare(b, task) != Ordering::Greater)
            && after.is_none_or(|a| self.comparator.compare(task, a) != Ordering::Greater)
    }
}
