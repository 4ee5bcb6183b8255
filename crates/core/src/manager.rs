//! Command boundary for the presentation layer
//!
//! `TaskManager` owns the collection, the view and the tick scheduler.
//! Every command mutates the collection, immediately patches the view, and
//! queues the resulting `ViewEvent`s, so callers never observe a stale view.

use std::time::Duration;

use chrono::{DateTime, Local};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::collection::TaskCollection;
use crate::config::SimulationConfig;
use crate::error::{TaskError, TaskResult};
use crate::events::ViewEvent;
use crate::filter::FilterKind;
use crate::models::{Task, TaskId, TaskRow, TaskState, TickOutcome};
use crate::scheduler::{ManualScheduler, TickScheduler, TickTicket, TokioScheduler};
use crate::view::FilteredSortedView;

/// Explicitly owned task list state
#[derive(Debug)]
pub struct TaskManager<S: TickScheduler> {
    collection: TaskCollection,
    view: FilteredSortedView,
    scheduler: S,
    config: SimulationConfig,
    rng: StdRng,
    events: Vec<ViewEvent>,
}

impl<S: TickScheduler> TaskManager<S> {
    /// Create an empty task list showing all tasks.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::InvalidConfig` if `config` fails validation.
    pub fn new(config: SimulationConfig, scheduler: S) -> TaskResult<Self> {
        config.validate()?;
        let collection = TaskCollection::new();
        let view = FilteredSortedView::new(FilterKind::All, &collection);
        let rng = config.rng();

        Ok(Self {
            collection,
            view,
            scheduler,
            config,
            rng,
            events: Vec::new(),
        })
    }

    /// Add a task created now.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyName` for a blank name or
    /// `TaskError::DuplicateName` for a case-insensitive collision.
    pub fn add_task(&mut self, name: &str) -> TaskResult<TaskId> {
        self.add_task_at(name, Local::now())
    }

    /// Add a task with an explicit creation time
    pub fn add_task_at(&mut self, name: &str, created_at: DateTime<Local>) -> TaskResult<TaskId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskError::EmptyName);
        }
        let id = self.collection.add(name, created_at)?;
        self.sync();
        Ok(id)
    }

    /// Case-insensitive check used to pre-validate names
    pub fn has_task_named(&self, name: &str) -> bool {
        self.collection.has_name(name)
    }

    /// Remove a task and disarm its tick. Unknown ids are ignored.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        self.scheduler.cancel(id);
        let removed = self.collection.remove(id).is_some();
        self.sync();
        removed
    }

    /// Remove every selected task, returning how many were removed
    pub fn remove_selected(&mut self) -> usize {
        let removed = self.collection.remove_where(|t| t.is_selected());
        for task in &removed {
            self.scheduler.cancel(task.id());
        }
        debug!("Removed {} selected tasks", removed.len());
        self.sync();
        removed.len()
    }

    /// Number of tasks with the selection flag set
    pub fn selected_count(&self) -> usize {
        self.collection.iter().filter(|t| t.is_selected()).count()
    }

    /// Whether deleting the selection would discard running work
    pub fn selection_has_running(&self) -> bool {
        self.collection
            .iter()
            .any(|t| t.is_selected() && t.is_running())
    }

    /// Start a task; no-op when unknown, running or done
    pub fn start(&mut self, id: TaskId) -> bool {
        let Some(ticket) = self.collection.start(id) else {
            return false;
        };
        let delay = self.draw_delay();
        self.scheduler.schedule(ticket, delay);
        self.sync();
        true
    }

    /// Stop a task and disarm its tick; no-op when unknown or idle
    pub fn stop(&mut self, id: TaskId) -> bool {
        if !self.collection.stop(id) {
            return false;
        }
        self.scheduler.cancel(id);
        self.sync();
        true
    }

    /// Start an idle task or stop a running one, returning the new state.
    ///
    /// Done tasks stay done.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UnknownId` if the task no longer exists.
    pub fn toggle_start_stop(&mut self, id: TaskId) -> TaskResult<TaskState> {
        let state = self.task_or_err(id)?.state();
        match state {
            TaskState::Running => {
                self.stop(id);
            }
            TaskState::Idle => {
                self.start(id);
            }
            TaskState::Done => {}
        }
        Ok(self.task_or_err(id)?.state())
    }

    /// Flip the selection flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UnknownId` if the task no longer exists.
    pub fn toggle_selected(&mut self, id: TaskId) -> TaskResult<bool> {
        let selected = !self.task_or_err(id)?.is_selected();
        self.collection.set_selected(id, selected);
        self.sync();
        Ok(selected)
    }

    /// Change the view filter; setting the current filter is a no-op
    pub fn set_filter(&mut self, filter: FilterKind) {
        let events = self.view.set_filter(filter, &self.collection);
        self.events.extend(events);
    }

    pub fn filter(&self) -> FilterKind {
        // The manager only ever installs built-in filters
        self.view.filter().unwrap_or_default()
    }

    /// Deliver a fired tick.
    ///
    /// Tickets for stopped or removed tasks are dropped without touching the
    /// RNG. Otherwise progress advances by a random increment and the next
    /// tick is armed, or the task finishes.
    pub fn handle_tick(&mut self, ticket: TickTicket) -> TickOutcome {
        let rng = &mut self.rng;
        let increment = self.config.increment.clone();
        let outcome = self
            .collection
            .apply_tick(ticket, || rng.random_range(increment));
        match outcome {
            TickOutcome::Stale => {}
            TickOutcome::Advanced { next, .. } => {
                let delay = self.draw_delay();
                self.scheduler.schedule(next, delay);
            }
            TickOutcome::Finished => {
                self.scheduler.cancel(ticket.task);
            }
        }
        self.sync();
        outcome
    }

    /// Number of rows in the view
    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Resolve a view row to its task id.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::OutOfRange` if `position` is not a row.
    pub fn position_to_task_id(&self, position: usize) -> TaskResult<TaskId> {
        self.view.position_to_task_id(position)
    }

    /// Snapshot of the task shown at `position`
    pub fn row(&self, position: usize) -> TaskResult<TaskRow> {
        let id = self.view.position_to_task_id(position)?;
        self.task_or_err(id).map(TaskRow::from)
    }

    /// Snapshots of every row in view order
    pub fn rows(&self) -> impl Iterator<Item = TaskRow> + '_ {
        self.view.tasks(&self.collection).map(TaskRow::from)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.collection.get(id)
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    pub fn view(&self) -> &FilteredSortedView {
        &self.view
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Take the row notifications queued since the last call
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of running tasks across the whole collection
    pub fn running_count(&self) -> usize {
        self.collection.iter().filter(|t| t.is_running()).count()
    }

    /// True when no task is running
    pub fn is_idle(&self) -> bool {
        self.running_count() == 0
    }

    fn task_or_err(&self, id: TaskId) -> TaskResult<&Task> {
        self.collection.get(id).ok_or(TaskError::UnknownId { id })
    }

    fn draw_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.random_range(self.config.delay_ms.clone()))
    }

    fn sync(&mut self) {
        for event in self.collection.drain_events() {
            trace!("Applying {:?} to view", event);
            self.view.apply(&event, &self.collection, &mut self.events);
        }
        debug_assert!(self.view.is_consistent_with(&self.collection));
    }
}

impl TaskManager<TokioScheduler> {
    /// Create a manager driven by tokio timers.
    ///
    /// Fired tickets arrive on the returned receiver and must be passed to
    /// `handle_tick` by the owning loop.
    pub fn with_tokio(
        config: SimulationConfig,
    ) -> TaskResult<(Self, tokio::sync::mpsc::UnboundedReceiver<TickTicket>)> {
        let (scheduler, receiver) = TokioScheduler::new();
        Ok((Self::new(config, scheduler)?, receiver))
    }
}

impl TaskManager<ManualScheduler> {
    /// Create a manager whose ticks only fire through `advance`
    pub fn manual(config: SimulationConfig) -> TaskResult<Self> {
        Self::new(config, ManualScheduler::new())
    }

    /// Fire the earliest pending tick, if any
    pub fn advance(&mut self) -> Option<TickOutcome> {
        let ticket = self.scheduler.fire_next()?;
        Some(self.handle_tick(ticket))
    }

    /// Fire ticks until nothing is armed or `max_ticks` is reached.
    ///
    /// Returns the number of ticks fired.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> usize {
        let mut fired = 0;
        while fired < max_ticks && self.advance().is_some() {
            fired += 1;
        }
        fired
    }
}

static_assertions::assert_impl_all!(TaskManager<TokioScheduler>: Send);
static_assertions::assert_impl_all!(TaskManager<ManualScheduler>: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChangeKind;
    use chrono::Duration as ChronoDuration;

    fn manager() -> TaskManager<ManualScheduler> {
        TaskManager::manual(SimulationConfig::new().with_seed(7)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = TaskManager::manual(SimulationConfig::new().with_delay_ms(10, 10));
        assert!(matches!(result, Err(TaskError::InvalidConfig { .. })));
    }

    #[test]
    fn test_stale_tickets_keep_seeded_runs_identical() {
        let config = SimulationConfig::new().with_seed(21);
        let mut quiet = TaskManager::manual(config.clone()).unwrap();
        let mut noisy = TaskManager::manual(config).unwrap();
        let id = quiet.add_task("a").unwrap();
        noisy.add_task("a").unwrap();
        quiet.start(id);
        noisy.start(id);

        let unknown = TickTicket {
            task: TaskId::new(99),
            epoch: 1,
        };
        let outdated = TickTicket {
            task: id,
            epoch: u64::MAX,
        };
        while quiet.advance().is_some() {
            assert_eq!(noisy.handle_tick(unknown), TickOutcome::Stale);
            assert_eq!(noisy.handle_tick(outdated), TickOutcome::Stale);
            assert!(noisy.advance().is_some());

            assert_eq!(
                quiet.task(id).unwrap().progress(),
                noisy.task(id).unwrap().progress()
            );
            assert_eq!(quiet.scheduler().now(), noisy.scheduler().now());
        }
        assert!(noisy.is_idle());
    }

    #[test]
    fn test_add_task_rejects_blank() {
        let mut m = manager();
        assert_eq!(m.add_task(" \t ").unwrap_err(), TaskError::EmptyName);
        assert!(m.is_empty());
    }

    #[test]
    fn test_add_duplicate_keeps_single_task() {
        let mut m = manager();
        m.add_task("Laundry").unwrap();
        let err = m.add_task("laundry").unwrap_err();
        assert!(matches!(err, TaskError::DuplicateName { .. }));
        assert_eq!(m.collection().len(), 1);
        assert!(m.has_task_named("LAUNDRY"));
    }

    #[test]
    fn test_fresh_task_filter_membership() {
        let mut m = manager();
        m.add_task("fresh").unwrap();
        let row = m.row(0).unwrap();
        assert_eq!(row.progress, 0);
        assert!(!row.running);

        m.set_filter(FilterKind::Active);
        assert_eq!(m.len(), 0);
        m.set_filter(FilterKind::Inactive);
        assert_eq!(m.len(), 1);
        m.set_filter(FilterKind::All);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_start_arms_exactly_one_tick() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        assert!(m.start(id));
        assert!(!m.start(id));
        assert_eq!(m.scheduler().pending(), 1);
        assert!(m.scheduler().is_armed(id));
    }

    #[test]
    fn test_first_delay_within_range() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);
        m.advance().unwrap();
        let elapsed = m.scheduler().now();
        assert!(elapsed >= Duration::from_millis(50) && elapsed < Duration::from_millis(1000));
    }

    #[test]
    fn test_run_to_completion() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);

        let mut last = 0;
        while let Some(outcome) = m.advance() {
            let progress = m.task(id).unwrap().progress();
            assert!(progress >= last && progress <= 100);
            assert!(progress - last <= 3);
            last = progress;
            if outcome == TickOutcome::Finished {
                break;
            }
        }

        let task = m.task(id).unwrap();
        assert_eq!(task.progress(), 100);
        assert!(!task.is_running());
        assert_eq!(m.scheduler().pending(), 0);
        assert!(m.is_idle());
    }

    #[test]
    fn test_stop_freezes_progress() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);
        m.advance();
        m.advance();
        let frozen = m.task(id).unwrap().progress();

        assert!(m.stop(id));
        assert!(!m.task(id).unwrap().is_running());
        assert_eq!(m.run_until_idle(100), 0);
        assert_eq!(m.task(id).unwrap().progress(), frozen);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);
        // Grab the ticket as if it had already been sent before the stop
        let ticket = TickTicket { task: id, epoch: 1 };
        m.stop(id);
        m.take_events();

        assert_eq!(m.handle_tick(ticket), TickOutcome::Stale);
        assert!(m.take_events().is_empty());
        assert_eq!(m.task(id).unwrap().progress(), 0);
    }

    #[test]
    fn test_remove_running_task_cancels_tick() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);
        m.advance();
        assert!(m.remove_task(id));
        m.take_events();

        assert_eq!(m.scheduler().pending(), 0);
        assert_eq!(m.handle_tick(TickTicket { task: id, epoch: 2 }), TickOutcome::Stale);
        assert!(m.take_events().iter().all(|e| e.task_id() != id));
    }

    #[test]
    fn test_remove_unknown_is_silent() {
        let mut m = manager();
        assert!(!m.remove_task(TaskId::new(42)));
        assert!(!m.stop(TaskId::new(42)));
    }

    #[test]
    fn test_toggle_start_stop() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        assert_eq!(m.toggle_start_stop(id).unwrap(), TaskState::Running);
        assert_eq!(m.toggle_start_stop(id).unwrap(), TaskState::Idle);
        assert_eq!(
            m.toggle_start_stop(TaskId::new(99)),
            Err(TaskError::UnknownId { id: TaskId::new(99) })
        );
    }

    #[test]
    fn test_toggle_done_task_stays_done() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);
        m.run_until_idle(1000);
        assert_eq!(m.toggle_start_stop(id).unwrap(), TaskState::Done);
        assert_eq!(m.scheduler().pending(), 0);
    }

    #[test]
    fn test_remove_selected() {
        let mut m = manager();
        let a = m.add_task("a").unwrap();
        let b = m.add_task("b").unwrap();
        m.add_task("c").unwrap();
        m.start(b);

        m.toggle_selected(a).unwrap();
        m.toggle_selected(b).unwrap();
        assert_eq!(m.selected_count(), 2);
        assert!(m.selection_has_running());

        assert_eq!(m.remove_selected(), 2);
        assert_eq!(m.collection().len(), 1);
        assert_eq!(m.scheduler().pending(), 0);
        assert_eq!(m.rows().next().unwrap().name, "c");
    }

    #[test]
    fn test_toggle_selected_reports_row_change() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.take_events();
        assert!(m.toggle_selected(id).unwrap());
        assert_eq!(
            m.take_events(),
            vec![ViewEvent::RowChanged {
                position: 0,
                id,
                kind: ChangeKind::Selection
            }]
        );
        assert!(!m.toggle_selected(id).unwrap());
    }

    #[test]
    fn test_rows_newest_first() {
        let mut m = manager();
        let now = Local::now();
        m.add_task_at("old", now - ChronoDuration::minutes(5)).unwrap();
        m.add_task_at("new", now).unwrap();
        m.add_task_at("mid", now - ChronoDuration::minutes(1)).unwrap();

        let names: Vec<String> = m.rows().map(|r| r.name).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
        assert!(m.row(3).is_err());
    }

    #[test]
    fn test_active_inactive_all_views() {
        let mut m = manager();
        let now = Local::now();
        let a = m.add_task_at("A", now - ChronoDuration::seconds(1)).unwrap();
        let b = m.add_task_at("B", now).unwrap();
        m.start(a);

        m.set_filter(FilterKind::Active);
        assert_eq!(m.view().ids(), &[a]);
        m.set_filter(FilterKind::Inactive);
        assert_eq!(m.view().ids(), &[b]);
        m.set_filter(FilterKind::All);
        assert_eq!(m.view().ids(), &[b, a]);
    }

    #[test]
    fn test_finish_drops_task_from_active_view() {
        let mut m = manager();
        let id = m.add_task("a").unwrap();
        m.start(id);
        m.set_filter(FilterKind::Active);
        assert_eq!(m.len(), 1);
        m.take_events();

        m.run_until_idle(1000);
        assert_eq!(m.len(), 0);
        let events = m.take_events();
        assert!(matches!(
            events.last(),
            Some(ViewEvent::RowRemoved { position: 0, .. })
        ));
    }
}
