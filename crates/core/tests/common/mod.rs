//! Shared helpers for core integration tests

use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, TimeZone};
use tasklist_core::{FilterKind, ManualScheduler, TaskId, TaskManager, TaskPredicate, TickScheduler};

/// Fixed base instant so test timestamps are reproducible
pub fn base_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// Timestamp `seconds` after `base_time`
pub fn at(seconds: i64) -> DateTime<Local> {
    base_time() + Duration::seconds(seconds)
}

/// Seeded manager with a manual scheduler
pub fn seeded_manager(seed: u64) -> TaskManager<ManualScheduler> {
    TaskManager::manual(tasklist_core::SimulationConfig::new().with_seed(seed)).unwrap()
}

/// Ids the view should show: filter then newest-first, later insertion on ties
#[allow(dead_code)]
pub fn expected_view(manager: &TaskManager<ManualScheduler>) -> Vec<TaskId> {
    let filter: FilterKind = manager.filter();
    let mut tasks: Vec<_> = manager
        .collection()
        .iter()
        .filter(|t| filter.accepts(t))
        .collect();
    tasks.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
    tasks.iter().map(|t| t.id()).collect()
}

/// Check every data-model invariant, panicking with context on failure
#[allow(dead_code)]
pub fn assert_invariants(manager: &TaskManager<ManualScheduler>) {
    assert_eq!(
        manager.view().ids(),
        expected_view(manager).as_slice(),
        "view diverged from filter+sort of the collection"
    );

    let mut names = HashSet::new();
    for task in manager.collection().iter() {
        assert!(task.progress() <= 100, "progress above 100 for {}", task.id());
        if task.is_running() {
            assert!(task.progress() < 100, "running task {} at 100", task.id());
            assert!(
                manager.scheduler().is_armed(task.id()),
                "running task {} has no armed tick",
                task.id()
            );
        }
        assert!(
            names.insert(task.name().to_lowercase()),
            "duplicate name {}",
            task.name()
        );
    }

    assert_eq!(
        manager.scheduler().pending(),
        manager.running_count(),
        "armed ticks must match running tasks one to one"
    );
}
