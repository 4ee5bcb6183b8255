//! End-to-end tests with real tokio timers on a paused clock

use std::time::Duration;

use tasklist_core::{FilterKind, SimulationConfig, TaskManager, TaskState, TickOutcome};

#[tokio::test(start_paused = true)]
async fn test_task_runs_to_done_on_tokio_timers() {
    let (mut manager, mut ticks) =
        TaskManager::with_tokio(SimulationConfig::new().with_seed(11)).unwrap();
    let id = manager.add_task("Laundry").unwrap();
    manager.start(id);

    let mut last = 0;
    while let Some(ticket) = ticks.recv().await {
        let outcome = manager.handle_tick(ticket);
        let progress = manager.task(id).unwrap().progress();
        assert!(progress >= last);
        last = progress;
        if outcome == TickOutcome::Finished {
            break;
        }
    }

    let task = manager.task(id).unwrap();
    assert_eq!(task.progress(), 100);
    assert_eq!(task.state(), TaskState::Done);
    assert!(manager.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_stop_silences_timer() {
    let (mut manager, mut ticks) =
        TaskManager::with_tokio(SimulationConfig::new().with_seed(12)).unwrap();
    let id = manager.add_task("a").unwrap();
    manager.start(id);

    let ticket = ticks.recv().await.unwrap();
    manager.handle_tick(ticket);
    let frozen = manager.task(id).unwrap().progress();
    manager.stop(id);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(ticks.try_recv().is_err());
    assert_eq!(manager.task(id).unwrap().progress(), frozen);
}

#[tokio::test(start_paused = true)]
async fn test_removed_task_timer_never_fires() {
    let (mut manager, mut ticks) =
        TaskManager::with_tokio(SimulationConfig::new().with_seed(13)).unwrap();
    let doomed = manager.add_task("doomed").unwrap();
    let other = manager.add_task("other").unwrap();
    manager.start(doomed);
    manager.remove_task(doomed);
    manager.start(other);

    let ticket = tokio::time::timeout(Duration::from_secs(2), ticks.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.task, other);
}

#[tokio::test(start_paused = true)]
async fn test_ticket_in_flight_before_stop_is_dropped() {
    let (mut manager, mut ticks) =
        TaskManager::with_tokio(SimulationConfig::new().with_seed(14)).unwrap();
    let id = manager.add_task("a").unwrap();
    manager.start(id);
    manager.set_filter(FilterKind::Active);

    // The timer has already fired when the stop arrives
    let ticket = ticks.recv().await.unwrap();
    manager.stop(id);
    manager.take_events();

    assert_eq!(manager.handle_tick(ticket), TickOutcome::Stale);
    assert!(manager.take_events().is_empty());
    assert_eq!(manager.len(), 0);
}
