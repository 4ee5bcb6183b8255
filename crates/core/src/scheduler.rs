//! One-shot tick scheduling
//!
//! A running task always has exactly one armed tick. Schedulers deliver a
//! `TickTicket` once its delay elapses; the receiver hands it back to the
//! manager, which drops it if the task stopped or disappeared meanwhile.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::models::TaskId;

/// Identifies one armed tick of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickTicket {
    pub task: TaskId,
    pub epoch: u64,
}

/// Delayed one-shot delivery with cancellation by task id
pub trait TickScheduler {
    /// Arm a tick. Replaces any tick already armed for the same task.
    fn schedule(&mut self, ticket: TickTicket, delay: Duration);

    /// Disarm the tick for `task`, if any
    fn cancel(&mut self, task: TaskId);

    /// Number of ticks still waiting to fire
    fn pending(&self) -> usize;
}

/// Scheduler backed by tokio timers.
///
/// Each armed tick is a spawned sleep that sends its ticket on an unbounded
/// channel. The owner loop receives from that channel and feeds tickets to
/// `TaskManager::handle_tick`. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<TickTicket>,
    armed: HashMap<TaskId, AbortHandle>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiving end of its tick channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickTicket>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                armed: HashMap::new(),
            },
            receiver,
        )
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, ticket: TickTicket, delay: Duration) {
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the owner loop has shut down
            let _ = sender.send(ticket);
        })
        .abort_handle();

        trace!("Armed tick for task {} in {:?}", ticket.task, delay);
        if let Some(previous) = self.armed.insert(ticket.task, handle) {
            previous.abort();
        }
    }

    fn cancel(&mut self, task: TaskId) {
        if let Some(handle) = self.armed.remove(&task) {
            trace!("Cancelled tick for task {}", task);
            handle.abort();
        }
    }

    fn pending(&self) -> usize {
        self.armed.values().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.armed.drain() {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTick {
    due: Duration,
    seq: u64,
    ticket: TickTicket,
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Nothing fires on its own; `fire_next` pops the earliest tick (ties go to
/// the one scheduled first) and moves the clock to its due time.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    seq: u64,
    queue: Vec<PendingTick>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Whether a tick is armed for `task`
    pub fn is_armed(&self, task: TaskId) -> bool {
        self.queue.iter().any(|p| p.ticket.task == task)
    }

    /// Pop the earliest due tick and advance the clock to it
    pub fn fire_next(&mut self) -> Option<TickTicket> {
        let index = self
            .queue
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;
        let pending = self.queue.swap_remove(index);
        self.now = pending.due;
        Some(pending.ticket)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, ticket: TickTicket, delay: Duration) {
        self.cancel(ticket.task);
        self.seq += 1;
        self.queue.push(PendingTick {
            due: self.now + delay,
            seq: self.seq,
            ticket,
        });
    }

    fn cancel(&mut self, task: TaskId) {
        self.queue.retain(|p| p.ticket.task != task);
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
