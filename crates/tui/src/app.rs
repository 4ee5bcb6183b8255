//! Main application state and event loop.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use tasklist_core::{
    FilterKind, SimulationConfig, TaskError, TaskManager, TickTicket, TokioScheduler, ViewEvent,
};

use crate::error::TuiResult;
use crate::event::{
    confirmation, is_backspace, is_delete, is_down, is_enter, is_quit, is_space, is_start_stop,
    is_tab, is_up, poll_key, typed_char,
};
use crate::ui;

/// How long the loop waits for a tick before checking the keyboard again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What keystrokes currently mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Typing edits the name input; chords run commands.
    #[default]
    Editing,
    /// Waiting for y/n before deleting a selection with running tasks.
    ConfirmDelete,
}

/// One-line feedback shown under the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Info(text) | StatusMessage::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::Error(_))
    }
}

/// Main application state.
pub struct App {
    /// Task list state and commands.
    manager: TaskManager<TokioScheduler>,
    /// Fired ticks waiting to be delivered.
    ticks: UnboundedReceiver<TickTicket>,
    /// Name being typed for the next task.
    input: String,
    /// View row under the cursor.
    cursor: usize,
    /// Row count as last seen through view notifications.
    rows_seen: usize,
    mode: Mode,
    status: Option<StatusMessage>,
    /// Whether the application is still running.
    running: bool,
}

impl App {
    /// Create a new App with an empty task list.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Task` if the simulation config is invalid.
    pub fn new(config: SimulationConfig) -> TuiResult<Self> {
        let (manager, ticks) = TaskManager::with_tokio(config)?;
        Ok(Self {
            manager,
            ticks,
            input: String::new(),
            cursor: 0,
            rows_seen: 0,
            mode: Mode::default(),
            status: None,
            running: true,
        })
    }

    pub fn manager(&self) -> &TaskManager<TokioScheduler> {
        &self.manager
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Get the view row under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn filter(&self) -> FilterKind {
        self.manager.filter()
    }

    /// Check if the application is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Add a task named after the input line.
    ///
    /// On success the input is cleared; on failure it is kept so the user
    /// can fix it.
    pub fn submit_input(&mut self) {
        match self.manager.add_task(&self.input) {
            Ok(id) => {
                debug!("Added task {} from input", id);
                self.input.clear();
                self.status = None;
            }
            Err(TaskError::EmptyName) => {
                self.status = Some(StatusMessage::Error("Enter a task name!".to_string()));
            }
            Err(TaskError::DuplicateName { .. }) => {
                self.status = Some(StatusMessage::Error(
                    "A task with this name already exists!".to_string(),
                ));
            }
            Err(e) => {
                warn!("Unexpected error adding task: {}", e);
                self.status = Some(StatusMessage::Error(e.to_string()));
            }
        }
        self.follow_view_events();
    }

    /// Start or stop the task under the cursor.
    pub fn toggle_start_stop(&mut self) {
        let Ok(id) = self.manager.position_to_task_id(self.cursor) else {
            return;
        };
        if let Err(e) = self.manager.toggle_start_stop(id) {
            self.status = Some(StatusMessage::Error(e.to_string()));
        }
        self.follow_view_events();
    }

    /// Flip the selection box of the task under the cursor.
    pub fn toggle_selected(&mut self) {
        let Ok(id) = self.manager.position_to_task_id(self.cursor) else {
            return;
        };
        if let Err(e) = self.manager.toggle_selected(id) {
            self.status = Some(StatusMessage::Error(e.to_string()));
        }
        self.follow_view_events();
    }

    /// Delete the selection, asking first if it holds running tasks.
    pub fn request_delete(&mut self) {
        if self.manager.selected_count() == 0 {
            self.status = Some(StatusMessage::Info("No tasks selected".to_string()));
            return;
        }
        if self.manager.selection_has_running() {
            self.mode = Mode::ConfirmDelete;
            self.status = Some(StatusMessage::Info(
                "Delete running tasks? [y/n]".to_string(),
            ));
            return;
        }
        self.delete_selected();
    }

    /// Resolve a pending delete confirmation.
    pub fn confirm_delete(&mut self, confirmed: bool) {
        self.mode = Mode::Editing;
        if confirmed {
            self.delete_selected();
        } else {
            self.status = None;
        }
    }

    fn delete_selected(&mut self) {
        let removed = self.manager.remove_selected();
        self.status = Some(StatusMessage::Info(format!("Deleted {} task(s)", removed)));
        self.follow_view_events();
    }

    /// Switch to the next filter (All -> Active -> Inactive).
    pub fn cycle_filter(&mut self) {
        self.manager.set_filter(self.manager.filter().next());
        self.follow_view_events();
    }

    /// Move the cursor down, clamping at the last row.
    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.manager.len() {
            self.cursor += 1;
        }
    }

    /// Move the cursor up, clamping at the first row.
    pub fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Deliver a fired tick to the task list.
    pub fn deliver_tick(&mut self, ticket: TickTicket) {
        self.manager.handle_tick(ticket);
        self.follow_view_events();
    }

    /// Keep the cursor on the same row while rows appear and disappear.
    fn follow_view_events(&mut self) {
        for event in self.manager.take_events() {
            let position = event.position();
            match event {
                ViewEvent::RowInserted { .. } => {
                    if self.rows_seen > 0 && position <= self.cursor {
                        self.cursor += 1;
                    }
                    self.rows_seen += 1;
                }
                ViewEvent::RowRemoved { .. } => {
                    if position < self.cursor {
                        self.cursor -= 1;
                    }
                    self.rows_seen = self.rows_seen.saturating_sub(1);
                }
                ViewEvent::RowChanged { .. } => {}
            }
        }
        self.cursor = self.cursor.min(self.manager.len().saturating_sub(1));
    }

    /// Run the main application loop.
    ///
    /// This initializes the terminal, runs the event loop, and ensures
    /// the terminal is restored on exit (even on panic).
    pub async fn run(&mut self) -> TuiResult<()> {
        let mut terminal = init_terminal()?;

        // The guard runs restore_terminal() even if we panic
        let _guard = scopeguard::guard((), |()| {
            let _ = restore_terminal();
        });

        let result = self.event_loop(&mut terminal).await;

        drop(_guard);

        result
    }

    /// The main event loop.
    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> TuiResult<()> {
        while self.running {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let fired = tokio::select! {
                ticket = self.ticks.recv() => ticket,
                _ = tokio::time::sleep(POLL_INTERVAL) => None,
            };
            if let Some(ticket) = fired {
                self.deliver_tick(ticket);
            }
            while let Ok(ticket) = self.ticks.try_recv() {
                self.deliver_tick(ticket);
            }

            while let Some(key) = poll_key(Duration::ZERO)? {
                self.handle_key(&key);
            }
        }
        Ok(())
    }

    /// Handle a keyboard event.
    pub fn handle_key(&mut self, key: &crossterm::event::KeyEvent) {
        if is_quit(key) && self.mode == Mode::Editing {
            self.quit();
            return;
        }

        match self.mode {
            Mode::ConfirmDelete => {
                if let Some(confirmed) = confirmation(key) {
                    self.confirm_delete(confirmed);
                }
            }
            Mode::Editing => {
                if is_tab(key) {
                    self.cycle_filter();
                } else if is_enter(key) {
                    self.submit_input();
                } else if is_down(key) {
                    self.select_next();
                } else if is_up(key) {
                    self.select_previous();
                } else if is_start_stop(key) {
                    self.toggle_start_stop();
                } else if is_delete(key) {
                    self.request_delete();
                } else if is_backspace(key) {
                    self.input.pop();
                } else if is_space(key) && self.input.is_empty() {
                    // A leading space would be trimmed anyway
                    self.toggle_selected();
                } else if let Some(c) = typed_char(key) {
                    self.input.push(c);
                }
            }
        }
    }
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> TuiResult<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> TuiResult<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
