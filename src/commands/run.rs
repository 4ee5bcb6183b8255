//! Headless run command
//!
//! Implements `tasklist run` to start a batch of tasks without a terminal UI
//! and report their progress line by line until every task is done.

use std::io::Write;

use clap::Args;
use tasklist_core::{
    ChangeKind, SimulationConfig, TaskId, TaskManager, TaskRow, ViewEvent,
};
use tracing::debug;

use crate::error::CliResult;

/// Start tasks and print their progress until all are done
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Names of the tasks to run (case-insensitive, must be unique)
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Print each progress change as a JSON row
    #[arg(long)]
    pub json: bool,
}

/// Result of the run command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of tasks that ran to completion
    pub tasks: usize,
    /// Number of ticks delivered
    pub ticks: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Finished {} task(s) after {} ticks", self.tasks, self.ticks)
    }
}

impl RunCommand {
    /// Execute the run command.
    ///
    /// Every name is added before any task starts, so a bad name aborts the
    /// run without printing progress.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if:
    /// - A name is blank or duplicates an earlier one
    /// - The simulation config is invalid
    /// - Writing to `out` fails
    pub async fn execute<W: Write>(
        &self,
        config: SimulationConfig,
        out: &mut W,
    ) -> CliResult<RunSummary> {
        let (mut manager, mut ticks) = TaskManager::with_tokio(config)?;

        let mut ids: Vec<TaskId> = Vec::with_capacity(self.names.len());
        for name in &self.names {
            ids.push(manager.add_task(name)?);
        }
        for id in &ids {
            manager.start(*id);
        }
        manager.take_events();

        let mut delivered = 0;
        while !manager.is_idle() {
            let Some(ticket) = ticks.recv().await else {
                break;
            };
            manager.handle_tick(ticket);
            delivered += 1;

            for event in manager.take_events() {
                if let ViewEvent::RowChanged {
                    id,
                    kind: ChangeKind::Progress,
                    ..
                } = event
                    && let Some(task) = manager.task(id)
                {
                    self.report(out, &TaskRow::from(task))?;
                }
            }
        }

        debug!("Run finished after {} ticks", delivered);
        Ok(RunSummary {
            tasks: ids.len(),
            ticks: delivered,
        })
    }

    fn report<W: Write>(&self, out: &mut W, row: &TaskRow) -> CliResult<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string(row)?)?;
        } else {
            writeln!(out, "{}: {}%", row.name, row.progress)?;
        }
        Ok(())
    }
}
