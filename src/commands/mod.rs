//! CLI commands for tasklist
//!
//! This module contains the subcommand implementations for the tasklist binary.

pub mod run;
pub mod tui;

pub use run::RunCommand;
pub use tui::TuiCommand;

use clap::Subcommand;
use tasklist_core::SimulationConfig;

use crate::error::CliResult;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive task list (default)
    Tui(TuiCommand),
    /// Start tasks headless and print their progress until all are done
    Run(RunCommand),
}

impl Command {
    /// Whether the command takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Command::Tui(_))
    }

    /// Execute the command with the given simulation settings.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the command fails.
    pub async fn execute(&self, config: SimulationConfig) -> CliResult<()> {
        match self {
            Command::Tui(cmd) => cmd.execute(config).await,
            Command::Run(cmd) => {
                let mut stdout = std::io::stdout();
                let summary = cmd.execute(config, &mut stdout).await?;
                if !cmd.json {
                    println!("{}", summary);
                }
                Ok(())
            }
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Command::Tui(TuiCommand::default())
    }
}
