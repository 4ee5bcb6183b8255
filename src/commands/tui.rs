//! Interactive task list

use clap::Args;
use tasklist_core::SimulationConfig;
use tasklist_tui::App;

use crate::error::CliResult;

/// Open the interactive task list
#[derive(Debug, Default, Args)]
pub struct TuiCommand {}

impl TuiCommand {
    /// Run the terminal UI until the user quits.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Tui` if the config is invalid or the terminal
    /// cannot be set up.
    pub async fn execute(&self, config: SimulationConfig) -> CliResult<()> {
        let mut app = App::new(config)?;
        app.run().await?;
        Ok(())
    }
}
