use clap::Parser;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::Command;
use error::CliResult;
use tasklist_core::SimulationConfig;

/// Tasklist - tasks that make progress on their own
#[derive(Parser)]
#[command(name = "tasklist")]
#[command(version = "0.1.0")]
#[command(about = "A task list with simulated, timer-driven progress", long_about = None)]
struct Args {
    /// Seed for tick delays and increments (can also be set via TASKLIST_SEED env var)
    #[arg(long, global = true, env = "TASKLIST_SEED")]
    seed: Option<u64>,

    /// Shortest delay between ticks, in milliseconds
    #[arg(long, global = true)]
    min_delay_ms: Option<u64>,

    /// Upper bound (exclusive) of the delay between ticks, in milliseconds
    #[arg(long, global = true)]
    max_delay_ms: Option<u64>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    /// Build the simulation settings, keeping defaults for unset bounds.
    fn simulation_config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::new();
        if self.min_delay_ms.is_some() || self.max_delay_ms.is_some() {
            let min = self.min_delay_ms.unwrap_or(config.delay_ms.start);
            let max = self.max_delay_ms.unwrap_or(config.delay_ms.end);
            config = config.with_delay_ms(min, max);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

/// Initialize logging based on the RUST_LOG environment variable
///
/// The interactive UI owns the screen, so it only logs when a file is given.
/// Headless runs log to stderr unless a file is given.
fn init_logging(interactive: bool, log_file: Option<&Path>) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true);

    match log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if !interactive => builder.with_writer(io::stderr).init(),
        None => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> CliResult<()> {
    let args = Args::parse();
    let command = args.command.as_ref();
    init_logging(
        command.is_none_or(Command::is_interactive),
        args.log_file.as_deref(),
    )?;
    run_with_args(&args).await
}

/// Run the application with the given arguments
async fn run_with_args(args: &Args) -> CliResult<()> {
    let config = args.simulation_config();
    config.validate()?;

    match &args.command {
        Some(cmd) => cmd.execute(config).await,
        None => Command::default().execute(config).await,
    }
}
