//! orbit-e2e CLI - end-to-end UI scenarios for the Orbit profiler

use std::path::PathBuf;

use clap::Parser;
use orbit_e2e::commands::Commands;
use orbit_e2e::common::{config::Config, logging};
use orbit_e2e::{cli, Result};

#[derive(Parser)]
#[command(name = "orbit-e2e", about = "End-to-end UI scenarios for the Orbit profiler")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

async fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli::dispatch(cli.command, config).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let log_file = logging::init_cli();
    tracing::debug!(?log_file, "logging initialized");

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
