//! sarsamouse CLI - Train and inspect a SARSA(λ) foraging agent
//!
//! This CLI provides:
//! - Training in the meadow sandbox with periodic autosave
//! - Inspection of saved agents

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sarsamouse")]
#[command(version, about = "Tabular SARSA(λ) agent for a foraging sandbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent, resuming from a saved agent when one exists
    Train(Box<sarsamouse::cli::commands::train::TrainArgs>),

    /// Show parameters and table statistics of a saved agent
    Inspect(sarsamouse::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => sarsamouse::cli::commands::train::execute(*args),
        Commands::Inspect(args) => sarsamouse::cli::commands::inspect::execute(args),
    }
}
