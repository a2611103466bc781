//! Grid World CLI - Active Inference agent in a discrete grid
//!
//! This CLI provides a unified interface for:
//! - Running the agent headless with progress and JSONL traces
//! - Inspecting the EFE breakdown of a planning phase
//! - Driving the timer-based scheduler in real time

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gridworld")]
#[command(version, about = "Active Inference agent in a grid world", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run N cycles headless and print a summary
    Run(gridworld::cli::commands::run::RunArgs),

    /// Show the per-policy EFE breakdown of one planning phase
    Evaluate(gridworld::cli::commands::evaluate::EvaluateArgs),

    /// Drive the run/pause scheduler in real time
    Live(gridworld::cli::commands::live::LiveArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "gridworld=info".to_owned()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => gridworld::cli::commands::run::execute(args),
        Commands::Evaluate(args) => gridworld::cli::commands::evaluate::execute(args),
        Commands::Live(args) => gridworld::cli::commands::live::execute(args),
    }
}
