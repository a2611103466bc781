//! Live command - Drive the timer-based scheduler and print each snapshot

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    cli::{
        config::SimulationArgs,
        output::{print_kv, print_section, render_snapshot},
    },
    scheduler::Scheduler,
    simulation::Simulation,
};

#[derive(Parser, Debug)]
#[command(about = "Run the scheduler in real time")]
pub struct LiveArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Stop after this many cycles
    #[arg(long, short = 'n', default_value_t = 20)]
    pub cycles: u64,

    /// Delay between cycles in milliseconds (defaults to the parameter file)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Toggle the weather when this cycle completes
    #[arg(long)]
    pub toggle_weather_at: Option<u64>,
}

pub fn execute(args: LiveArgs) -> Result<()> {
    let config = args.simulation.config()?;
    let simulation = Simulation::from_config(config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(run_live(args, simulation))
}

async fn run_live(args: LiveArgs, simulation: Simulation) -> Result<()> {
    let handle = Scheduler::spawn(simulation);
    if let Some(delay_ms) = args.delay_ms {
        handle.set_delay(Duration::from_millis(delay_ms)).await?;
    }

    let mut updates = handle.subscribe();
    handle.run().await?;
    info!(cycles = args.cycles, "live run started");

    let mut last_cycle = 0;
    while last_cycle < args.cycles {
        updates
            .changed()
            .await
            .context("scheduler stopped unexpectedly")?;
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.cycle == last_cycle {
            continue;
        }
        last_cycle = snapshot.cycle;

        let title = format!("Cycle {} ({})", snapshot.cycle, snapshot.phase_label);
        print_section(&title);
        print!("{}", render_snapshot(&snapshot));
        if let Some(policy) = &snapshot.selected_policy {
            print_kv("Policy", &crate::grid::format_policy(policy));
        }
        print_kv(
            "Hunger",
            &format!("{}/{}", snapshot.hunger, snapshot.max_hunger),
        );
        print_kv("Entropy", &format!("{:.4} nats", snapshot.belief_entropy));
        print_kv("Weather", &snapshot.environment.weather().to_string());

        if args.toggle_weather_at == Some(snapshot.cycle) {
            handle.toggle_weather().await?;
        }
    }

    handle.pause().await?;
    let simulation = handle.shutdown().await?;
    println!(
        "\nStopped after {} cycles at {}",
        simulation.cycle(),
        simulation.agent().true_location
    );
    Ok(())
}
