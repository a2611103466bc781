//! Run command - Headless simulation for a fixed number of cycles

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::SimulationArgs,
        output::{print_section, print_stats_table, print_subsection, render_snapshot},
    },
    pipeline::{JsonlObserver, Observer, ProgressObserver, RunConfig, SimulationRunner},
    simulation::{CycleReport, Simulation},
};

#[derive(Parser, Debug)]
#[command(about = "Run the agent headless for N cycles")]
pub struct RunArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Cycles per episode
    #[arg(long, short = 'n', default_value_t = 100)]
    pub cycles: usize,

    /// Episodes (the simulation resets between episodes)
    #[arg(long, default_value_t = 1)]
    pub episodes: usize,

    /// Write one JSON line per cycle to this file
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// Prints each cycle on one line
struct CycleLogger;

impl Observer for CycleLogger {
    fn on_cycle(&mut self, report: &CycleReport) -> crate::Result<()> {
        let label = report
            .plan
            .selected_evaluation()
            .map(|e| e.label())
            .unwrap_or_default();
        let ate = if report.execution.ate_food_at.is_some() {
            "  ate"
        } else {
            ""
        };
        println!(
            "cycle {:>4}  {label}  {} -> {}  obs {}  hunger {:>2}  H {:.3}{}",
            report.cycle,
            report.execution.start,
            report.execution.end(),
            report.observation,
            report.execution.hunger,
            report.posterior_entropy,
            ate,
        );
        Ok(())
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let common = args.simulation.common();
    let config = args.simulation.config()?;
    let mut simulation = Simulation::from_config(config)?;

    print_section("Grid World Active Inference");
    print_stats_table(&[
        ("Grid", format!("{0}x{0}", simulation.params().grid_size)),
        ("Policies", simulation.policies().len().to_string()),
        ("Precision", simulation.params().precision.to_string()),
        ("Noise", simulation.params().observation_noise.to_string()),
        (
            "Seed",
            common
                .seed
                .map_or_else(|| "random".to_string(), |seed| seed.to_string()),
        ),
    ]);

    let mut runner = SimulationRunner::new(RunConfig {
        cycles: args.cycles,
        episodes: args.episodes,
    });
    if common.verbose {
        runner = runner.with_observer(Box::new(CycleLogger));
    } else if common.progress {
        runner = runner.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.trace {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("opening trace file {}", path.display()))?;
        runner = runner.with_observer(Box::new(observer));
    }

    let summary = runner.run(&mut simulation)?;

    print_subsection("Final state");
    print!("{}", render_snapshot(&simulation.snapshot()));

    print_subsection("Summary");
    print_stats_table(&[
        ("Cycles", summary.total_cycles.to_string()),
        (
            "Food eaten",
            format!("{} ({:.3}/cycle)", summary.meals, summary.food_rate()),
        ),
        ("Predator contacts", summary.predator_contacts.to_string()),
        (
            "Localised",
            format!("{}/{}", summary.localised_cycles, summary.total_cycles),
        ),
        (
            "Mean entropy",
            format!("{:.4} nats", summary.mean_posterior_entropy),
        ),
        (
            "Mean info gain",
            format!("{:.4} nats", summary.mean_information_gain),
        ),
        ("Final location", summary.final_location.to_string()),
        ("Final hunger", summary.final_hunger.to_string()),
        ("Memorised items", simulation.memory().len().to_string()),
    ]);

    if let Some(path) = &args.summary {
        summary
            .save(path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        println!("\nSummary written to: {}", path.display());
    }
    if let Some(path) = &args.trace {
        println!("Trace written to: {}", path.display());
    }

    Ok(())
}
