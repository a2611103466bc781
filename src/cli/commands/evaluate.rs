//! Evaluate command - Inspect a single planning phase

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::SimulationArgs,
        output::{print_kv, print_policy_table, print_section, print_subsection, render_snapshot},
    },
    export::EfeCsvExporter,
    simulation::Simulation,
};

#[derive(Parser, Debug)]
#[command(about = "Show the EFE breakdown of one planning phase")]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Cycles to run before evaluating
    #[arg(long, default_value_t = 0)]
    pub warmup: usize,

    /// Number of policies to show
    #[arg(long, short = 'k', default_value_t = 10)]
    pub top: usize,

    /// Export every policy's EFE breakdown to CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let config = args.simulation.config()?;
    let mut simulation = Simulation::from_config(config)?;
    for _ in 0..args.warmup {
        simulation.step();
    }

    print_section("Planning phase");
    print!("{}", render_snapshot(&simulation.snapshot()));
    print_kv("Location", &simulation.agent().true_location.to_string());
    let believed = simulation.agent().belief.most_likely();
    print_kv("Believed at", &believed.to_string());
    print_kv("Hunger", &simulation.agent().hunger.to_string());
    print_kv("Weather", &simulation.environment().weather().to_string());

    let plan = simulation.plan();
    print_kv("Belief entropy", &format!("{:.4}", plan.belief_entropy));

    print_subsection(&format!("Top {} policies", args.top));
    print_policy_table(&plan, args.top);

    if let Some(path) = &args.csv {
        let rows = EfeCsvExporter::export(path, simulation.cycle(), &plan)
            .with_context(|| format!("exporting EFE to {}", path.display()))?;
        println!("\nExported {rows} policies to: {}", path.display());
    }

    Ok(())
}
