//! Shared configuration types for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    active_inference::TransitionModel,
    grid::{Environment, Location, Weather},
    simulation::{SimulationConfig, SimulationParams},
};

/// Common configuration shared across commands
#[derive(Debug, Clone, PartialEq)]
pub struct CommonConfig {
    /// Random seed for reproducibility
    pub seed: Option<u64>,

    /// Whether to show progress bars
    pub progress: bool,

    /// Verbose output
    pub verbose: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            seed: None,
            progress: true,
            verbose: false,
        }
    }
}

/// Simulation flags shared by every subcommand
///
/// Values given on the command line override those loaded from `--params`.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// JSON file with simulation parameters (missing fields use defaults)
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Grid side length
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Actions per policy
    #[arg(long)]
    pub policy_length: Option<usize>,

    /// Policy precision γ (0.1 to 10)
    #[arg(long, short = 'g')]
    pub precision: Option<f64>,

    /// Observation noise σ in cells (0 to 5)
    #[arg(long, short = 's')]
    pub noise: Option<f64>,

    /// Food preference weight
    #[arg(long)]
    pub food_weight: Option<f64>,

    /// Predator avoidance weight
    #[arg(long)]
    pub predator_weight: Option<f64>,

    /// Shelter preference weight
    #[arg(long)]
    pub shelter_weight: Option<f64>,

    /// Bad-weather exposure weight
    #[arg(long)]
    pub weather_weight: Option<f64>,

    /// Use a slip-free transition model
    #[arg(long)]
    pub deterministic: bool,

    /// Start in bad weather
    #[arg(long)]
    pub cloudy: bool,

    /// Start cell as `row,col`
    #[arg(long, value_parser = parse_location)]
    pub start: Option<(usize, usize)>,

    /// Print every cycle
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_location(raw: &str) -> std::result::Result<(usize, usize), String> {
    let (row, col) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected row,col but got '{raw}'"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("invalid row '{row}': {e}"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("invalid column '{col}': {e}"))?;
    Ok((row, col))
}

impl SimulationArgs {
    pub fn common(&self) -> CommonConfig {
        CommonConfig {
            seed: self.seed,
            progress: !self.no_progress,
            verbose: self.verbose,
        }
    }

    /// Parameters from `--params` with command-line overrides applied.
    pub fn params(&self) -> Result<SimulationParams> {
        let mut params = match &self.params {
            Some(path) => SimulationParams::from_json_file(path)
                .with_context(|| format!("loading parameters from {}", path.display()))?,
            None => SimulationParams::default(),
        };

        if let Some(size) = self.grid_size {
            params.grid_size = size;
        }
        if let Some(length) = self.policy_length {
            params.policy_length = length;
        }
        if let Some(precision) = self.precision {
            params.precision = precision;
        }
        if let Some(noise) = self.noise {
            params.observation_noise = noise;
        }
        if let Some(food) = self.food_weight {
            params.weights.food = food;
        }
        if let Some(predator) = self.predator_weight {
            params.weights.predator = predator;
        }
        if let Some(shelter) = self.shelter_weight {
            params.weights.shelter = shelter;
        }
        if let Some(weather) = self.weather_weight {
            params.weights.weather = weather;
        }
        if self.deterministic {
            params.transition = TransitionModel::deterministic()
                .with_futility_cost(params.transition.futility_cost);
        }

        params.validate().context("invalid simulation parameters")?;
        Ok(params)
    }

    pub fn config(&self) -> Result<SimulationConfig> {
        let params = self.params()?;
        let size = params.grid_size;
        let mut config = SimulationConfig::new(params);

        if self.cloudy {
            let mut environment = Environment::default_layout(size);
            environment.set_weather(Weather::Cloudy);
            config = config.with_environment(environment);
        }
        if let Some((row, col)) = self.start {
            let start = Location::new(row, col, size).context("invalid --start")?;
            config = config.with_start(start);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}
