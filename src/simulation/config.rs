//! Builder-style configuration for creating simulations.

use super::params::SimulationParams;
use crate::grid::{Environment, Location};

/// Configuration for creating a [`Simulation`](super::Simulation).
///
/// # Examples
///
/// ```
/// use gridworld::simulation::{Simulation, SimulationConfig, SimulationParams};
///
/// let config = SimulationConfig::new(SimulationParams::default().with_precision(4.0))
///     .with_seed(42);
/// let simulation = Simulation::from_config(config)?;
/// assert_eq!(simulation.params().precision, 4.0);
/// # Ok::<(), gridworld::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub params: SimulationParams,
    /// Initial layout; `None` uses [`Environment::default_layout`]
    pub environment: Option<Environment>,
    /// Starting cell of the agent
    pub start: Location,
    /// Random seed for reproducibility (None = non-deterministic)
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            environment: None,
            start: Location { row: 0, col: 0 },
            seed: None,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_start(mut self, start: Location) -> Self {
        self.start = start;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(SimulationParams::default())
    }
}
