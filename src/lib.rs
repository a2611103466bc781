//! Active Inference agent in a discrete grid world
//!
//! This crate provides:
//! - A grid environment with food, predators, shelters and weather
//! - A belief over the agent's own location, propagated through a stochastic
//!   transition model and corrected by noisy observations
//! - Expected Free Energy scoring of fixed-length policies and softmax selection
//! - A memory of confirmed item locations
//! - A timer-driven run/pause/step/reset scheduler
//! - Headless runs with composable observers and CSV/JSONL export

pub mod active_inference;
pub mod beliefs;
pub mod cli;
pub mod error;
pub mod export;
pub mod grid;
pub mod pipeline;
pub mod ports;
pub mod scheduler;
pub mod simulation;
pub mod utils;

pub use active_inference::{
    EfeResult, KnownLocations, PreferenceModel, PreferenceWeights, TransitionModel,
};
pub use beliefs::Belief;
pub use error::{Error, Result};
pub use grid::{Action, CellKind, Environment, Location, Policy, Weather};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use simulation::{
    CycleReport, Phase, Simulation, SimulationConfig, SimulationParams, SimulationSnapshot,
};
