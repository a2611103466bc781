//! Common test utilities for the gridworld test suite.
//!
//! Scenario builders plus Dirichlet-distributed random beliefs.
#![allow(dead_code)]

use gridworld::{
    Action, Belief, Environment, Location, Simulation, SimulationConfig, SimulationParams,
    TransitionModel,
};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Gamma};

pub fn loc(row: usize, col: usize) -> Location {
    Location { row, col }
}

/// Parameters for exact scenarios: no slips, no observation noise.
pub fn exact_params() -> SimulationParams {
    SimulationParams::default()
        .with_transition(TransitionModel::deterministic())
        .with_observation_noise(0.0)
}

/// Seeded simulation on an empty grid with the agent at `start`.
pub fn empty_world(params: SimulationParams, start: Location, seed: u64) -> Simulation {
    let size = params.grid_size;
    Simulation::from_config(
        SimulationConfig::new(params)
            .with_environment(Environment::new(size))
            .with_start(start)
            .with_seed(seed),
    )
    .expect("valid scenario")
}

pub fn policy_index(simulation: &Simulation, actions: &[Action]) -> usize {
    simulation
        .policies()
        .iter()
        .position(|policy| policy.as_slice() == actions)
        .expect("policy should be enumerated")
}

pub fn assert_normalized(belief: &Belief) {
    let total = belief.total();
    assert!(
        (total - 1.0).abs() < 1e-9,
        "belief should sum to 1, got {total}"
    );
    assert!(
        belief.probabilities().iter().all(|&p| p >= 0.0),
        "belief has negative entries"
    );
}

/// Random belief drawn from a symmetric Dirichlet via normalised Gamma draws.
pub fn random_belief(size: usize, concentration: f64, rng: &mut StdRng) -> Belief {
    let gamma = Gamma::new(concentration, 1.0).expect("gamma parameters valid");
    let weights: Vec<f64> = (0..size * size).map(|_| gamma.sample(rng)).collect();
    Belief::try_from_weights(weights, size).expect("Dirichlet draws have positive mass")
}
