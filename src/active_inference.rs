//! Active Inference machinery for the grid-world agent
//!
//! The agent plans by rolling its location belief forward through every
//! candidate policy, scoring the predicted beliefs with Expected Free Energy
//! (EFE), and sampling a policy from a softmax over the scores. After acting it
//! observes its location through a noisy channel and updates its belief with
//! Bayes' rule.
//!
//! ## Key Concepts
//!
//! - **Transition model**: stochastic movement with slips and wall futility
//! - **Preferences**: log-preference of each cell from hunger, weather, items and memory
//! - **Expected Free Energy**: instrumental (risk) + epistemic + futility; lower is better
//! - **Precision**: inverse temperature of the policy softmax
//!
//! ## Module Structure
//!
//! - [`transition`]: belief prediction through a policy
//! - [`preferences`]: preference weights and cell scoring
//! - [`evaluation`]: EFE per policy
//! - [`selection`]: softmax and policy sampling
//! - [`perception`]: observation model and Bayesian update
//! - [`memory`]: confirmed item locations

pub mod evaluation;
pub mod memory;
pub mod perception;
pub mod preferences;
pub mod selection;
pub mod transition;

pub use evaluation::{EFE_CLAMP, EfeResult, evaluate_policies, evaluate_policy, instrumental_value};
pub use memory::{DEFAULT_CONFIDENCE_THRESHOLD, KnownLocations, MemoryUpdate};
pub use perception::{
    DEFAULT_OBSERVATION_NOISE, Perception, bayes_update, likelihood_weights,
    observation_distribution, perceive, posterior_from_likelihood, sample_observation,
};
pub use preferences::{PerceptionParams, PreferenceModel, PreferenceWeights, ScoringContext};
pub use selection::{
    DEFAULT_PRECISION, PolicySelection, argmin_finite, sample_policy, select_policy, softmax,
};
pub use transition::{BeliefPrediction, StepPrediction, TransitionModel};
