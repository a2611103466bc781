//! Per-cycle reports and UI-facing snapshots

use serde::Serialize;

use super::state::Phase;
use crate::{
    active_inference::{EfeResult, KnownLocations, MemoryUpdate},
    grid::{Environment, Location, Policy, format_policy},
};

/// EFE breakdown and selection probability of one policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyEvaluation {
    pub index: usize,
    pub actions: Policy,
    #[serde(flatten)]
    pub efe: EfeResult,
    pub probability: f64,
}

impl PolicyEvaluation {
    pub fn label(&self) -> String {
        format_policy(&self.actions)
    }
}

/// Result of a planning phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningOutcome {
    pub evaluations: Vec<PolicyEvaluation>,
    pub selected: usize,
    /// Entropy of the belief the plan was made from
    pub belief_entropy: f64,
}

impl PlanningOutcome {
    pub fn selected_evaluation(&self) -> Option<&PolicyEvaluation> {
        self.evaluations.get(self.selected)
    }

    /// Evaluations sorted by descending probability.
    pub fn ranked(&self) -> Vec<&PolicyEvaluation> {
        let mut ranked: Vec<&PolicyEvaluation> = self.evaluations.iter().collect();
        ranked.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.efe.efe.total_cmp(&b.efe.efe))
        });
        ranked
    }
}

/// What happened to the true state while executing a policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionOutcome {
    pub start: Location,
    /// True location after each action
    pub path: Vec<Location>,
    pub ate_food_at: Option<Location>,
    pub predator_contacts: usize,
    pub hunger: u32,
}

impl ExecutionOutcome {
    pub fn end(&self) -> Location {
        self.path.last().copied().unwrap_or(self.start)
    }
}

/// Everything one simulation cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub plan: PlanningOutcome,
    pub execution: ExecutionOutcome,
    pub observation: Location,
    pub prior_entropy: f64,
    pub posterior_entropy: f64,
    /// `KL[posterior || prior]`
    pub information_gain: f64,
    /// Posterior probability of the true location
    pub belief_at_truth: f64,
    pub memory: MemoryUpdate,
}

/// State of the simulation as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub cycle: u64,
    pub phase: Phase,
    pub phase_label: &'static str,
    pub environment: Environment,
    pub true_location: Location,
    pub previous_location: Location,
    pub belief: Vec<f64>,
    pub belief_entropy: f64,
    pub hunger: u32,
    pub max_hunger: u32,
    pub known_locations: KnownLocations,
    pub last_observation: Option<Location>,
    pub selected_policy: Option<Policy>,
    pub evaluations: Vec<PolicyEvaluation>,
}
