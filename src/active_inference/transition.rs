//! Stochastic transition model used to roll beliefs forward through a policy.
//!
//! Each attempted move succeeds with `p_success`, leaves the agent in place
//! with `p_stay`, and otherwise slips into one of the valid cells perpendicular
//! to the intended direction. Attempts to walk off the grid keep the success
//! mass in place and are charged to a futility penalty.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    beliefs::Belief,
    grid::{Action, Location},
};

/// Default probability that an attempted move lands on its target.
pub const DEFAULT_P_SUCCESS: f64 = 0.85;
/// Default probability of staying in place on a move attempt.
pub const DEFAULT_P_STAY: f64 = 0.10;
/// Default cost per unit of belief mass pushed against a wall.
pub const DEFAULT_FUTILITY_COST: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionModel {
    pub p_success: f64,
    pub p_stay: f64,
    pub futility_cost: f64,
}

impl Default for TransitionModel {
    fn default() -> Self {
        Self {
            p_success: DEFAULT_P_SUCCESS,
            p_stay: DEFAULT_P_STAY,
            futility_cost: DEFAULT_FUTILITY_COST,
        }
    }
}

/// Belief after one action plus the futility charged for it.
#[derive(Debug, Clone)]
pub struct StepPrediction {
    pub belief: Belief,
    pub futility: f64,
}

/// Beliefs after each action of a policy and the accumulated futility penalty.
#[derive(Debug, Clone)]
pub struct BeliefPrediction {
    pub beliefs: Vec<Belief>,
    pub futility: f64,
}

impl BeliefPrediction {
    /// Belief after the last action, or `initial` for an empty policy.
    pub fn final_belief<'a>(&'a self, initial: &'a Belief) -> &'a Belief {
        self.beliefs.last().unwrap_or(initial)
    }
}

impl TransitionModel {
    pub fn new(p_success: f64, p_stay: f64) -> Result<Self> {
        let model = Self {
            p_success,
            p_stay,
            ..Self::default()
        };
        model.validate()?;
        Ok(model)
    }

    /// Moves always succeed; useful for exact scenario checks.
    pub fn deterministic() -> Self {
        Self {
            p_success: 1.0,
            p_stay: 0.0,
            ..Self::default()
        }
    }

    pub fn with_futility_cost(mut self, cost: f64) -> Self {
        self.futility_cost = cost;
        self
    }

    /// Probability mass left over for slipping sideways.
    pub fn slip(&self) -> f64 {
        (1.0 - self.p_success - self.p_stay).max(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("p_success", self.p_success), ("p_stay", self.p_stay)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                let reason = format!("{value} is not in [0, 1]");
                return Err(Error::invalid_parameter(name, reason));
            }
        }
        if self.p_success + self.p_stay > 1.0 + 1e-9 {
            return Err(Error::invalid_parameter(
                "p_success + p_stay",
                format!("{} exceeds 1", self.p_success + self.p_stay),
            ));
        }
        if !self.futility_cost.is_finite() || self.futility_cost < 0.0 {
            return Err(Error::invalid_parameter(
                "futility_cost",
                format!("{} must be non-negative and finite", self.futility_cost),
            ));
        }
        Ok(())
    }

    /// Redistribute belief mass for a single action.
    pub fn predict_step(&self, belief: &Belief, action: Action) -> StepPrediction {
        let size = belief.size();
        let mut next = vec![0.0; belief.len()];
        let mut blocked = 0.0;
        let slip = self.slip();

        for (index, &mass) in belief.probabilities().iter().enumerate() {
            if mass <= 0.0 {
                continue;
            }
            if action == Action::Stay {
                next[index] += mass;
                continue;
            }
            let here = Location {
                row: index / size,
                col: index % size,
            };

            match action.apply(here, size) {
                Some(target) => next[target.index(size)] += mass * self.p_success,
                None => {
                    next[index] += mass * self.p_success;
                    blocked += mass * self.p_success;
                }
            }
            next[index] += mass * self.p_stay;

            if slip > 0.0 {
                let neighbours: Vec<Location> = action
                    .perpendicular()
                    .iter()
                    .filter_map(|side| side.apply(here, size))
                    .collect();
                if neighbours.is_empty() {
                    next[index] += mass * slip;
                } else {
                    let share = mass * slip / neighbours.len() as f64;
                    for neighbour in neighbours {
                        next[neighbour.index(size)] += share;
                    }
                }
            }
        }

        StepPrediction {
            belief: Belief::from_weights(next, size, "belief prediction"),
            futility: blocked * self.futility_cost,
        }
    }

    /// Roll `initial` forward through every action of `policy`.
    pub fn predict_sequence(&self, policy: &[Action], initial: &Belief) -> BeliefPrediction {
        let mut beliefs = Vec::with_capacity(policy.len());
        let mut futility = 0.0;
        let mut current = initial.clone();
        for &action in policy {
            let step = self.predict_step(&current, action);
            futility += step.futility;
            current = step.belief;
            beliefs.push(current.clone());
        }
        BeliefPrediction { beliefs, futility }
    }
}
