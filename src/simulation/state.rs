//! Agent state and scheduler phase

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{beliefs::Belief, grid::Location};

/// What the agent is, and what it thinks it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentState {
    /// Ground truth; hidden from planning, known to execution
    pub true_location: Location,
    /// Location before the last executed policy (display only)
    pub previous_location: Location,
    pub belief: Belief,
    pub hunger: u32,
}

impl AgentState {
    pub fn new(start: Location, size: usize, initial_confidence: f64) -> Self {
        Self {
            true_location: start,
            previous_location: start,
            belief: Belief::near_deterministic(start, size, initial_confidence),
            hunger: 0,
        }
    }
}

/// Lifecycle phase of the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fresh from construction or reset; no cycle has run
    #[default]
    Idle,
    Planning,
    /// Acting on the true state and perceiving the result
    Executing,
    /// Running; the next cycle is pending on a timer
    Scheduled,
    /// Stopped after at least one cycle, state retained
    Paused,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Planning => "Planning",
            Phase::Executing => "Executing & perceiving",
            Phase::Scheduled => "Running",
            Phase::Paused => "Paused",
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, Phase::Scheduled)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
