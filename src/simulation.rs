//! Discrete-time Active Inference loop over the grid world
//!
//! One cycle runs three stages against a single owned state:
//!
//! 1. **Planning**: score cells, compute EFE for every policy from the current
//!    belief, softmax with precision γ and sample a policy.
//! 2. **Executing**: apply the policy to the true location, consuming at most
//!    one food item and updating hunger.
//! 3. **Perceiving**: predict the prior through the transition model, draw a
//!    noisy observation, apply Bayes' rule and update memory.
//!
//! All randomness comes from one seedable [`StdRng`] owned by the simulation.

pub mod config;
pub mod params;
pub mod report;
pub mod state;

use std::fmt;

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

pub use config::SimulationConfig;
pub use params::{
    DEFAULT_HUNGER_BUFFER, DEFAULT_MAX_HUNGER, DEFAULT_POLICY_LENGTH, DEFAULT_STEP_DELAY_MS,
    OBSERVATION_NOISE_RANGE, PRECISION_RANGE, SimulationParams,
};
pub use report::{
    CycleReport, ExecutionOutcome, PlanningOutcome, PolicyEvaluation, SimulationSnapshot,
};
pub use state::{AgentState, Phase};

use crate::{
    Error, Result,
    active_inference::{
        EfeResult, KnownLocations, ScoringContext, evaluate_policies, perceive, select_policy,
        softmax,
    },
    grid::{
        Action, CellKind, Environment, Location, Policy, Weather, enumerate_policies,
        format_policy,
    },
};

/// The grid-world agent together with its environment and memory.
pub struct Simulation {
    params: SimulationParams,
    policies: Vec<Policy>,
    initial_environment: Environment,
    start: Location,
    seed: Option<u64>,
    environment: Environment,
    agent: AgentState,
    memory: KnownLocations,
    rng: StdRng,
    phase: Phase,
    cycle: u64,
    pending_plan: Option<PlanningOutcome>,
    last_report: Option<CycleReport>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("cycle", &self.cycle)
            .field("phase", &self.phase)
            .field("true_location", &self.agent.true_location)
            .field("hunger", &self.agent.hunger)
            .field("policies", &self.policies.len())
            .field("seed", &self.seed)
            .finish()
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::seed_from_u64(rand::random::<u64>()),
    }
}

impl Simulation {
    /// Default layout, agent at (0, 0), non-deterministic seed.
    pub fn new(params: SimulationParams) -> Result<Self> {
        Self::from_config(SimulationConfig::new(params))
    }

    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        let SimulationConfig {
            params,
            environment,
            start,
            seed,
        } = config;
        params.validate()?;

        let size = params.grid_size;
        let environment = environment.unwrap_or_else(|| Environment::default_layout(size));
        if environment.size() != size {
            return Err(Error::invalid_parameter(
                "environment",
                format!(
                    "layout is {0}x{0} but grid_size is {size}",
                    environment.size()
                ),
            ));
        }
        environment.check_consistency()?;
        let start = Location::new(start.row, start.col, size)?;

        Ok(Self {
            policies: enumerate_policies(params.policy_length),
            agent: AgentState::new(start, size, params.initial_confidence),
            initial_environment: environment.clone(),
            environment,
            start,
            seed,
            memory: KnownLocations::new(),
            rng: seeded_rng(seed),
            phase: Phase::Idle,
            cycle: 0,
            pending_plan: None,
            last_report: None,
            params,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn memory(&self) -> &KnownLocations {
        &self.memory
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Number of completed cycles since construction or reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn scoring_context(&self) -> ScoringContext<'_> {
        ScoringContext {
            environment: &self.environment,
            memory: &self.memory,
            hunger: self.agent.hunger,
            max_hunger: self.params.max_hunger,
        }
    }

    /// Log-preference of every cell under the current drives and memory.
    pub fn preference_scores(&self) -> Vec<f64> {
        self.params
            .preference_model()
            .score_all(&self.scoring_context())
    }

    /// EFE of every policy from the current belief, in policy order.
    pub fn evaluate(&self) -> Vec<EfeResult> {
        let scores = self.preference_scores();
        evaluate_policies(
            &self.policies,
            &self.agent.belief,
            &scores,
            &self.params.transition,
        )
    }

    fn build_plan(
        &self,
        efes: Vec<EfeResult>,
        probabilities: Vec<f64>,
        selected: usize,
    ) -> PlanningOutcome {
        let evaluations = efes
            .into_iter()
            .zip(probabilities)
            .enumerate()
            .map(|(index, (efe, probability))| PolicyEvaluation {
                index,
                actions: self.policies[index].clone(),
                efe,
                probability,
            })
            .collect();
        PlanningOutcome {
            evaluations,
            selected,
            belief_entropy: self.agent.belief.entropy(),
        }
    }

    /// Planning phase: evaluate all policies and sample one.
    ///
    /// The plan is kept until the next [`Simulation::execute`] or state change.
    pub fn plan(&mut self) -> PlanningOutcome {
        self.phase = Phase::Planning;
        let efes = self.evaluate();
        let values: Vec<f64> = efes.iter().map(|result| result.efe).collect();
        let selection = select_policy(&values, self.params.precision, &mut self.rng);
        let plan = self.build_plan(efes, selection.probabilities, selection.selected);
        self.pending_plan = Some(plan.clone());
        plan
    }

    /// Planning phase with the choice fixed to `policy_index`.
    ///
    /// Probabilities are still reported; no randomness is consumed.
    fn plan_with_policy(&mut self, policy_index: usize) -> PlanningOutcome {
        self.phase = Phase::Planning;
        let efes = self.evaluate();
        let values: Vec<f64> = efes.iter().map(|result| result.efe).collect();
        let probabilities = softmax(&values, self.params.precision);
        self.build_plan(efes, probabilities, policy_index)
    }

    /// Execution and perception phases for `policy_index`.
    ///
    /// Reuses the pending plan when there is one, so the report carries the
    /// EFE breakdown that the choice was made from.
    pub fn execute(&mut self, policy_index: usize) -> Result<CycleReport> {
        if policy_index >= self.policies.len() {
            return Err(Error::InvalidPolicy {
                index: policy_index,
                count: self.policies.len(),
            });
        }
        let plan = match self.pending_plan.take() {
            Some(mut plan) => {
                plan.selected = policy_index;
                plan
            }
            None => self.plan_with_policy(policy_index),
        };
        Ok(self.run_cycle(plan))
    }

    /// Run exactly one full cycle.
    pub fn step(&mut self) -> CycleReport {
        let plan = self.plan();
        self.pending_plan = None;
        self.run_cycle(plan)
    }

    fn run_cycle(&mut self, plan: PlanningOutcome) -> CycleReport {
        self.phase = Phase::Executing;
        let policy = self.policies[plan.selected].clone();
        let execution = self.move_true_location(&policy);
        let end = execution.end();

        let prediction = self
            .params
            .transition
            .predict_sequence(&policy, &self.agent.belief);
        let prior = prediction.final_belief(&self.agent.belief).clone();

        let perception = perceive(&prior, end, self.params.observation_noise, &mut self.rng);
        let memory = self.memory.update(
            &perception.posterior,
            &self.environment,
            self.params.memory_threshold,
        );

        self.cycle += 1;
        let report = CycleReport {
            cycle: self.cycle,
            observation: perception.observation,
            prior_entropy: prior.entropy(),
            posterior_entropy: perception.posterior.entropy(),
            information_gain: perception.information_gain,
            belief_at_truth: perception.posterior.probability_at(end),
            memory,
            plan,
            execution,
        };

        self.agent.previous_location = report.execution.start;
        self.agent.true_location = end;
        self.agent.hunger = report.execution.hunger;
        self.agent.belief = perception.posterior;
        self.phase = Phase::Paused;

        debug!(
            cycle = report.cycle,
            policy = %format_policy(&policy),
            location = %end,
            observation = %report.observation,
            hunger = report.execution.hunger,
            entropy = report.posterior_entropy,
            "cycle complete"
        );
        self.last_report = Some(report.clone());
        report
    }

    /// Apply `policy` to the ground truth.
    ///
    /// Off-grid moves leave the agent in place. Only the first food cell
    /// reached is eaten; without food, hunger grows by the policy length.
    fn move_true_location(&mut self, policy: &[Action]) -> ExecutionOutcome {
        let size = self.environment.size();
        let start = self.agent.true_location;
        let mut position = start;
        let mut path = Vec::with_capacity(policy.len());
        let mut ate_food_at = None;
        let mut predator_contacts = 0;

        for action in policy {
            position = action.apply_clamped(position, size);
            path.push(position);
            if ate_food_at.is_none() && self.environment.consume_food(position) {
                ate_food_at = Some(position);
            }
            if self.environment.cell(position) == CellKind::Predator {
                predator_contacts += 1;
            }
        }

        let hunger = if ate_food_at.is_some() {
            0
        } else {
            let grown = self.agent.hunger.saturating_add(policy.len() as u32);
            grown.min(self.params.hunger_cap())
        };

        if let Some(food) = ate_food_at {
            debug!(location = %food, "food consumed");
        }

        ExecutionOutcome {
            start,
            path,
            ate_food_at,
            predator_contacts,
            hunger,
        }
    }

    /// Restore agent, environment and memory to their initial conditions.
    ///
    /// A seeded simulation replays the same random stream after reset.
    pub fn reset(&mut self) {
        self.environment = self.initial_environment.clone();
        self.agent = AgentState::new(
            self.start,
            self.params.grid_size,
            self.params.initial_confidence,
        );
        self.memory.clear();
        self.phase = Phase::Idle;
        self.cycle = 0;
        self.pending_plan = None;
        self.last_report = None;
        if self.seed.is_some() {
            self.rng = seeded_rng(self.seed);
        }
        info!(seed = ?self.seed, "simulation reset");
    }

    /// Placement tool; keeps cell tags and item lists consistent.
    pub fn place(&mut self, kind: CellKind, location: Location) -> Result<()> {
        self.environment.place(kind, location)?;
        self.pending_plan = None;
        debug!(?kind, %location, "item placed");
        Ok(())
    }

    pub fn toggle_weather(&mut self) -> Weather {
        let weather = self.environment.toggle_weather();
        self.pending_plan = None;
        debug!(%weather, "weather changed");
        weather
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.environment.set_weather(weather);
        self.pending_plan = None;
    }

    /// Update tunables that do not change the state space.
    ///
    /// Grid size and policy length need [`Simulation::reconfigure`].
    pub fn set_params(&mut self, params: SimulationParams) -> Result<()> {
        params.validate()?;
        if params.grid_size != self.params.grid_size {
            return Err(Error::RequiresReset {
                name: "grid_size".to_string(),
            });
        }
        if params.policy_length != self.params.policy_length {
            return Err(Error::RequiresReset {
                name: "policy_length".to_string(),
            });
        }
        self.params = params;
        self.pending_plan = None;
        Ok(())
    }

    /// Apply any parameter change and reset.
    ///
    /// A new grid size replaces the layout with the default one and moves the
    /// start to (0, 0) if it no longer fits.
    pub fn reconfigure(&mut self, params: SimulationParams) -> Result<()> {
        params.validate()?;
        if params.grid_size != self.params.grid_size {
            self.initial_environment = Environment::default_layout(params.grid_size);
            if !self.start.is_within(params.grid_size) {
                self.start = Location { row: 0, col: 0 };
            }
        }
        if params.policy_length != self.params.policy_length {
            self.policies = enumerate_policies(params.policy_length);
        }
        self.params = params;
        self.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        let report = self.last_report.as_ref();
        SimulationSnapshot {
            cycle: self.cycle,
            phase: self.phase,
            phase_label: self.phase.label(),
            environment: self.environment.clone(),
            true_location: self.agent.true_location,
            previous_location: self.agent.previous_location,
            belief: self.agent.belief.probabilities().to_vec(),
            belief_entropy: self.agent.belief.entropy(),
            hunger: self.agent.hunger,
            max_hunger: self.params.max_hunger,
            known_locations: self.memory.clone(),
            last_observation: report.map(|r| r.observation),
            selected_policy: report
                .and_then(|r| r.plan.selected_evaluation())
                .map(|evaluation| evaluation.actions.clone()),
            evaluations: report
                .map(|r| r.plan.evaluations.clone())
                .unwrap_or_default(),
        }
    }
}
