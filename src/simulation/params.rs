//! Tunable parameters of the simulation

use std::{fs, ops::RangeInclusive, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    active_inference::{
        DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_OBSERVATION_NOISE, DEFAULT_PRECISION,
        PerceptionParams, PreferenceModel, PreferenceWeights, TransitionModel,
    },
    beliefs::DEFAULT_INITIAL_CONFIDENCE,
    grid::DEFAULT_GRID_SIZE,
};

pub const DEFAULT_POLICY_LENGTH: usize = 3;
pub const DEFAULT_MAX_HUNGER: u32 = 20;
/// How far hunger may exceed the maximum before it stops growing.
pub const DEFAULT_HUNGER_BUFFER: u32 = 5;
pub const DEFAULT_STEP_DELAY_MS: u64 = 500;

/// Accepted precision γ.
pub const PRECISION_RANGE: RangeInclusive<f64> = 0.1..=10.0;
/// Accepted observation noise σ.
pub const OBSERVATION_NOISE_RANGE: RangeInclusive<f64> = 0.0..=5.0;
/// Policies grow as 5^length; longer horizons are rejected.
pub const MAX_POLICY_LENGTH: usize = 5;
pub const MAX_GRID_SIZE: usize = 64;

/// Every knob the presentation layer can turn.
///
/// Missing fields fall back to their defaults when deserialising, so partial
/// JSON files are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub grid_size: usize,
    pub policy_length: usize,
    pub max_hunger: u32,
    pub hunger_buffer: u32,
    /// Precision γ of the policy softmax
    pub precision: f64,
    /// Observation noise σ in cells; 0 means exact observations
    pub observation_noise: f64,
    pub weights: PreferenceWeights,
    pub perception: PerceptionParams,
    pub transition: TransitionModel,
    /// Posterior mass required before a cell's contents are memorised
    pub memory_threshold: f64,
    /// Probability placed on the start cell by the initial belief
    pub initial_confidence: f64,
    /// Delay between scheduled cycles
    pub step_delay_ms: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            policy_length: DEFAULT_POLICY_LENGTH,
            max_hunger: DEFAULT_MAX_HUNGER,
            hunger_buffer: DEFAULT_HUNGER_BUFFER,
            precision: DEFAULT_PRECISION,
            observation_noise: DEFAULT_OBSERVATION_NOISE,
            weights: PreferenceWeights::default(),
            perception: PerceptionParams::default(),
            transition: TransitionModel::default(),
            memory_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            initial_confidence: DEFAULT_INITIAL_CONFIDENCE,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
        }
    }
}

impl SimulationParams {
    /// Load parameters from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read parameters from {}", path.display()),
            source,
        })?;
        let params: Self = serde_json::from_str(&raw)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(Error::invalid_parameter(
                "grid_size",
                format!("{} is not in 1..={MAX_GRID_SIZE}", self.grid_size),
            ));
        }
        if self.policy_length == 0 || self.policy_length > MAX_POLICY_LENGTH {
            return Err(Error::invalid_parameter(
                "policy_length",
                format!("{} is not in 1..={MAX_POLICY_LENGTH}", self.policy_length),
            ));
        }
        if !PRECISION_RANGE.contains(&self.precision) {
            return Err(Error::invalid_parameter(
                "precision",
                format!("{} is not in {PRECISION_RANGE:?}", self.precision),
            ));
        }
        if !OBSERVATION_NOISE_RANGE.contains(&self.observation_noise) {
            return Err(Error::invalid_parameter(
                "observation_noise",
                format!(
                    "{} is not in {OBSERVATION_NOISE_RANGE:?}",
                    self.observation_noise
                ),
            ));
        }
        if !(self.memory_threshold > 0.0 && self.memory_threshold < 1.0) {
            return Err(Error::invalid_parameter(
                "memory_threshold",
                format!("{} is not in (0, 1)", self.memory_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_confidence) {
            return Err(Error::invalid_parameter(
                "initial_confidence",
                format!("{} is not in [0, 1]", self.initial_confidence),
            ));
        }
        self.weights.validate()?;
        self.perception.validate()?;
        self.transition.validate()?;
        Ok(())
    }

    pub fn preference_model(&self) -> PreferenceModel {
        PreferenceModel::new(self.weights, self.perception)
    }

    /// Hunger never exceeds this value.
    pub fn hunger_cap(&self) -> u32 {
        self.max_hunger.saturating_add(self.hunger_buffer)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_observation_noise(mut self, sigma: f64) -> Self {
        self.observation_noise = sigma;
        self
    }

    pub fn with_weights(mut self, weights: PreferenceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_transition(mut self, transition: TransitionModel) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.grid_size = size;
        self
    }

    pub fn with_step_delay_ms(mut self, delay_ms: u64) -> Self {
        self.step_delay_ms = delay_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_precision_and_noise() {
        let defaults = SimulationParams::default;
        assert!(defaults().with_precision(0.0).validate().is_err());
        assert!(defaults().with_precision(11.0).validate().is_err());
        assert!(defaults().with_observation_noise(-0.1).validate().is_err());
    }

    #[test]
    fn rejects_explosive_policy_lengths() {
        let params = SimulationParams {
            policy_length: MAX_POLICY_LENGTH + 1,
            ..SimulationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter { ref name, .. }) if name == "policy_length"
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{ "precision": 4.0, "weights": { "food": 3.0 } }"#;
        write!(file, "{json}").unwrap();
        let params = SimulationParams::from_json_file(file.path()).unwrap();
        assert_eq!(params.precision, 4.0);
        assert_eq!(params.weights.food, 3.0);
        assert_eq!(
            params.weights.predator,
            PreferenceWeights::default().predator
        );
        assert_eq!(params.grid_size, DEFAULT_GRID_SIZE);
    }

    #[test]
    fn missing_file_reports_io_context() {
        let err = SimulationParams::from_json_file(Path::new("/nonexistent/params.json"))
            .unwrap_err();
        assert!(err.to_string().contains("read parameters"));
    }
}
