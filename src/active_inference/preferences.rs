//! Preference model: how desirable the agent finds each grid cell.
//!
//! The log-preference of a cell combines three sources of evidence:
//! - direct features of the cell itself (food, shelter, predator proximity,
//!   exposure to bad weather),
//! - simulated perception of items within a near and far radius, where both
//!   radii shrink in bad weather,
//! - memory of confirmed item locations, decaying exponentially with distance.
//!
//! Drives are state-dependent: hunger above half of the maximum sharply raises
//! the value of food, and cloudy weather raises the value of shelter.

use serde::{Deserialize, Serialize};

use super::memory::KnownLocations;
use crate::{
    Error, Result,
    grid::{CellKind, Environment, Location, Weather},
};

/// Multiplier on the quadratic hunger term once the agent is hungry.
pub const HUNGRY_FOOD_GAIN: f64 = 8.0;
/// Fraction of the food weight used while the agent is sated.
pub const SATED_FOOD_FRACTION: f64 = 0.1;
/// Fraction of the shelter weight used in good weather.
pub const CALM_SHELTER_FRACTION: f64 = 0.1;

/// User-tunable preference magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceWeights {
    /// Hunger-driven attraction to food
    pub food: f64,
    /// Predator avoidance
    pub predator: f64,
    /// Weather-driven attraction to shelter
    pub shelter: f64,
    /// Penalty for standing unsheltered in bad weather
    pub weather: f64,
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            food: 1.0,
            predator: 2.0,
            shelter: 1.0,
            weather: 0.5,
        }
    }
}

impl PreferenceWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("weights.food", self.food),
            ("weights.predator", self.predator),
            ("weights.shelter", self.shelter),
            ("weights.weather", self.weather),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_parameter(
                    name,
                    format!("{value} must be non-negative and finite"),
                ));
            }
        }
        Ok(())
    }
}

/// Radii, bonuses and decay lengths of the perception and memory terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionParams {
    pub near_radius: usize,
    pub far_radius: usize,
    /// How much both radii shrink when the weather is bad
    pub bad_weather_radius_shrink: usize,
    pub near_bonus: f64,
    pub far_bonus: f64,
    /// Length scale of the direct predator-proximity penalty
    pub predator_decay: f64,
    pub memory_gain: f64,
    pub memory_decay: f64,
}

impl Default for PerceptionParams {
    fn default() -> Self {
        Self {
            near_radius: 1,
            far_radius: 3,
            bad_weather_radius_shrink: 1,
            near_bonus: 0.5,
            far_bonus: 0.2,
            predator_decay: 1.5,
            memory_gain: 0.3,
            memory_decay: 2.0,
        }
    }
}

impl PerceptionParams {
    pub fn validate(&self) -> Result<()> {
        if self.near_radius > self.far_radius {
            return Err(Error::invalid_parameter(
                "perception.near_radius",
                format!(
                    "{} exceeds far radius {}",
                    self.near_radius, self.far_radius
                ),
            ));
        }
        for (name, value) in [
            ("perception.near_bonus", self.near_bonus),
            ("perception.far_bonus", self.far_bonus),
            ("perception.memory_gain", self.memory_gain),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_parameter(
                    name,
                    format!("{value} must be non-negative and finite"),
                ));
            }
        }
        for (name, value) in [
            ("perception.predator_decay", self.predator_decay),
            ("perception.memory_decay", self.memory_decay),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::invalid_parameter(
                    name,
                    format!("{value} must be positive and finite"),
                ));
            }
        }
        Ok(())
    }
}

/// Everything outside the model that a score depends on.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub environment: &'a Environment,
    pub memory: &'a KnownLocations,
    pub hunger: u32,
    pub max_hunger: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PreferenceModel {
    pub weights: PreferenceWeights,
    pub perception: PerceptionParams,
}

impl PreferenceModel {
    pub fn new(weights: PreferenceWeights, perception: PerceptionParams) -> Self {
        Self {
            weights,
            perception,
        }
    }

    /// Value of food given the current hunger.
    ///
    /// ```
    /// use gridworld::active_inference::PreferenceModel;
    ///
    /// let model = PreferenceModel::default();
    /// assert!(model.food_drive(18, 20) > 10.0 * model.food_drive(5, 20));
    /// assert_eq!(model.food_drive(0, 20), model.food_drive(10, 20));
    /// ```
    pub fn food_drive(&self, hunger: u32, max_hunger: u32) -> f64 {
        if max_hunger == 0 || hunger.saturating_mul(2) > max_hunger {
            let fraction = if max_hunger == 0 {
                1.0
            } else {
                hunger as f64 / max_hunger as f64
            };
            self.weights.food * HUNGRY_FOOD_GAIN * fraction * fraction
        } else {
            self.weights.food * SATED_FOOD_FRACTION
        }
    }

    pub fn shelter_drive(&self, weather: Weather) -> f64 {
        if weather.is_bad() {
            self.weights.shelter
        } else {
            self.weights.shelter * CALM_SHELTER_FRACTION
        }
    }

    /// Near and far perception radii under the given weather.
    pub fn perception_radii(&self, weather: Weather) -> (usize, usize) {
        let p = &self.perception;
        if weather.is_bad() {
            (
                p.near_radius.saturating_sub(p.bad_weather_radius_shrink),
                p.far_radius.saturating_sub(p.bad_weather_radius_shrink),
            )
        } else {
            (p.near_radius, p.far_radius)
        }
    }

    fn proximity_bonus(&self, distance: usize, radii: (usize, usize)) -> f64 {
        let (near, far) = radii;
        if distance <= near {
            self.perception.near_bonus
        } else if distance <= far {
            self.perception.far_bonus
        } else {
            0.0
        }
    }

    fn memory_weight(&self, distance: usize) -> f64 {
        self.perception.memory_gain * (-(distance as f64) / self.perception.memory_decay).exp()
    }

    /// Log-preference of standing at `loc`.
    pub fn score(&self, loc: Location, ctx: &ScoringContext<'_>) -> f64 {
        let env = ctx.environment;
        let weather = env.weather();
        let food_drive = self.food_drive(ctx.hunger, ctx.max_hunger);
        let shelter_drive = self.shelter_drive(weather);
        let radii = self.perception_radii(weather);
        let mut score = 0.0;

        match env.cell(loc) {
            CellKind::Food => score += food_drive,
            CellKind::Shelter => score += shelter_drive,
            CellKind::Predator | CellKind::Empty => {}
        }
        if weather.is_bad() && env.cell(loc) != CellKind::Shelter {
            score -= self.weights.weather;
        }
        for predator in env.predators() {
            let distance = loc.manhattan(*predator) as f64;
            score -= self.weights.predator * (-distance / self.perception.predator_decay).exp();
        }

        for food in env.food() {
            score += food_drive * self.proximity_bonus(loc.manhattan(*food), radii);
        }
        for predator in env.predators() {
            score -= self.weights.predator * self.proximity_bonus(loc.manhattan(*predator), radii);
        }
        if weather.is_bad() {
            for shelter in env.shelters() {
                score += shelter_drive * self.proximity_bonus(loc.manhattan(*shelter), radii);
            }
        }

        for food in &ctx.memory.food {
            score += food_drive * self.memory_weight(loc.manhattan(*food));
        }
        for predator in &ctx.memory.predators {
            score -= self.weights.predator * self.memory_weight(loc.manhattan(*predator));
        }
        for shelter in &ctx.memory.shelters {
            score += shelter_drive * self.memory_weight(loc.manhattan(*shelter));
        }

        score
    }

    /// Scores for every cell, indexed like a belief vector.
    pub fn score_all(&self, ctx: &ScoringContext<'_>) -> Vec<f64> {
        let size = ctx.environment.size();
        (0..ctx.environment.cell_count())
            .map(|index| {
                let loc = Location {
                    row: index / size,
                    col: index % size,
                };
                self.score(loc, ctx)
            })
            .collect()
    }
}
