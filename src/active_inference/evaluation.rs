//! Expected free energy of candidate policies.
//!
//! For a policy π and the current belief q₀:
//!
//! ```text
//! G(π) = instrumental + epistemic + futility
//! instrumental = -Σ_s q_T(s) · score(s)
//! epistemic    = H[q_T] - H[q₀]
//! ```
//!
//! where q_T is the belief predicted after the last action. Lower is better.

use serde::{Deserialize, Serialize};

use super::transition::TransitionModel;
use crate::{beliefs::Belief, grid::Action};

/// Bound applied to every EFE value.
pub const EFE_CLAMP: f64 = 1000.0;

/// EFE of one policy and its components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfeResult {
    pub efe: f64,
    pub instrumental: f64,
    pub epistemic: f64,
    pub futility: f64,
}

impl EfeResult {
    /// Combine components, clamping to `[-EFE_CLAMP, EFE_CLAMP]`.
    ///
    /// `NaN` becomes `+∞`, the maximally bad sentinel that softmax maps to
    /// probability zero.
    pub fn from_components(instrumental: f64, epistemic: f64, futility: f64) -> Self {
        let raw = instrumental + epistemic + futility;
        let efe = if raw.is_nan() {
            f64::INFINITY
        } else {
            raw.clamp(-EFE_CLAMP, EFE_CLAMP)
        };
        Self {
            efe,
            instrumental,
            epistemic,
            futility,
        }
    }
}

/// Negative expected preference of a belief.
pub fn instrumental_value(belief: &Belief, scores: &[f64]) -> f64 {
    -belief
        .probabilities()
        .iter()
        .zip(scores)
        .map(|(p, score)| p * score)
        .sum::<f64>()
}

/// Evaluate a single policy from `belief`.
///
/// `scores` must be indexed like the belief vector (see
/// [`PreferenceModel::score_all`](super::PreferenceModel::score_all)).
pub fn evaluate_policy(
    policy: &[Action],
    belief: &Belief,
    scores: &[f64],
    transition: &TransitionModel,
) -> EfeResult {
    let prediction = transition.predict_sequence(policy, belief);
    let final_belief = prediction.final_belief(belief);
    let instrumental = instrumental_value(final_belief, scores);
    let epistemic = final_belief.entropy() - belief.entropy();
    EfeResult::from_components(instrumental, epistemic, prediction.futility)
}

/// Evaluate every policy, preserving order.
pub fn evaluate_policies(
    policies: &[Vec<Action>],
    belief: &Belief,
    scores: &[f64],
    transition: &TransitionModel,
) -> Vec<EfeResult> {
    policies
        .iter()
        .map(|policy| evaluate_policy(policy, belief, scores, transition))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Location;

    fn loc(row: usize, col: usize) -> Location {
        Location { row, col }
    }

    #[test]
    fn nan_maps_to_infinity() {
        let result = EfeResult::from_components(f64::NAN, 0.0, 0.0);
        assert_eq!(result.efe, f64::INFINITY);
    }

    #[test]
    fn values_are_clamped() {
        assert_eq!(EfeResult::from_components(5000.0, 0.0, 0.0).efe, EFE_CLAMP);
        assert_eq!(
            EfeResult::from_components(-5000.0, 0.0, 0.0).efe,
            -EFE_CLAMP
        );
        assert_eq!(
            EfeResult::from_components(f64::INFINITY, 0.0, 0.0).efe,
            EFE_CLAMP
        );
    }

    #[test]
    fn moving_toward_reward_lowers_efe() {
        let size = 5;
        let mut scores = vec![0.0; size * size];
        scores[loc(0, 2).index(size)] = 10.0;
        let belief = Belief::one_hot(loc(0, 0), size);
        let transition = TransitionModel::deterministic();

        let toward = [Action::Right, Action::Right];
        let away = [Action::Down, Action::Down];
        let toward = evaluate_policy(&toward, &belief, &scores, &transition);
        let away = evaluate_policy(&away, &belief, &scores, &transition);
        assert!(toward.efe < away.efe);
        assert!((toward.instrumental + 10.0).abs() < 1e-12);
    }

    #[test]
    fn stochastic_moves_increase_uncertainty() {
        let size = 5;
        let scores = vec![0.0; size * size];
        let belief = Belief::one_hot(loc(2, 2), size);
        let transition = TransitionModel::default();

        let stay = evaluate_policy(&[Action::Stay; 3], &belief, &scores, &transition);
        let wander = [Action::Up, Action::Left, Action::Down];
        let wander = evaluate_policy(&wander, &belief, &scores, &transition);
        assert_eq!(stay.epistemic, 0.0);
        assert!(wander.epistemic > 0.0);
    }

    #[test]
    fn futility_is_part_of_efe() {
        let size = 4;
        let scores = vec![0.0; size * size];
        let belief = Belief::one_hot(loc(0, 0), size);
        let transition = TransitionModel::deterministic().with_futility_cost(1.0);
        let result = evaluate_policy(&[Action::Up, Action::Left], &belief, &scores, &transition);
        assert!((result.futility - 2.0).abs() < 1e-12);
        assert!((result.efe - 2.0).abs() < 1e-12);
    }
}
