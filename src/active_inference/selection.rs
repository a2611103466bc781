//! Softmax over expected free energy and policy sampling.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::utils::{sample_categorical, uniform};

/// Default precision (inverse temperature) of the policy softmax.
pub const DEFAULT_PRECISION: f64 = 2.0;

/// Outcome of a planning phase's selection step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySelection {
    pub probabilities: Vec<f64>,
    pub selected: usize,
}

/// Policy probabilities `p_i ∝ exp(-γ · (G_i - min G))`.
///
/// Non-finite entries receive probability 0. With no finite entries the
/// result is uniform; with exactly one it is one-hot on that entry.
///
/// ```
/// use gridworld::active_inference::softmax;
///
/// assert_eq!(softmax(&[0.0, f64::INFINITY], 4.0), vec![1.0, 0.0]);
/// assert_eq!(softmax(&[3.0, 3.0], 0.5), vec![0.5, 0.5]);
/// ```
pub fn softmax(efes: &[f64], precision: f64) -> Vec<f64> {
    let finite: Vec<usize> = efes
        .iter()
        .enumerate()
        .filter(|(_, g)| g.is_finite())
        .map(|(idx, _)| idx)
        .collect();

    match finite.as_slice() {
        [] => return uniform(efes.len()),
        [only] => {
            let mut probabilities = vec![0.0; efes.len()];
            probabilities[*only] = 1.0;
            return probabilities;
        }
        _ => {}
    }

    let min = finite
        .iter()
        .map(|&idx| efes[idx])
        .fold(f64::INFINITY, f64::min);
    let weights: Vec<f64> = efes
        .iter()
        .map(|&g| {
            if g.is_finite() {
                (-precision * (g - min)).exp()
            } else {
                0.0
            }
        })
        .collect();
    // The minimum contributes exp(0) = 1, so the total is at least 1.
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Index of the smallest finite EFE, if any.
pub fn argmin_finite(efes: &[f64]) -> Option<usize> {
    efes.iter()
        .enumerate()
        .filter(|(_, g)| g.is_finite())
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(idx, _)| idx)
}

/// Inverse-CDF sample of a policy index.
///
/// If rounding leaves the cumulative sum short of the draw, falls back to the
/// minimum finite EFE, then to index 0.
pub fn sample_policy<R>(probabilities: &[f64], efes: &[f64], rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    sample_categorical(probabilities, rng)
        .or_else(|| argmin_finite(efes))
        .unwrap_or(0)
}

/// Softmax then sample.
pub fn select_policy<R>(efes: &[f64], precision: f64, rng: &mut R) -> PolicySelection
where
    R: Rng + ?Sized,
{
    let probabilities = softmax(efes, precision);
    let selected = sample_policy(&probabilities, efes, rng);
    PolicySelection {
        probabilities,
        selected,
    }
}
