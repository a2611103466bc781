//! Noisy observation of the agent's location and Bayesian belief update.
//!
//! The observation model is an isotropic Gaussian-shaped kernel over cells,
//! `L(o | s) ∝ exp(-|o - s|² / 2σ²)`. With σ = 0 observations are exact.

use rand::Rng;
use serde::Serialize;
use tracing::warn;

use crate::{
    beliefs::Belief,
    grid::Location,
    utils::{kl_divergence, sample_categorical},
};

/// Default observation noise σ (in cells).
pub const DEFAULT_OBSERVATION_NOISE: f64 = 1.0;

/// Unnormalised likelihood of every cell given a centre and noise level.
///
/// `sigma <= 0` yields an indicator on `center`.
pub fn likelihood_weights(center: Location, sigma: f64, size: usize) -> Vec<f64> {
    let cells = size * size;
    if sigma <= 0.0 {
        let mut weights = vec![0.0; cells];
        if let Some(slot) = weights.get_mut(center.index(size)) {
            *slot = 1.0;
        }
        return weights;
    }
    let two_sigma_sq = 2.0 * sigma * sigma;
    (0..cells)
        .map(|index| {
            let cell = Location {
                row: index / size,
                col: index % size,
            };
            (-cell.squared_distance(center) / two_sigma_sq).exp()
        })
        .collect()
}

/// Distribution of observations when the agent stands at `center`.
pub fn observation_distribution(center: Location, sigma: f64, size: usize) -> Belief {
    let weights = likelihood_weights(center, sigma, size);
    Belief::from_weights(weights, size, "observation likelihood")
}

/// Draw a noisy observation of `true_location`.
pub fn sample_observation<R>(
    true_location: Location,
    sigma: f64,
    size: usize,
    rng: &mut R,
) -> Location
where
    R: Rng + ?Sized,
{
    if sigma <= 0.0 {
        return true_location;
    }
    let distribution = observation_distribution(true_location, sigma, size);
    match sample_categorical(distribution.probabilities(), rng) {
        Some(index) => Location {
            row: index / size,
            col: index % size,
        },
        None => true_location,
    }
}

/// `posterior(s) ∝ likelihood(s) · prior(s)`, uniform on underflow.
pub fn posterior_from_likelihood(prior: &Belief, likelihood: &[f64]) -> Belief {
    let weights: Vec<f64> = prior
        .probabilities()
        .iter()
        .zip(likelihood)
        .map(|(p, l)| p * l)
        .collect();
    match Belief::try_from_weights(weights, prior.size()) {
        Some(posterior) => posterior,
        None => {
            warn!("posterior normalisation underflowed; resetting belief to uniform");
            Belief::uniform(prior.size())
        }
    }
}

/// Bayesian update of `prior` with an observed cell.
pub fn bayes_update(prior: &Belief, observation: Location, sigma: f64) -> Belief {
    let likelihood = likelihood_weights(observation, sigma, prior.size());
    posterior_from_likelihood(prior, &likelihood)
}

/// Result of one perception phase.
#[derive(Debug, Clone, Serialize)]
pub struct Perception {
    pub observation: Location,
    pub posterior: Belief,
    /// `KL[posterior || prior]`
    pub information_gain: f64,
}

/// Observe the true location and update the prior.
pub fn perceive<R>(prior: &Belief, true_location: Location, sigma: f64, rng: &mut R) -> Perception
where
    R: Rng + ?Sized,
{
    let observation = sample_observation(true_location, sigma, prior.size(), rng);
    let posterior = bayes_update(prior, observation, sigma);
    let information_gain = kl_divergence(posterior.probabilities(), prior.probabilities());
    Perception {
        observation,
        posterior,
        information_gain,
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location { row, col }
    }

    #[test]
    fn zero_noise_observation_is_exact() {
        let mut rng = StdRng::seed_from_u64(5);
        for index in 0..100 {
            let truth = Location::from_index(index, 10).unwrap();
            assert_eq!(sample_observation(truth, 0.0, 10, &mut rng), truth);
        }
    }

    #[test]
    fn noisy_observations_cluster_around_truth() {
        let mut rng = StdRng::seed_from_u64(11);
        let truth = loc(5, 5);
        let mut exact = 0;
        let mut far = 0;
        for _ in 0..1000 {
            let observed = sample_observation(truth, 0.7, 10, &mut rng);
            if observed == truth {
                exact += 1;
            }
            if observed.manhattan(truth) > 4 {
                far += 1;
            }
        }
        assert!(exact > 200, "exact observations: {exact}");
        assert!(far < 10, "far observations: {far}");
    }

    #[test]
    fn observation_distribution_is_normalized() {
        let dist = observation_distribution(loc(0, 9), 2.0, 10);
        assert!((dist.total() - 1.0).abs() < 1e-12);
        assert_eq!(dist.most_likely(), loc(0, 9));
    }

    #[test]
    fn exact_observation_collapses_belief() {
        let prior = Belief::uniform(10);
        let posterior = bayes_update(&prior, loc(3, 7), 0.0);
        assert_eq!(posterior, Belief::one_hot(loc(3, 7), 10));
    }

    #[test]
    fn contradicting_exact_observation_resets_to_uniform() {
        let prior = Belief::one_hot(loc(0, 0), 4);
        let posterior = bayes_update(&prior, loc(3, 3), 0.0);
        assert_eq!(posterior, Belief::uniform(4));
    }

    #[test]
    fn information_gain_is_positive_for_informative_observation() {
        let mut rng = StdRng::seed_from_u64(2);
        let prior = Belief::uniform(5);
        let perception = perceive(&prior, loc(2, 2), 0.5, &mut rng);
        assert!(perception.information_gain > 0.0);
        assert!(perception.posterior.entropy() < prior.entropy());
    }
}
