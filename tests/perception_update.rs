//! Observation model and Bayesian belief update

use gridworld::{
    Belief,
    active_inference::{
        bayes_update, likelihood_weights, observation_distribution, perceive,
        posterior_from_likelihood, sample_observation,
    },
};
use rand::{SeedableRng, rngs::StdRng};

mod common;

use common::{assert_normalized, loc, random_belief};

#[test]
fn noiseless_observations_are_exact() {
    let mut rng = StdRng::seed_from_u64(8);
    for row in 0..10 {
        for col in 0..10 {
            let truth = loc(row, col);
            assert_eq!(sample_observation(truth, 0.0, 10, &mut rng), truth);
        }
    }
}

#[test]
fn noisy_observations_stay_near_the_truth() {
    let mut rng = StdRng::seed_from_u64(12);
    let truth = loc(5, 5);
    let mut exact = 0;
    for _ in 0..500 {
        let observation = sample_observation(truth, 0.5, 10, &mut rng);
        assert!(observation.is_within(10));
        assert!(observation.manhattan(truth) <= 4);
        if observation == truth {
            exact += 1;
        }
    }
    assert!(exact > 250, "only {exact}/500 exact observations");
}

#[test]
fn observation_distribution_peaks_at_the_centre() {
    let distribution = observation_distribution(loc(3, 6), 1.0, 10);
    assert_normalized(&distribution);
    assert_eq!(distribution.most_likely(), loc(3, 6));
    assert!(distribution.probability_at(loc(3, 7)) > distribution.probability_at(loc(3, 9)));
}

#[test]
fn uniform_likelihood_leaves_prior_unchanged() {
    let mut rng = StdRng::seed_from_u64(2);
    let prior = random_belief(10, 0.5, &mut rng);
    let posterior = posterior_from_likelihood(&prior, &[0.37; 100]);
    for (a, b) in posterior.probabilities().iter().zip(prior.probabilities()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn observation_concentrates_a_uniform_prior() {
    let prior = Belief::uniform(10);
    let posterior = bayes_update(&prior, loc(7, 2), 1.0);
    assert_normalized(&posterior);
    assert_eq!(posterior.most_likely(), loc(7, 2));
    assert!(posterior.entropy() < prior.entropy());
}

#[test]
fn disjoint_likelihood_resets_to_uniform() {
    let prior = Belief::one_hot(loc(0, 0), 10);
    let likelihood = likelihood_weights(loc(9, 9), 0.0, 10);
    let posterior = posterior_from_likelihood(&prior, &likelihood);
    assert_eq!(posterior, Belief::uniform(10));
}

#[test]
fn information_gain_is_non_negative() {
    let mut rng = StdRng::seed_from_u64(30);
    for sigma in [0.0, 0.5, 1.0, 3.0] {
        let prior = random_belief(10, 1.0, &mut rng);
        let perception = perceive(&prior, loc(4, 4), sigma, &mut rng);
        assert_normalized(&perception.posterior);
        assert!(perception.information_gain >= -1e-12);
    }
}
