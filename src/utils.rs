//! Numeric utilities shared by every stage of the simulation.
//!
//! All epsilon handling lives here so that belief prediction, perception and
//! policy selection agree on what "zero" and "collapsed" mean.

use rand::{Rng, distr::StandardUniform};

/// Floor applied inside logarithms.
pub const EPS: f64 = 1e-12;

/// Total mass below which a distribution is treated as collapsed.
pub const UNDERFLOW_EPS: f64 = 1e-300;

/// Natural logarithm guarded against `ln(0)`.
///
/// ```
/// use gridworld::utils::{safe_ln, EPS};
///
/// assert_eq!(safe_ln(0.0), EPS.ln());
/// assert_eq!(safe_ln(1.0), 0.0);
/// ```
pub fn safe_ln(x: f64) -> f64 {
    x.max(EPS).ln()
}

/// Calculate Shannon entropy from a probability distribution.
///
/// The Shannon entropy is calculated as: H = -Σ(p * ln(p)), with the
/// logarithm guarded by [`EPS`]. Zero entries contribute nothing.
///
/// # Examples
///
/// ```
/// use gridworld::utils::shannon_entropy;
///
/// // Uniform distribution over 2 outcomes
/// let entropy = shannon_entropy(vec![0.5, 0.5]);
/// assert!((entropy - std::f64::consts::LN_2).abs() < 1e-12);
///
/// // Deterministic distribution (zero entropy)
/// let entropy = shannon_entropy(vec![1.0, 0.0, 0.0]);
/// assert!(entropy.abs() < 1e-12);
/// ```
pub fn shannon_entropy<I>(probabilities: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    probabilities
        .into_iter()
        .filter(|&p| p > 0.0)
        .map(|p| -p * safe_ln(p))
        .sum()
}

/// KL divergence `KL[q || p]` between categorical distributions.
///
/// Both arguments are guarded with [`EPS`] inside the logarithm, so entries
/// where `q` is zero contribute nothing and entries where only `p` is zero
/// contribute a large but finite amount.
pub fn kl_divergence(q: &[f64], p: &[f64]) -> f64 {
    assert_eq!(q.len(), p.len(), "categorical length mismatch");
    q.iter()
        .zip(p.iter())
        .filter(|(qi, _)| **qi > 0.0)
        .map(|(&qi, &pi)| qi * (safe_ln(qi) - safe_ln(pi)))
        .sum()
}

/// Uniform distribution over `len` outcomes.
pub fn uniform(len: usize) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    vec![1.0 / len as f64; len]
}

/// Fallback behavior when weight normalization fails (zero or non-finite total).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationFallback {
    /// Return None if normalization fails
    None,
    /// Fall back to uniform distribution
    Uniform,
}

/// Normalize weights to probabilities that sum to 1.0 with configurable fallback.
///
/// When the total weight is non-finite or does not exceed `epsilon`
/// (default [`UNDERFLOW_EPS`]), the fallback strategy decides the result.
///
/// # Examples
///
/// ```
/// use gridworld::utils::{normalize_weights_with_options, NormalizationFallback};
///
/// let normalized = normalize_weights_with_options(
///     vec![1.0, 2.0, 1.0],
///     NormalizationFallback::None,
///     None,
/// ).unwrap();
/// assert_eq!(normalized, vec![0.25, 0.5, 0.25]);
///
/// // Fallback to uniform when total is zero
/// let normalized = normalize_weights_with_options(
///     vec![0.0, 0.0, 0.0],
///     NormalizationFallback::Uniform,
///     None,
/// ).unwrap();
/// assert_eq!(normalized, vec![1.0/3.0, 1.0/3.0, 1.0/3.0]);
/// ```
pub fn normalize_weights_with_options<I>(
    weights: I,
    fallback: NormalizationFallback,
    epsilon: Option<f64>,
) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let weights_vec: Vec<f64> = weights.into_iter().collect();

    if weights_vec.is_empty() {
        return match fallback {
            NormalizationFallback::None => None,
            NormalizationFallback::Uniform => Some(vec![]),
        };
    }

    let eps = epsilon.unwrap_or(UNDERFLOW_EPS);
    let sum: f64 = weights_vec.iter().sum();

    if !sum.is_finite() || sum <= eps {
        return apply_fallback(fallback, weights_vec.len());
    }

    Some(weights_vec.iter().map(|&w| w / sum).collect())
}

fn apply_fallback(fallback: NormalizationFallback, len: usize) -> Option<Vec<f64>> {
    match fallback {
        NormalizationFallback::None => None,
        NormalizationFallback::Uniform => Some(uniform(len)),
    }
}

/// Normalize weights to probabilities that sum to 1.0.
///
/// Returns `None` if the total weight is zero, negative, or non-finite.
///
/// ```
/// use gridworld::utils::normalize_weights;
///
/// assert_eq!(normalize_weights(vec![1.0, 3.0]), Some(vec![0.25, 0.75]));
/// assert_eq!(normalize_weights(vec![0.0, 0.0]), None);
/// ```
pub fn normalize_weights<I>(weights: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = f64>,
{
    normalize_weights_with_options(weights, NormalizationFallback::None, None)
}

/// Inverse-CDF sampling from a probability vector.
///
/// Draws a single uniform ticket in `[0, 1)` and walks the cumulative sum.
/// Returns `None` when rounding leaves the cumulative sum short of the ticket
/// (or the slice is empty); callers decide what the fallback index should be.
///
/// ```
/// use rand::{SeedableRng, rngs::StdRng};
/// use gridworld::utils::sample_categorical;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// assert_eq!(sample_categorical(&[0.0, 1.0, 0.0], &mut rng), Some(1));
/// ```
pub fn sample_categorical<R>(probabilities: &[f64], rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    let ticket: f64 = rng.sample(StandardUniform);
    let mut cumulative = 0.0;
    for (idx, &p) in probabilities.iter().enumerate() {
        if !p.is_finite() || p <= 0.0 {
            continue;
        }
        cumulative += p;
        if ticket < cumulative {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn entropy_of_uniform_is_log_n() {
        let n = 100;
        let entropy = shannon_entropy(uniform(n));
        assert!((entropy - (n as f64).ln()).abs() < 1e-9);
    }

    #[test]
    fn kl_of_identical_distributions_is_zero() {
        let p = [0.2, 0.3, 0.5];
        assert!(kl_divergence(&p, &p).abs() < 1e-12);
    }

    #[test]
    fn kl_is_positive_for_different_distributions() {
        let q = [0.9, 0.1];
        let p = [0.5, 0.5];
        assert!(kl_divergence(&q, &p) > 0.0);
    }

    #[test]
    fn normalize_weights_returns_none_for_zero_total() {
        assert!(normalize_weights(vec![0.0, 0.0]).is_none());
    }

    #[test]
    fn normalize_weights_rejects_non_finite_total() {
        let normalized = normalize_weights_with_options(
            vec![f64::INFINITY, 1.0],
            NormalizationFallback::Uniform,
            None,
        )
        .expect("uniform fallback should produce probabilities");
        assert_eq!(normalized, vec![0.5, 0.5]);
    }

    #[test]
    fn sample_categorical_skips_zero_entries() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(sample_categorical(&[0.0, 0.0, 1.0], &mut rng), Some(2));
        }
    }

    #[test]
    fn sample_categorical_reports_shortfall() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample_categorical(&[], &mut rng), None);
        assert_eq!(sample_categorical(&[0.0, 0.0], &mut rng), None);
    }

    #[test]
    fn sample_categorical_matches_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            let idx = sample_categorical(&[0.25, 0.5, 0.25], &mut rng).unwrap();
            counts[idx] += 1;
        }
        assert!(counts[1] > counts[0], "middle entry should dominate");
        assert!(counts[1] > counts[2], "middle entry should dominate");
    }
}
