//! Belief state over the agent's own location.
//!
//! A [`Belief`] is a probability vector with one entry per grid cell, indexed
//! by [`Location::index`]. Every constructor leaves it non-negative and
//! normalised; collapsed mass is replaced by the uniform distribution so the
//! vector is never all-zero.

use serde::Serialize;
use tracing::warn;

use crate::{
    grid::Location,
    utils::{NormalizationFallback, normalize_weights_with_options, shannon_entropy, uniform},
};

/// Probability assigned to the start cell by [`Belief::near_deterministic`].
pub const DEFAULT_INITIAL_CONFIDENCE: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Belief {
    size: usize,
    probabilities: Vec<f64>,
}

impl Belief {
    /// Maximum-entropy belief over a `size`×`size` grid.
    pub fn uniform(size: usize) -> Self {
        Self {
            size,
            probabilities: uniform(size * size),
        }
    }

    /// All mass on a single cell.
    pub fn one_hot(loc: Location, size: usize) -> Self {
        let mut probabilities = vec![0.0; size * size];
        if let Some(slot) = probabilities.get_mut(loc.index(size)) {
            *slot = 1.0;
        }
        Self {
            size,
            probabilities,
        }
    }

    /// `confidence` at `loc`, remaining mass spread evenly over the other cells.
    pub fn near_deterministic(loc: Location, size: usize, confidence: f64) -> Self {
        let cells = size * size;
        if cells <= 1 {
            return Self::one_hot(loc, size);
        }
        let confidence = confidence.clamp(0.0, 1.0);
        let rest = (1.0 - confidence) / (cells - 1) as f64;
        let mut probabilities = vec![rest; cells];
        probabilities[loc.index(size)] = confidence;
        Self {
            size,
            probabilities,
        }
    }

    /// Normalise arbitrary weights; `None` if their mass has collapsed.
    ///
    /// Negative and non-finite entries are treated as zero.
    pub fn try_from_weights(weights: Vec<f64>, size: usize) -> Option<Self> {
        let cleaned = weights
            .into_iter()
            .map(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 });
        normalize_weights_with_options(cleaned, NormalizationFallback::None, None).map(
            |probabilities| Self {
                size,
                probabilities,
            },
        )
    }

    /// Normalise arbitrary weights, falling back to uniform on collapse.
    ///
    /// `stage` names the computation in the diagnostic emitted on fallback.
    pub fn from_weights(weights: Vec<f64>, size: usize, stage: &str) -> Self {
        Self::try_from_weights(weights, size).unwrap_or_else(|| {
            warn!(stage, "belief mass collapsed to zero; resetting to uniform");
            Self::uniform(size)
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn into_probabilities(self) -> Vec<f64> {
        self.probabilities
    }

    pub fn probability_at(&self, loc: Location) -> f64 {
        self.probabilities
            .get(loc.index(self.size))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    pub fn entropy(&self) -> f64 {
        shannon_entropy(self.probabilities.iter().copied())
    }

    /// Maximum a posteriori cell (lowest index wins ties).
    pub fn most_likely(&self) -> Location {
        let mut index = 0;
        let mut best = f64::NEG_INFINITY;
        for (idx, &p) in self.probabilities.iter().enumerate() {
            if p > best {
                index = idx;
                best = p;
            }
        }
        Location {
            row: index / self.size.max(1),
            col: index % self.size.max(1),
        }
    }

    /// Cells whose probability exceeds `threshold`.
    pub fn confident_cells(&self, threshold: f64) -> impl Iterator<Item = Location> + '_ {
        let size = self.size;
        self.probabilities
            .iter()
            .enumerate()
            .filter(move |&(_, &p)| p > threshold)
            .map(move |(idx, _)| Location {
                row: idx / size,
                col: idx % size,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location { row, col }
    }

    #[test]
    fn near_deterministic_is_normalized() {
        let belief = Belief::near_deterministic(loc(3, 4), 10, DEFAULT_INITIAL_CONFIDENCE);
        assert!((belief.total() - 1.0).abs() < 1e-12);
        assert_eq!(belief.probability_at(loc(3, 4)), 0.99);
        assert!((belief.probability_at(loc(0, 0)) - 0.01 / 99.0).abs() < 1e-15);
        assert_eq!(belief.most_likely(), loc(3, 4));
    }

    #[test]
    fn entropy_bounds() {
        let uniform = Belief::uniform(10);
        assert!((uniform.entropy() - 100f64.ln()).abs() < 1e-9);
        let one_hot = Belief::one_hot(loc(0, 0), 10);
        assert_eq!(one_hot.entropy(), 0.0);
    }

    #[test]
    fn collapsed_weights_fall_back_to_uniform() {
        let belief = Belief::from_weights(vec![0.0; 9], 3, "test");
        assert_eq!(belief, Belief::uniform(3));
        assert!(Belief::try_from_weights(vec![0.0; 9], 3).is_none());
    }

    #[test]
    fn negative_and_nan_weights_are_ignored() {
        let mut weights = vec![0.0; 4];
        weights[0] = -1.0;
        weights[1] = f64::NAN;
        weights[2] = 3.0;
        let belief = Belief::from_weights(weights, 2, "test");
        assert_eq!(belief.probabilities(), &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn confident_cells_filters_by_threshold() {
        let belief = Belief::near_deterministic(loc(1, 1), 3, 0.7);
        let cells: Vec<_> = belief.confident_cells(0.6).collect();
        assert_eq!(cells, vec![loc(1, 1)]);
    }
}
