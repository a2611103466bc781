//! Memory of item locations confirmed by confident beliefs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    beliefs::Belief,
    grid::{CellKind, Environment, Location},
};

/// Posterior mass a cell must exceed before its contents are memorised.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Locations the agent has confirmed to hold food, predators or shelter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownLocations {
    pub food: BTreeSet<Location>,
    pub predators: BTreeSet<Location>,
    pub shelters: BTreeSet<Location>,
}

/// What changed in memory during one perception phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUpdate {
    pub added: Vec<(CellKind, Location)>,
    pub forgotten: Vec<Location>,
}

impl MemoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.forgotten.is_empty()
    }
}

impl KnownLocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self, kind: CellKind) -> Option<&BTreeSet<Location>> {
        match kind {
            CellKind::Empty => None,
            CellKind::Food => Some(&self.food),
            CellKind::Predator => Some(&self.predators),
            CellKind::Shelter => Some(&self.shelters),
        }
    }

    fn items_mut(&mut self, kind: CellKind) -> Option<&mut BTreeSet<Location>> {
        match kind {
            CellKind::Empty => None,
            CellKind::Food => Some(&mut self.food),
            CellKind::Predator => Some(&mut self.predators),
            CellKind::Shelter => Some(&mut self.shelters),
        }
    }

    pub fn contains(&self, kind: CellKind, loc: Location) -> bool {
        self.items(kind).is_some_and(|set| set.contains(&loc))
    }

    pub fn is_empty(&self) -> bool {
        self.food.is_empty() && self.predators.is_empty() && self.shelters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.food.len() + self.predators.len() + self.shelters.len()
    }

    pub fn clear(&mut self) {
        self.food.clear();
        self.predators.clear();
        self.shelters.clear();
    }

    /// Memorise items at confidently believed cells and forget vanished food.
    ///
    /// Only food is transient; predator and shelter entries persist.
    pub fn update(
        &mut self,
        posterior: &Belief,
        environment: &Environment,
        threshold: f64,
    ) -> MemoryUpdate {
        let mut delta = MemoryUpdate::default();

        for loc in posterior.confident_cells(threshold) {
            let kind = environment.cell(loc);
            if let Some(set) = self.items_mut(kind)
                && set.insert(loc)
            {
                delta.added.push((kind, loc));
            }
        }

        let stale: Vec<Location> = self
            .food
            .iter()
            .copied()
            .filter(|&loc| environment.cell(loc) != CellKind::Food)
            .collect();
        for loc in stale {
            self.food.remove(&loc);
            delta.forgotten.push(loc);
        }

        if !delta.is_empty() {
            debug!(
                added = delta.added.len(),
                forgotten = delta.forgotten.len(),
                "memory updated"
            );
        }
        delta
    }
}
