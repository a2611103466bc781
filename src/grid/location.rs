//! Grid coordinates and their flat-index encoding

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Side length of the default square grid.
pub const DEFAULT_GRID_SIZE: usize = 10;

/// A `(row, col)` cell coordinate.
///
/// Rows grow downwards and columns grow to the right, so `Action::Up`
/// decrements the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    /// Create a location validated against a `size`×`size` grid.
    pub fn new(row: usize, col: usize, size: usize) -> Result<Self> {
        if row >= size || col >= size {
            return Err(Error::InvalidLocation { row, col, size });
        }
        Ok(Self { row, col })
    }

    /// Decode a flat belief index.
    pub fn from_index(index: usize, size: usize) -> Result<Self> {
        let cells = size * size;
        if index >= cells {
            return Err(Error::InvalidIndex { index, cells });
        }
        Ok(Self {
            row: index / size,
            col: index % size,
        })
    }

    /// Flat index `row * size + col` used to address belief vectors.
    pub fn index(self, size: usize) -> usize {
        self.row * size + self.col
    }

    pub fn is_within(self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    pub fn manhattan(self, other: Location) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn squared_distance(self, other: Location) -> f64 {
        let dr = self.row.abs_diff(other.row) as f64;
        let dc = self.col.abs_diff(other.col) as f64;
        dr * dr + dc * dc
    }

    /// Offset by a signed delta; `None` when the result leaves the grid.
    pub fn offset(self, delta: (isize, isize), size: usize) -> Option<Location> {
        let row = self.row.checked_add_signed(delta.0)?;
        let col = self.col.checked_add_signed(delta.1)?;
        let moved = Location { row, col };
        moved.is_within(size).then_some(moved)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
