//! Ground-truth environment: cell tags, item lists and weather

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::Location;
use crate::{Error, Result};

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Empty,
    Food,
    Predator,
    Shelter,
}

impl CellKind {
    pub fn to_char(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Food => 'F',
            CellKind::Predator => 'P',
            CellKind::Shelter => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
}

impl Weather {
    /// Cloudy weather reduces visibility and makes shelter attractive.
    pub fn is_bad(self) -> bool {
        matches!(self, Weather::Cloudy)
    }

    pub fn toggled(self) -> Weather {
        match self {
            Weather::Sunny => Weather::Cloudy,
            Weather::Cloudy => Weather::Sunny,
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weather::Sunny => f.write_str("sunny"),
            Weather::Cloudy => f.write_str("cloudy"),
        }
    }
}

/// Ground truth of the world.
///
/// The per-kind location lists always mirror the cell tags; every mutation
/// goes through [`Environment::place`] or [`Environment::consume_food`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    size: usize,
    cells: Vec<CellKind>,
    weather: Weather,
    food: Vec<Location>,
    predators: Vec<Location>,
    shelters: Vec<Location>,
}

impl Environment {
    /// Empty grid under sunny weather.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CellKind::Empty; size * size],
            weather: Weather::Sunny,
            food: Vec::new(),
            predators: Vec::new(),
            shelters: Vec::new(),
        }
    }

    /// Starting layout: three food sources, two predators, two shelters.
    ///
    /// Coordinates are laid out for a 10×10 grid and scaled proportionally for
    /// other sizes; items that collapse onto the same cell keep the last one.
    pub fn default_layout(size: usize) -> Self {
        const LAYOUT: [(CellKind, usize, usize); 7] = [
            (CellKind::Food, 2, 7),
            (CellKind::Food, 7, 2),
            (CellKind::Food, 8, 8),
            (CellKind::Predator, 4, 4),
            (CellKind::Predator, 6, 7),
            (CellKind::Shelter, 0, 9),
            (CellKind::Shelter, 9, 0),
        ];

        let mut env = Self::new(size);
        if size == 0 {
            return env;
        }
        for (kind, row, col) in LAYOUT {
            let loc = Location {
                row: row * (size - 1) / 9,
                col: col * (size - 1) / 9,
            };
            env.place_unchecked(kind, loc);
        }
        env
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    /// Flip between sunny and cloudy, returning the new weather.
    pub fn toggle_weather(&mut self) -> Weather {
        self.weather = self.weather.toggled();
        self.weather
    }

    pub fn cell(&self, loc: Location) -> CellKind {
        self.cells
            .get(loc.index(self.size))
            .copied()
            .unwrap_or(CellKind::Empty)
    }

    pub fn cell_at_index(&self, index: usize) -> CellKind {
        self.cells.get(index).copied().unwrap_or(CellKind::Empty)
    }

    pub fn food(&self) -> &[Location] {
        &self.food
    }

    pub fn predators(&self) -> &[Location] {
        &self.predators
    }

    pub fn shelters(&self) -> &[Location] {
        &self.shelters
    }

    /// Locations holding items of `kind`; empty for [`CellKind::Empty`].
    pub fn items(&self, kind: CellKind) -> &[Location] {
        match kind {
            CellKind::Empty => &[],
            CellKind::Food => &self.food,
            CellKind::Predator => &self.predators,
            CellKind::Shelter => &self.shelters,
        }
    }

    /// Placement tool: put `kind` at `loc`, replacing whatever was there.
    ///
    /// [`CellKind::Empty`] erases the cell.
    pub fn place(&mut self, kind: CellKind, loc: Location) -> Result<()> {
        if !loc.is_within(self.size) {
            return Err(Error::InvalidLocation {
                row: loc.row,
                col: loc.col,
                size: self.size,
            });
        }
        self.place_unchecked(kind, loc);
        Ok(())
    }

    fn place_unchecked(&mut self, kind: CellKind, loc: Location) {
        let index = loc.index(self.size);
        let previous = self.cells[index];
        if previous == kind {
            return;
        }
        if let Some(list) = self.list_mut(previous) {
            list.retain(|&item| item != loc);
        }
        self.cells[index] = kind;
        if let Some(list) = self.list_mut(kind) {
            list.push(loc);
        }
    }

    /// Remove food at `loc`; returns whether anything was eaten.
    pub fn consume_food(&mut self, loc: Location) -> bool {
        if !loc.is_within(self.size) || self.cell(loc) != CellKind::Food {
            return false;
        }
        self.place_unchecked(CellKind::Empty, loc);
        true
    }

    fn list_mut(&mut self, kind: CellKind) -> Option<&mut Vec<Location>> {
        match kind {
            CellKind::Empty => None,
            CellKind::Food => Some(&mut self.food),
            CellKind::Predator => Some(&mut self.predators),
            CellKind::Shelter => Some(&mut self.shelters),
        }
    }

    /// Verify that the item lists and the cell tags agree.
    pub fn check_consistency(&self) -> Result<()> {
        for kind in [CellKind::Food, CellKind::Predator, CellKind::Shelter] {
            let listed = self.items(kind);
            for loc in listed {
                let tag = self.cell(*loc);
                if tag != kind {
                    return Err(Error::InconsistentEnvironment {
                        message: format!("{loc} listed as {kind:?} but tagged {tag:?}"),
                    });
                }
            }
            let tagged = self.cells.iter().filter(|&&cell| cell == kind).count();
            if tagged != listed.len() {
                return Err(Error::InconsistentEnvironment {
                    message: format!("{tagged} cells tagged {kind:?} but {} listed", listed.len()),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size.max(1)) {
            let line: String = row.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
