//! Action alphabet and fixed-length policy enumeration

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::Location;

/// A single movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stay,
    Up,
    Down,
    Left,
    Right,
}

/// Ordered policy of actions considered as a unit during planning.
pub type Policy = Vec<Action>;

impl Action {
    /// Every action, in enumeration order.
    pub const ALL: [Action; 5] = [
        Action::Stay,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
    ];

    /// `(row, col)` displacement of the intended move.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Stay => (0, 0),
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// Directions the agent may slip into when attempting this move.
    pub fn perpendicular(self) -> &'static [Action] {
        match self {
            Action::Stay => &[],
            Action::Up | Action::Down => &[Action::Left, Action::Right],
            Action::Left | Action::Right => &[Action::Up, Action::Down],
        }
    }

    /// Target of the move, or `None` if it would leave the grid.
    pub fn apply(self, from: Location, size: usize) -> Option<Location> {
        from.offset(self.delta(), size)
    }

    /// Target of the move with off-grid attempts treated as staying put.
    pub fn apply_clamped(self, from: Location, size: usize) -> Location {
        self.apply(from, size).unwrap_or(from)
    }

    pub fn symbol(self) -> char {
        match self {
            Action::Stay => '·',
            Action::Up => '↑',
            Action::Down => '↓',
            Action::Left => '←',
            Action::Right => '→',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Stay => "stay",
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        };
        f.write_str(name)
    }
}

/// Build the Cartesian power of [`Action::ALL`].
///
/// Policies are ordered lexicographically with the last action varying
/// fastest, so index 0 is the all-`Stay` policy.
///
/// ```
/// use gridworld::grid::{Action, enumerate_policies};
///
/// let policies = enumerate_policies(3);
/// assert_eq!(policies.len(), 125);
/// assert_eq!(policies[0], vec![Action::Stay; 3]);
/// assert_eq!(policies[1], vec![Action::Stay, Action::Stay, Action::Up]);
/// ```
pub fn enumerate_policies(length: usize) -> Vec<Policy> {
    let mut policies: Vec<Policy> = vec![Vec::with_capacity(length)];
    for _ in 0..length {
        policies = policies
            .into_iter()
            .flat_map(|prefix| {
                Action::ALL.iter().map(move |&action| {
                    let mut extended = prefix.clone();
                    extended.push(action);
                    extended
                })
            })
            .collect();
    }
    policies
}

/// Compact arrow rendering of a policy, e.g. `→→·`.
pub fn format_policy(policy: &[Action]) -> String {
    policy.iter().map(|action| action.symbol()).collect()
}
