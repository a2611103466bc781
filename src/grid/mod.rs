//! Discrete grid world: locations, actions, policies and the environment

pub mod action;
pub mod environment;
pub mod location;

pub use action::{Action, Policy, enumerate_policies, format_policy};
pub use environment::{CellKind, Environment, Weather};
pub use location::{DEFAULT_GRID_SIZE, Location};
