//! Subcommands of the `gridworld` binary

pub mod evaluate;
pub mod live;
pub mod run;
