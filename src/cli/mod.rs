//! CLI infrastructure for the grid-world simulation
//!
//! This module provides the command-line interface for running the agent
//! headless, inspecting a planning phase, and driving the live scheduler.

pub mod commands;
pub mod config;
pub mod output;
