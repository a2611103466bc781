//! Headless run pipeline
//!
//! This module provides:
//! - A runner that drives a simulation for N cycles over one or more episodes
//! - Observers that record what happened in each cycle

pub mod observers;
pub mod runner;

// Re-export observer implementations (adapters)
pub use observers::{
    CycleObservation, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
};
pub use runner::{RunConfig, RunSummary, SimulationRunner};

pub use crate::ports::Observer;
