//! Ports (trait boundaries) for external dependencies.
//!
//! The simulation core only knows about these traits; progress bars, file
//! exporters and metric collectors implement them elsewhere.

pub mod observer;

pub use observer::Observer;
