//! Observer port - abstraction for simulation observation and data collection
//!
//! This port defines the interface for observing simulation events,
//! allowing composable data collection without coupling the cycle loop
//! to specific output formats or metrics.

use crate::{Result, simulation::CycleReport};

/// Observer trait for monitoring a simulation run
///
/// Observers can be composed to collect different types of data during a run.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL export of cycle reports
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_run_start(total_cycles)` - Once at the beginning
/// 2. `on_cycle(report)` - After every completed cycle
/// 3. `on_reset(episode)` - Whenever the runner resets the simulation
/// 4. `on_run_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use gridworld::{ports::Observer, simulation::CycleReport};
///
/// struct FoodCounter {
///     meals: usize,
/// }
///
/// impl Observer for FoodCounter {
///     fn on_cycle(&mut self, report: &CycleReport) -> gridworld::Result<()> {
///         if report.execution.ate_food_at.is_some() {
///             self.meals += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when a run starts.
    ///
    /// # Parameters
    ///
    /// * `total_cycles` - Total number of cycles that will be executed
    fn on_run_start(&mut self, _total_cycles: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each cycle with everything the cycle produced.
    fn on_cycle(&mut self, _report: &CycleReport) -> Result<()> {
        Ok(())
    }

    /// Called after the runner resets the simulation between episodes.
    ///
    /// `episode` is the index of the episode about to start.
    fn on_reset(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called when the run completes.
    ///
    /// Use this to finalize outputs, flush files, or display summaries.
    fn on_run_end(&mut self) -> Result<()> {
        Ok(())
    }
}
