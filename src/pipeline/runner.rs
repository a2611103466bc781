//! Headless runner that drives a simulation for a fixed number of cycles

use serde::{Deserialize, Serialize};
use tracing::info;

use super::observers::{MetricsObserver, MetricsSummary};
use crate::{Error, Result, grid::Location, ports::Observer, simulation::Simulation};

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Cycles per episode
    pub cycles: usize,

    /// Number of episodes; the simulation is reset between episodes
    pub episodes: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cycles: 100,
            episodes: 1,
        }
    }
}

impl RunConfig {
    pub fn total_cycles(&self) -> usize {
        self.cycles.saturating_mul(self.episodes)
    }
}

/// Result of a headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub episodes: usize,
    pub total_cycles: usize,
    pub meals: usize,
    pub predator_contacts: usize,
    /// Cycles in which the posterior put more than half its mass on the truth
    pub localised_cycles: usize,
    pub mean_posterior_entropy: f64,
    pub mean_information_gain: f64,
    pub final_location: Location,
    pub final_hunger: u32,
}

impl RunSummary {
    fn new(episodes: usize, metrics: MetricsSummary, simulation: &Simulation) -> Self {
        Self {
            episodes,
            total_cycles: metrics.cycles,
            meals: metrics.meals,
            predator_contacts: metrics.predator_contacts,
            localised_cycles: metrics.localised_cycles,
            mean_posterior_entropy: metrics.mean_posterior_entropy,
            mean_information_gain: metrics.mean_information_gain,
            final_location: simulation.agent().true_location,
            final_hunger: simulation.agent().hunger,
        }
    }

    pub fn food_rate(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.meals as f64 / self.total_cycles as f64
        }
    }

    /// Save summary to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create summary file {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Runs cycles and notifies observers
pub struct SimulationRunner {
    config: RunConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl SimulationRunner {
    /// Create a new runner
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the runner
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run every episode against `simulation`
    ///
    /// The first episode continues from the simulation's current state; later
    /// episodes start from a reset.
    pub fn run(&mut self, simulation: &mut Simulation) -> Result<RunSummary> {
        let mut metrics = MetricsObserver::new();

        for observer in &mut self.observers {
            observer.on_run_start(self.config.total_cycles())?;
        }

        for episode in 0..self.config.episodes {
            if episode > 0 {
                simulation.reset();
                for observer in &mut self.observers {
                    observer.on_reset(episode)?;
                }
            }

            for _ in 0..self.config.cycles {
                let report = simulation.step();
                metrics.on_cycle(&report)?;
                for observer in &mut self.observers {
                    observer.on_cycle(&report)?;
                }
            }
            info!(
                episode,
                cycles = simulation.cycle(),
                hunger = simulation.agent().hunger,
                "episode finished"
            );
        }

        for observer in &mut self.observers {
            observer.on_run_end()?;
        }

        let metrics = metrics.summary();
        Ok(RunSummary::new(self.config.episodes, metrics, simulation))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::simulation::{CycleReport, SimulationConfig};

    #[derive(Default)]
    struct Events(Arc<Mutex<Vec<String>>>);

    impl Observer for Events {
        fn on_run_start(&mut self, total_cycles: usize) -> Result<()> {
            self.0.lock().unwrap().push(format!("start {total_cycles}"));
            Ok(())
        }

        fn on_cycle(&mut self, report: &CycleReport) -> Result<()> {
            let line = format!("cycle {}", report.cycle);
            self.0.lock().unwrap().push(line);
            Ok(())
        }

        fn on_reset(&mut self, episode: usize) -> Result<()> {
            self.0.lock().unwrap().push(format!("reset {episode}"));
            Ok(())
        }

        fn on_run_end(&mut self) -> Result<()> {
            self.0.lock().unwrap().push("end".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_runner_counts_cycles_and_orders_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let config = RunConfig {
            cycles: 2,
            episodes: 2,
        };
        let mut runner =
            SimulationRunner::new(config).with_observer(Box::new(Events(Arc::clone(&log))));
        let mut simulation =
            Simulation::from_config(SimulationConfig::default().with_seed(42)).unwrap();

        let summary = runner.run(&mut simulation).unwrap();

        assert_eq!(summary.total_cycles, 4);
        assert_eq!(simulation.cycle(), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "start 4", "cycle 1", "cycle 2", "reset 1", "cycle 1", "cycle 2", "end"
            ]
        );
    }

    #[test]
    fn test_summary_round_trips_through_json() {
        let mut simulation =
            Simulation::from_config(SimulationConfig::default().with_seed(3)).unwrap();
        let summary = SimulationRunner::new(RunConfig {
            cycles: 5,
            episodes: 1,
        })
        .run(&mut simulation)
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        summary.save(&path).unwrap();
        let loaded: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, summary);
    }
}
