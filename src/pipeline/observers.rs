//! Observer pattern for simulation runs
//!
//! Observers allow composable data collection during a run without coupling
//! the cycle loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{Result, grid::Location, ports::Observer, simulation::CycleReport};

/// Compact record of one cycle, written as one JSON line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleObservation {
    pub episode: usize,
    pub cycle: u64,
    /// Selected policy as arrow symbols
    pub policy: String,
    pub policy_index: usize,
    pub efe: f64,
    pub probability: f64,
    pub start: Location,
    pub end: Location,
    pub observation: Location,
    pub hunger: u32,
    pub ate_food_at: Option<Location>,
    pub predator_contacts: usize,
    pub prior_entropy: f64,
    pub posterior_entropy: f64,
    pub information_gain: f64,
    pub belief_at_truth: f64,
    pub memorised: usize,
}

impl CycleObservation {
    pub fn from_report(episode: usize, report: &CycleReport) -> Self {
        let selected = report.plan.selected_evaluation();
        Self {
            episode,
            cycle: report.cycle,
            policy: selected.map(|e| e.label()).unwrap_or_default(),
            policy_index: report.plan.selected,
            efe: selected.map_or(f64::NAN, |e| e.efe.efe),
            probability: selected.map_or(0.0, |e| e.probability),
            start: report.execution.start,
            end: report.execution.end(),
            observation: report.observation,
            hunger: report.execution.hunger,
            ate_food_at: report.execution.ate_food_at,
            predator_contacts: report.execution.predator_contacts,
            prior_entropy: report.prior_entropy,
            posterior_entropy: report.posterior_entropy,
            information_gain: report.information_gain,
            belief_at_truth: report.belief_at_truth,
            memorised: report.memory.added.len(),
        }
    }
}

/// Progress bar observer - Shows run progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    meals: usize,
    contacts: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            meals: 0,
            contacts: 0,
        }
    }

    fn message(&self) -> String {
        format!("food:{} predator:{}", self.meals, self.contacts)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, total_cycles: usize) -> Result<()> {
        let pb = ProgressBar::new(total_cycles as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} cycles ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_cycle(&mut self, report: &CycleReport) -> Result<()> {
        if report.execution.ate_food_at.is_some() {
            self.meals += 1;
        }
        self.contacts += report.execution.predator_contacts;

        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks behavioural and inferential statistics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    cycles: usize,
    meals: usize,
    predator_contacts: usize,
    localised: usize,
    entropy_sum: f64,
    information_gain_sum: f64,
    belief_at_truth_sum: f64,
    peak_hunger: u32,
    memorised: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn mean(&self, total: f64) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            total / self.cycles as f64
        }
    }

    /// Fraction of cycles that put more than half the belief mass on the true location
    pub fn localisation_accuracy(&self) -> f64 {
        self.mean(self.localised as f64)
    }

    pub fn mean_posterior_entropy(&self) -> f64 {
        self.mean(self.entropy_sum)
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            cycles: self.cycles,
            meals: self.meals,
            predator_contacts: self.predator_contacts,
            peak_hunger: self.peak_hunger,
            memorised: self.memorised,
            localised_cycles: self.localised,
            localisation_accuracy: self.localisation_accuracy(),
            mean_posterior_entropy: self.mean_posterior_entropy(),
            mean_information_gain: self.mean(self.information_gain_sum),
            mean_belief_at_truth: self.mean(self.belief_at_truth_sum),
        }
    }
}

/// Summary of run metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub cycles: usize,
    pub meals: usize,
    pub predator_contacts: usize,
    pub peak_hunger: u32,
    pub memorised: usize,
    pub localised_cycles: usize,
    pub localisation_accuracy: f64,
    pub mean_posterior_entropy: f64,
    pub mean_information_gain: f64,
    pub mean_belief_at_truth: f64,
}

impl Observer for MetricsObserver {
    fn on_cycle(&mut self, report: &CycleReport) -> Result<()> {
        self.cycles += 1;
        if report.execution.ate_food_at.is_some() {
            self.meals += 1;
        }
        self.predator_contacts += report.execution.predator_contacts;
        self.peak_hunger = self.peak_hunger.max(report.execution.hunger);
        self.memorised += report.memory.added.len();
        self.entropy_sum += report.posterior_entropy;
        self.information_gain_sum += report.information_gain;
        self.belief_at_truth_sum += report.belief_at_truth;
        // More than half the mass on the truth also makes it the MAP cell.
        if report.belief_at_truth > 0.5 {
            self.localised += 1;
        }
        Ok(())
    }
}

/// JSONL observer - Exports one [`CycleObservation`] per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
    episode: usize,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create trace file {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            episode: 0,
        })
    }
}

impl Observer for JsonlObserver {
    fn on_reset(&mut self, episode: usize) -> Result<()> {
        self.episode = episode;
        Ok(())
    }

    fn on_cycle(&mut self, report: &CycleReport) -> Result<()> {
        let observation = CycleObservation::from_report(self.episode, report);
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
