//! Tests for the headless run pipeline and its observers

use std::{
    fs,
    sync::{Arc, Mutex},
};

use gridworld::{
    Simulation, SimulationConfig,
    export::EfeCsvExporter,
    pipeline::{
        CycleObservation, JsonlObserver, MetricsObserver, Observer, RunConfig, SimulationRunner,
    },
    simulation::CycleReport,
};

/// Lets a test keep reading an observer after handing it to the runner
struct Shared<O>(Arc<Mutex<O>>);

impl<O: Observer> Observer for Shared<O> {
    fn on_run_start(&mut self, total_cycles: usize) -> gridworld::Result<()> {
        self.0.lock().unwrap().on_run_start(total_cycles)
    }

    fn on_cycle(&mut self, report: &CycleReport) -> gridworld::Result<()> {
        self.0.lock().unwrap().on_cycle(report)
    }

    fn on_reset(&mut self, episode: usize) -> gridworld::Result<()> {
        self.0.lock().unwrap().on_reset(episode)
    }

    fn on_run_end(&mut self) -> gridworld::Result<()> {
        self.0.lock().unwrap().on_run_end()
    }
}

fn seeded(seed: u64) -> Simulation {
    Simulation::from_config(SimulationConfig::default().with_seed(seed)).unwrap()
}

#[test]
fn test_runner_and_metrics_agree() {
    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut runner = SimulationRunner::new(RunConfig {
        cycles: 25,
        episodes: 2,
    })
    .with_observer(Box::new(Shared(Arc::clone(&metrics))));

    let mut simulation = seeded(42);
    let summary = runner.run(&mut simulation).unwrap();
    let observed = metrics.lock().unwrap().summary();

    assert_eq!(summary.total_cycles, 50);
    assert_eq!(observed.cycles, 50);
    assert_eq!(observed.meals, summary.meals);
    assert_eq!(observed.predator_contacts, summary.predator_contacts);
    assert_eq!(observed.localised_cycles, summary.localised_cycles);
    assert_eq!(
        observed.mean_posterior_entropy,
        summary.mean_posterior_entropy
    );
    assert_eq!(
        observed.mean_information_gain,
        summary.mean_information_gain
    );
    let accuracy = summary.localised_cycles as f64 / summary.total_cycles as f64;
    assert_eq!(observed.localisation_accuracy, accuracy);
    assert!((0.0..=1.0).contains(&summary.food_rate()));
}

#[test]
fn test_jsonl_trace_tags_episodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let mut runner = SimulationRunner::new(RunConfig {
        cycles: 4,
        episodes: 3,
    })
    .with_observer(Box::new(JsonlObserver::new(&path).unwrap()));

    runner.run(&mut seeded(9)).unwrap();

    let records: Vec<CycleObservation> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 12);
    assert_eq!(
        records.iter().map(|r| r.episode).collect::<Vec<_>>(),
        vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]
    );
    assert!(records.iter().all(|r| (1..=4).contains(&r.cycle)));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let mut simulation = seeded(123);
        SimulationRunner::new(RunConfig {
            cycles: 30,
            episodes: 1,
        })
        .run(&mut simulation)
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_csv_export_marks_selected_policy() {
    let mut simulation = seeded(5);
    let plan = simulation.plan();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("efe.csv");
    EfeCsvExporter::export(&path, 0, &plan).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let selected: Vec<usize> = reader
        .records()
        .map(|record| record.unwrap())
        .filter(|record| &record[8] == "true")
        .map(|record| record[1].parse().unwrap())
        .collect();
    assert_eq!(selected, vec![plan.selected]);
}
