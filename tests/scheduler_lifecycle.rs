//! Run / pause / step / reset through the scheduler actor

use std::time::Duration;

use gridworld::{
    CellKind, Phase, Scheduler, Simulation, SimulationConfig, SimulationParams, Weather,
};
use tokio::{
    task::yield_now,
    time::{advance, sleep},
};

mod common;

use common::loc;

fn seeded(delay_ms: u64) -> Simulation {
    let params = SimulationParams::default().with_step_delay_ms(delay_ms);
    Simulation::from_config(SimulationConfig::new(params).with_seed(31)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn snapshots_follow_the_run_loop() {
    let handle = Scheduler::spawn(seeded(200));
    let mut updates = handle.subscribe();
    assert_eq!(updates.borrow().phase, Phase::Idle);

    handle.run().await.unwrap();
    let mut seen = Vec::new();
    while seen.len() < 3 {
        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        if seen.last() != Some(&snapshot.cycle) && snapshot.cycle > 0 {
            assert_eq!(snapshot.phase, Phase::Scheduled);
            assert_eq!(snapshot.phase_label, "Running");
            seen.push(snapshot.cycle);
        }
    }
    assert_eq!(seen, vec![1, 2, 3]);

    handle.pause().await.unwrap();
    let simulation = handle.shutdown().await.unwrap();
    assert_eq!(simulation.phase(), Phase::Paused);
}

#[tokio::test(start_paused = true)]
async fn pause_keeps_state_and_step_resumes_manually() {
    let handle = Scheduler::spawn(seeded(100));
    handle.run().await.unwrap();
    sleep(Duration::from_millis(250)).await;
    handle.pause().await.unwrap();
    sleep(Duration::from_millis(10)).await;

    let paused = handle.snapshot();
    assert_eq!(paused.cycle, 2);
    assert_eq!(paused.phase, Phase::Paused);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.snapshot().cycle, 2);

    let report = handle.step().await.unwrap();
    let report = report.expect("paused scheduler steps");
    assert_eq!(report.cycle, 3);
    assert_eq!(handle.snapshot().phase, Phase::Paused);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn pause_queued_before_a_due_cycle_wins() {
    let handle = Scheduler::spawn(seeded(100));
    handle.run().await.unwrap();
    yield_now().await;

    // The pause is queued before the clock reaches the deadline, so both
    // are ready when the actor next wakes.
    handle.pause().await.unwrap();
    advance(Duration::from_millis(150)).await;
    sleep(Duration::from_secs(1)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.cycle, 0);
    assert_eq!(snapshot.phase, Phase::Idle);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_while_running_never_fires_a_stale_cycle() {
    let handle = Scheduler::spawn(seeded(100));
    handle.run().await.unwrap();
    sleep(Duration::from_millis(150)).await;
    handle.reset().await.unwrap();
    sleep(Duration::from_secs(2)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.cycle, 0);
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.last_observation.is_none());

    // Running again after reset starts from the first cycle.
    handle.run().await.unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(handle.snapshot().cycle, 1);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn delay_changes_apply_to_the_next_cycle() {
    let handle = Scheduler::spawn(seeded(1000));
    handle.set_delay(Duration::from_millis(50)).await.unwrap();
    handle.run().await.unwrap();
    sleep(Duration::from_millis(260)).await;
    assert_eq!(handle.snapshot().cycle, 5);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn edits_are_published_immediately() {
    let handle = Scheduler::spawn(seeded(500));
    handle.toggle_weather().await.unwrap();
    handle.place(CellKind::Shelter, loc(5, 5)).await.unwrap();
    sleep(Duration::from_millis(1)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.environment.weather(), Weather::Cloudy);
    assert_eq!(snapshot.environment.cell(loc(5, 5)), CellKind::Shelter);
    handle.shutdown().await.unwrap();
}
