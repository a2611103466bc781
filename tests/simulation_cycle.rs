//! Full plan → execute → perceive cycles

use gridworld::{
    Action, CellKind, Environment, Error, Phase, Simulation, SimulationConfig, SimulationParams,
    Weather,
};

mod common;

use common::{assert_normalized, empty_world, exact_params, loc, policy_index};

fn two_food_world() -> Simulation {
    let mut environment = Environment::new(10);
    environment.place(CellKind::Food, loc(0, 1)).unwrap();
    environment.place(CellKind::Food, loc(0, 2)).unwrap();
    Simulation::from_config(
        SimulationConfig::new(exact_params())
            .with_environment(environment)
            .with_start(loc(0, 0))
            .with_seed(7),
    )
    .unwrap()
}

#[test]
fn confident_belief_on_food_is_memorised_within_one_cycle() {
    let mut simulation = two_food_world();
    let index = policy_index(&simulation, &[Action::Right, Action::Right, Action::Stay]);
    let report = simulation.execute(index).unwrap();

    assert_eq!(report.execution.ate_food_at, Some(loc(0, 1)));
    assert_eq!(report.execution.end(), loc(0, 2));
    assert_eq!(simulation.agent().hunger, 0);
    assert!(simulation.memory().food.contains(&loc(0, 2)));
    assert!(report.memory.added.contains(&(CellKind::Food, loc(0, 2))));
    assert!(!simulation.memory().food.contains(&loc(0, 1)));
}

#[test]
fn remembered_food_is_forgotten_once_eaten() {
    let mut simulation = two_food_world();
    let right_right = policy_index(&simulation, &[Action::Right, Action::Right, Action::Stay]);
    simulation.execute(right_right).unwrap();
    assert!(simulation.memory().food.contains(&loc(0, 2)));

    // Step off and back on to eat the remembered item.
    let left_right = policy_index(&simulation, &[Action::Left, Action::Right, Action::Stay]);
    let report = simulation.execute(left_right).unwrap();
    assert_eq!(report.execution.ate_food_at, Some(loc(0, 2)));
    assert!(simulation.memory().food.is_empty());
    assert_eq!(report.memory.forgotten, vec![loc(0, 2)]);
}

#[test]
fn hunger_grows_and_saturates_without_food() {
    let params = exact_params();
    let cap = params.hunger_cap();
    let mut simulation = empty_world(params, loc(5, 5), 4);
    let stay = policy_index(&simulation, &[Action::Stay; 3]);

    simulation.execute(stay).unwrap();
    assert_eq!(simulation.agent().hunger, 3);
    for _ in 0..20 {
        simulation.execute(stay).unwrap();
    }
    assert_eq!(simulation.agent().hunger, cap);
}

#[test]
fn cycles_keep_every_invariant() {
    let mut simulation =
        Simulation::from_config(SimulationConfig::default().with_seed(2024)).unwrap();
    for cycle in 1..=30 {
        let report = simulation.step();
        assert_eq!(report.cycle, cycle);
        assert_normalized(&simulation.agent().belief);
        assert!(simulation.environment().check_consistency().is_ok());
        assert!(simulation.agent().hunger <= simulation.params().hunger_cap());
        assert_eq!(report.plan.evaluations.len(), 125);
        let evaluations = &report.plan.evaluations;
        assert!(evaluations.iter().all(|e| e.efe.efe.abs() <= 1000.0));
        if cycle == 15 {
            simulation.toggle_weather();
        }
    }
    assert_eq!(simulation.environment().weather(), Weather::Cloudy);
}

#[test]
fn same_seed_gives_identical_trajectories() {
    let run = || {
        let mut simulation =
            Simulation::from_config(SimulationConfig::default().with_seed(77)).unwrap();
        (0..12)
            .map(|_| {
                let report = simulation.step();
                (report.plan.selected, report.observation, report.execution.hunger)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_returns_to_idle_initial_conditions() {
    let mut simulation =
        Simulation::from_config(SimulationConfig::default().with_seed(5)).unwrap();
    let initial = simulation.snapshot();
    for _ in 0..6 {
        simulation.step();
    }
    simulation.place(CellKind::Predator, loc(1, 1)).unwrap();

    simulation.reset();
    let snapshot = simulation.snapshot();
    assert_eq!(simulation.phase(), Phase::Idle);
    assert_eq!(snapshot, initial);
}

#[test]
fn invalid_parameters_are_rejected() {
    let params = SimulationParams::default().with_precision(25.0);
    assert!(matches!(
        Simulation::new(params),
        Err(Error::InvalidParameter { .. })
    ));

    let mut simulation = Simulation::new(SimulationParams::default()).unwrap();
    assert!(simulation.place(CellKind::Food, loc(10, 0)).is_err());
    assert!(matches!(
        simulation.execute(125),
        Err(Error::InvalidPolicy { count: 125, .. })
    ));
}
