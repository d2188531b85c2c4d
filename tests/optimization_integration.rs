use std::path::Path;

use home_energy_sim::config::ScenarioConfig;
use home_energy_sim::devices::DeviceType;
use home_energy_sim::optimization::{OptimizationGoal, OptimizationResult, Optimizer};
use home_energy_sim::units::Money;

fn optimize(scenario: &ScenarioConfig, max_iterations: usize) -> OptimizationResult {
    let errors = scenario.validate();
    assert!(errors.is_empty(), "invalid scenario: {errors:?}");
    let goals = scenario.goals.to_goals().expect("goals should convert");
    let request = scenario.optimization_request().expect("window should resolve");
    Optimizer::default()
        .with_max_iterations(max_iterations)
        .optimize(&scenario.installation, &goals, &request)
        .expect("optimization should succeed")
}

fn assert_never_worse(result: &OptimizationResult) {
    assert!(!result.baseline_penalty.is_less_than(result.penalty).unwrap());
    for pair in result.best_history.windows(2) {
        assert!(!pair[0].is_less_than(pair[1]).unwrap(), "history went up: {} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn presets_validate() {
    for name in ScenarioConfig::PRESETS {
        let scenario = ScenarioConfig::from_preset(name).unwrap();
        assert!(scenario.validate().is_empty(), "preset {name} should validate");
    }
}

#[test]
fn baseline_preset_finds_a_cheaper_schedule() {
    let result = optimize(&ScenarioConfig::baseline(), 40);

    assert_never_worse(&result);
    assert!(result.penalty.is_less_than(result.baseline_penalty).unwrap());
    assert!(!result.schedule.is_empty());
    assert!(result.iterations <= 40);
    assert_eq!(result.best_history.len(), result.iterations);
}

#[test]
fn reported_penalty_matches_the_best_run() {
    let scenario = ScenarioConfig::baseline();
    let result = optimize(&scenario, 20);
    let goals = scenario.goals.to_goals().unwrap();
    assert_eq!(goals.penalty(&result.simulation_result).unwrap(), result.penalty);
}

#[test]
fn commuter_car_is_charged_around_its_absence() {
    let result = optimize(&ScenarioConfig::commuter(), 60);
    assert_never_worse(&result);

    let car_level = result
        .simulation_result
        .states_of_type(DeviceType::ElectricCar)
        .map(|(_, state)| state.percentage.value())
        .next()
        .expect("commuter has a car");
    assert!((0.0..=1.0).contains(&car_level));
}

#[test]
fn scenario_files_load_and_run() {
    for path in ["scenarios/commuter.toml", "scenarios/market.toml"] {
        let scenario = ScenarioConfig::from_toml_file(Path::new(path)).unwrap();
        let result = optimize(&scenario, 10);
        assert_never_worse(&result);
        assert_eq!(result.penalty.currency(), Money::of_eur(0.0).currency());
    }
}

#[test]
fn market_prices_come_from_the_table() {
    let scenario = ScenarioConfig::from_toml_file(Path::new("scenarios/market.toml")).unwrap();
    let result = optimize(&scenario, 1);

    // Two expanded panels, the default-named consumer, the car and the grid.
    assert_eq!(result.simulation_result.end_state.len(), 5);
    assert!(result.simulation_result.ledger.produced.is_positive());
    assert!(result.simulation_result.ledger.imported.is_positive());
}

#[test]
fn disabling_grid_costs_leaves_only_the_car_penalty() {
    let mut scenario = ScenarioConfig::baseline();
    scenario.goals.grid_using.enabled = false;
    scenario.goals.car_charging.percentage = 0.5;
    let result = optimize(&scenario, 5);
    let goals = scenario.goals.to_goals().unwrap();
    let car_only = goals.car_charging.penalty(&result.simulation_result).unwrap();
    assert_eq!(result.penalty, car_only);
}

#[test]
fn toml_scenario_end_to_end() {
    let toml = r#"
        [simulation]
        id = "inline"
        start = "2026-06-03T00:00"
        end = "2026-06-03T12:00"
        step_minutes = 30

        [[installation.devices]]
        type = "electric_car"
        capacity_kwh = 40.0
        charge_rate_kw = 7.0
        discharge_rate_kw = 7.0
        start_storage_level = 0.2

        [[installation.devices]]
        type = "grid"

        [goals.car_charging]
        percentage = 0.8
        block = 0.2
        price = "10 EUR"
    "#;
    let scenario = ScenarioConfig::from_toml_str(toml).unwrap();
    let result = optimize(&scenario, 200);

    assert_never_worse(&result);
    assert!(result.penalty.is_less_than(result.baseline_penalty).unwrap());
    // 12 hour horizon: every window fits, so the search runs out of candidates first.
    assert!(result.iterations < 200);
}
