//! Breadth-first search for the cheapest car-charging schedule.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info};

use crate::config::InstallationConfig;
use crate::devices::{create_devices, create_initial_state};
use crate::sim::{DeviceManipulator, SimulationRequest, SimulationResult, Simulator};
use crate::units::{Money, UnitError};

use super::car_charge::CarCharge;
use super::goals::{OptimizationGoal, OptimizationGoals};
use super::{OptimizationError, OptimizationRequest};

/// A set of manipulators evaluated together in one run.
pub type Schedule = Vec<CarCharge>;

/// Best schedule found and how the search got there.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Run of the best schedule.
    pub simulation_result: SimulationResult,
    pub penalty: Money,
    /// Penalty of the run without any manipulator.
    pub baseline_penalty: Money,
    /// Empty if no schedule beat the baseline.
    pub schedule: Schedule,
    /// Number of evaluated schedules.
    pub iterations: usize,
    /// Best penalty after each iteration.
    pub best_history: Vec<Money>,
}

/// Searches the schedule space around a one-hour charging window.
///
/// Each visited schedule costs one full simulation run. The search stops
/// when the frontier is empty or after `max_iterations` evaluations,
/// whichever comes first.
#[derive(Clone)]
pub struct Optimizer {
    simulator: Simulator,
    max_iterations: usize,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(Simulator::default())
    }
}

impl Optimizer {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

    pub fn new(simulator: Simulator) -> Self {
        Self { simulator, max_iterations: Self::DEFAULT_MAX_ITERATIONS }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builds the installation and searches for its cheapest schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the devices or forecasts cannot be built, or if a
    /// run fails.
    pub fn optimize(
        &self,
        installation: &InstallationConfig,
        goals: &OptimizationGoals,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, OptimizationError> {
        let devices = create_devices(&installation.devices)?;
        let initial_state = create_initial_state(&devices);
        let simulation = SimulationRequest::builder()
            .id("optimization")
            .start(request.start)
            .end(request.end)
            .step(request.step)
            .devices(devices)
            .initial_state(initial_state)
            .forecasts(installation.forecasts()?)
            .currency(installation.currency())
            .build();
        self.search(Arc::new(simulation), goals)
    }

    /// Searches schedules for an already assembled simulation request.
    ///
    /// A schedule replaces the current best only if its penalty is strictly
    /// lower, compared on the unrounded amounts. Ties keep the earlier
    /// (simpler) schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if a run fails or penalties cannot be combined.
    pub fn search(
        &self,
        request: Arc<SimulationRequest>,
        goals: &OptimizationGoals,
    ) -> Result<OptimizationResult, OptimizationError> {
        let baseline = self.simulator.simulate(Arc::clone(&request))?;
        let baseline_penalty = goals.penalty(&baseline)?;
        info!(
            penalty = %baseline_penalty,
            slots = request.slot_count(),
            max_iterations = self.max_iterations,
            "optimization started"
        );

        let mut best = OptimizationResult {
            simulation_result: baseline,
            penalty: baseline_penalty,
            baseline_penalty,
            schedule: Schedule::new(),
            iterations: 0,
            best_history: Vec::new(),
        };

        let mut queue = VecDeque::new();
        let mut queued = HashSet::new();
        let mut visited = HashSet::new();
        let seed = vec![CarCharge::init(request.start, request.end, 1)];
        if seed.iter().all(CarCharge::is_within_horizon) {
            queued.insert(seed.clone());
            queue.push_back(seed);
        }

        while best.iterations < self.max_iterations {
            let Some(candidate) = queue.pop_front() else {
                break;
            };
            queued.remove(&candidate);
            if !visited.insert(candidate.clone()) {
                continue;
            }
            best.iterations += 1;

            let manipulators: Vec<&dyn DeviceManipulator> =
                candidate.iter().map(|m| m as &dyn DeviceManipulator).collect();
            let result = self.simulator.simulate_with(Arc::clone(&request), &manipulators)?;
            let penalty = goals.penalty(&result)?;
            debug!(
                iteration = best.iterations,
                %penalty,
                schedule = %candidate.iter().join(", "),
                "schedule evaluated"
            );

            if improves(penalty, best.penalty)? {
                info!(
                    iteration = best.iterations,
                    %penalty,
                    schedule = %candidate.iter().join(", "),
                    "new best schedule"
                );
                best.simulation_result = result;
                best.penalty = penalty;
                best.schedule = candidate.clone();
            }
            best.best_history.push(best.penalty);

            for neighbor in neighbors(&candidate) {
                if !visited.contains(&neighbor) && queued.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }

        info!(
            iterations = best.iterations,
            baseline = %best.baseline_penalty,
            penalty = %best.penalty,
            "optimization finished"
        );
        Ok(best)
    }
}

/// Whether `candidate` is strictly below `best`, without rounding.
fn improves(candidate: Money, best: Money) -> Result<bool, UnitError> {
    Ok(best.checked_sub(candidate)?.amount() > 0.0)
}

/// Schedules differing from `schedule` in exactly one manipulator.
fn neighbors(schedule: &[CarCharge]) -> Vec<Schedule> {
    schedule
        .iter()
        .enumerate()
        .flat_map(|(index, manipulator)| {
            manipulator.evolute().into_iter().map(move |next| {
                let mut neighbor = schedule.to_vec();
                neighbor[index] = next;
                neighbor
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Berlin;

    use super::*;
    use crate::config::{DeviceConfig, ScenarioConfig};
    use crate::devices::DeviceType;
    use crate::units::Timestamp;

    fn start() -> Timestamp {
        Berlin.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn request(hours: i64) -> OptimizationRequest {
        OptimizationRequest { start: start(), end: start() + TimeDelta::hours(hours), step: TimeDelta::hours(1) }
    }

    fn garage() -> InstallationConfig {
        InstallationConfig {
            devices: vec![
                DeviceConfig {
                    capacity_kwh: Some(50.0),
                    charge_rate_kw: Some(11.0),
                    discharge_rate_kw: Some(11.0),
                    start_storage_level: 0.5,
                    ..DeviceConfig::new(DeviceType::ElectricCar)
                },
                DeviceConfig::new(DeviceType::Grid),
            ],
            ..InstallationConfig::default()
        }
    }

    #[test]
    fn improvement_is_strict_and_unrounded() {
        let best = Money::of_eur(10.0);
        assert!(improves(Money::of_eur(10.0 - 1e-6), best).unwrap());
        assert!(!improves(Money::of_eur(10.0), best).unwrap());
        assert!(!improves(Money::of_eur(10.0 + 1e-6), best).unwrap());

        let francs = Money::new(9.0, "CHF".parse().unwrap());
        assert!(matches!(improves(francs, best), Err(UnitError::CurrencyMismatch { .. })));
    }

    #[test]
    fn charging_beats_the_baseline() {
        let result = Optimizer::default()
            .optimize(&garage(), &OptimizationGoals::default(), &request(12))
            .unwrap();

        // Baseline: 25 kWh minus storage loss, well below the 90% target.
        assert!(Money::of_eur(20.0).is_less_than(result.baseline_penalty).unwrap());
        assert!(result.penalty.is_less_than(result.baseline_penalty).unwrap());
        assert!(!result.schedule.is_empty());
        assert!(result.simulation_result.ledger.imported.is_positive());
    }

    #[test]
    fn best_history_never_increases() {
        let result = Optimizer::default()
            .optimize(&garage(), &OptimizationGoals::default(), &request(12))
            .unwrap();

        assert_eq!(result.best_history.len(), result.iterations);
        for pair in result.best_history.windows(2) {
            assert!(!pair[0].is_less_than(pair[1]).unwrap());
        }
        assert_eq!(result.best_history.last(), Some(&result.penalty));
    }

    #[test]
    fn search_exhausts_a_small_horizon() {
        // Windows inside 3 hours: 3 of 1h, 2 of 2h, 1 of 3h.
        let result = Optimizer::default()
            .optimize(&garage(), &OptimizationGoals::default(), &request(3))
            .unwrap();
        assert_eq!(result.iterations, 6);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let result = Optimizer::default()
            .with_max_iterations(2)
            .optimize(&garage(), &OptimizationGoals::default(), &request(12))
            .unwrap();
        assert_eq!(result.iterations, 2);
        assert_eq!(result.best_history.len(), 2);
    }

    #[test]
    fn without_a_car_the_baseline_stays_best() {
        let mut installation = ScenarioConfig::baseline().installation;
        installation.devices.retain(|d| d.device_type != DeviceType::ElectricCar);
        let result = Optimizer::default()
            .with_max_iterations(5)
            .optimize(&installation, &OptimizationGoals::default(), &request(24))
            .unwrap();
        assert!(result.schedule.is_empty());
        assert_eq!(result.penalty, result.baseline_penalty);
    }

    #[test]
    fn horizon_shorter_than_a_window_evaluates_nothing() {
        let result = Optimizer::default()
            .optimize(&garage(), &OptimizationGoals::default(), &OptimizationRequest {
                step: TimeDelta::minutes(15),
                ..request(0)
            })
            .unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.best_history.is_empty());
    }
}
