//! Simulation engine threading the ledger through devices slot by slot.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{debug, trace, warn};

use crate::devices::{Device, DeviceMap, DeviceRef, DeviceState};

use super::manipulator::DeviceManipulator;
use super::metrics::{NoopExporter, SimulationMetricsExporter};
use super::types::{SimulationError, SimulationRequest, SimulationResult, SimulationStep};
use super::EnergySystem;

/// Runs simulation requests and reports every slot to a metrics sink.
///
/// Stateless between runs: each run works on its own copy of the request's
/// devices and states, so one simulator can serve many runs.
#[derive(Clone)]
pub struct Simulator {
    exporter: Arc<dyn SimulationMetricsExporter>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Arc::new(NoopExporter))
    }
}

impl Simulator {
    pub fn new(exporter: Arc<dyn SimulationMetricsExporter>) -> Self {
        Self { exporter }
    }

    /// Runs `request` without manipulators.
    ///
    /// # Errors
    ///
    /// See [`Simulator::simulate_with`].
    pub fn simulate(&self, request: Arc<SimulationRequest>) -> Result<SimulationResult, SimulationError> {
        self.simulate_with(request, &[])
    }

    /// Runs `request`, applying `manipulators` at the start of every slot.
    ///
    /// Slots are executed back to back from `request.start` while the slot
    /// start lies before `request.end`. Within a slot devices run in
    /// [`DeviceRef`] order, so the grid balancer always closes the slot.
    ///
    /// # Arguments
    ///
    /// * `request` - Devices, horizon, step and forecasts of the run
    /// * `manipulators` - Overrides applied in the given order
    ///
    /// # Errors
    ///
    /// Returns an error if the step is not positive, the horizon ends before
    /// it starts, or a device fails (missing forecast, currency mismatch).
    /// Metrics export failures are logged and do not abort the run.
    pub fn simulate_with(
        &self,
        request: Arc<SimulationRequest>,
        manipulators: &[&dyn DeviceManipulator],
    ) -> Result<SimulationResult, SimulationError> {
        if request.step <= TimeDelta::zero() {
            return Err(SimulationError::InvalidStep(request.step));
        }
        if request.end < request.start {
            return Err(SimulationError::InvalidHorizon { start: request.start, end: request.end });
        }

        let mut devices = request.devices.clone();
        let mut state = request.initial_state.clone();
        let mut ledger = EnergySystem::init(request.currency);
        let mut step = request.first_step();
        debug!(
            id = %request.id,
            slots = request.slot_count(),
            devices = devices.len(),
            manipulators = manipulators.len(),
            "simulation started"
        );

        while step.start < request.end {
            for manipulator in manipulators {
                manipulator.apply(step.start, &mut devices);
            }
            let before = ledger.clone();
            ledger = execute_slot(&step, &devices, &mut state, ledger)?;
            self.export_slot(&request, &step, &state, &before, &ledger);
            step = step.next_time_slot();
        }

        debug!(id = %request.id, %ledger, "simulation finished");
        Ok(SimulationResult { request, last_step: step, end_state: state, ledger })
    }

    fn export_slot(
        &self,
        request: &Arc<SimulationRequest>,
        step: &SimulationStep,
        state: &BTreeMap<DeviceRef, DeviceState>,
        before: &EnergySystem,
        after: &EnergySystem,
    ) {
        if !self.exporter.is_enabled() {
            return;
        }
        let delta = match after.subtract(before) {
            Ok(delta) => delta,
            Err(error) => {
                warn!(%error, slot = %step.start, "cannot compute slot delta");
                return;
            }
        };
        let slot = SimulationResult {
            request: Arc::clone(request),
            last_step: step.clone(),
            end_state: state.clone(),
            ledger: delta,
        };
        if let Err(error) = self.exporter.export_metrics(&slot) {
            warn!(%error, slot = %step.start, "metrics export failed");
        }
    }
}

/// Runs every device once, in map order, and returns the updated ledger.
fn execute_slot(
    step: &SimulationStep,
    devices: &DeviceMap,
    state: &mut BTreeMap<DeviceRef, DeviceState>,
    mut ledger: EnergySystem,
) -> Result<EnergySystem, SimulationError> {
    for (device_ref, device) in devices {
        let current = state.get(device_ref).copied().unwrap_or_else(|| device.initial_state());
        let outcome = device.simulate(step, &ledger, current)?;

        if outcome.state != current {
            trace!(device = %device_ref, slot = %step.start, state = %outcome.state, "state changed");
        }
        if outcome.ledger != ledger {
            trace!(
                device = %device_ref,
                slot = %step.start,
                current_energy = %outcome.ledger.current_energy(),
                "ledger changed"
            );
        }

        state.insert(device_ref.clone(), outcome.state);
        ledger = outcome.ledger;
    }
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    use super::*;
    use crate::devices::{Battery, DeviceType, FixedConsumer, GridBalancer, HomeDevice, PanelStatistics, SolarPanel};
    use crate::units::{Energy, Money, Percentage, Power, Timestamp};

    fn start() -> Timestamp {
        Berlin.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn house() -> DeviceMap {
        let mut devices = DeviceMap::new();
        devices.insert(
            DeviceRef::new(DeviceType::SolarPanel, "Roof"),
            SolarPanel::new(Power::from_kw(4.0), Percentage::ONE_HUNDRED, PanelStatistics::Full).into(),
        );
        devices.insert(
            DeviceRef::new(DeviceType::NoisyUsage, "House"),
            FixedConsumer::new(Power::from_kw(1.0)).into(),
        );
        devices.insert(DeviceRef::new(DeviceType::Grid, "Grid"), GridBalancer.into());
        devices
    }

    fn request(devices: DeviceMap, hours: i64) -> Arc<SimulationRequest> {
        Arc::new(
            SimulationRequest::builder()
                .id("engine-test")
                .start(start())
                .end(start() + TimeDelta::hours(hours))
                .step(TimeDelta::hours(1))
                .devices(devices)
                .build(),
        )
    }

    #[test]
    fn one_day_balances_production_and_consumption() {
        let result = Simulator::default().simulate(request(house(), 24)).unwrap();

        // Flat weather: 2 hours at 90% and 8 hours at 100% of 4 kW.
        assert_abs_diff_eq!(result.ledger.produced.kwh(), 4.0 * (2.0 * 0.9 + 8.0), epsilon = 1e-9);
        assert_abs_diff_eq!(result.ledger.consumed.kwh(), 24.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.ledger.current_energy().kwh(), 0.0, epsilon = 1e-9);
        assert_eq!(result.last_step.start, start() + TimeDelta::hours(24));
    }

    #[test]
    fn devices_without_initial_state_start_from_their_own() {
        let mut devices = house();
        let battery = Battery::builder()
            .capacity(Energy::from_kwh(10.0))
            .charge_rate(Power::from_kw(2.0))
            .discharge_rate(Power::from_kw(2.0))
            .start_storage_level(Percentage::saturating(0.5))
            .build();
        let battery_ref = DeviceRef::new(DeviceType::Battery, "Battery");
        devices.insert(battery_ref.clone(), HomeDevice::Battery(battery));

        let result = Simulator::default().simulate(request(devices, 1)).unwrap();
        let state = result.state_of(&battery_ref).unwrap();
        // Midnight: 1 kWh deficit covered by the battery.
        assert!(state.stored_energy() < Energy::from_kwh(5.0));
        assert_abs_diff_eq!(result.ledger.discharged.kwh(), 0.9, epsilon = 1e-9);
        assert_eq!(result.end_state.len(), 4);
    }

    #[test]
    fn empty_horizon_returns_initial_ledger() {
        let result = Simulator::default().simulate(request(house(), 0)).unwrap();
        assert_eq!(result.ledger, EnergySystem::INIT);
        assert!(result.end_state.is_empty());
    }

    #[test]
    fn rejects_non_positive_step() {
        let mut req = (*request(house(), 1)).clone();
        req.step = TimeDelta::zero();
        let err = Simulator::default().simulate(Arc::new(req)).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidStep(_)));
    }

    #[test]
    fn rejects_inverted_horizon() {
        let err = Simulator::default().simulate(request(house(), -2)).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidHorizon { .. }));
    }

    #[test]
    fn grid_costs_follow_flat_prices() {
        let mut devices = DeviceMap::new();
        devices.insert(
            DeviceRef::new(DeviceType::NoisyUsage, "House"),
            FixedConsumer::new(Power::from_kw(1.0)).into(),
        );
        devices.insert(DeviceRef::new(DeviceType::Grid, "Grid"), GridBalancer.into());
        let result = Simulator::default().simulate(request(devices, 10)).unwrap();
        assert_eq!(result.ledger.energy_revenue(), Money::of_eur(-3.9));
    }
}
