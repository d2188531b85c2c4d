use crate::devices::types::{Device, DeviceType, StepOutcome};
use crate::devices::DeviceState;
use crate::sim::{EnergySystem, SimulationError, SimulationStep};
use crate::units::{Energy, Percentage, Power};

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// A stationary battery that stores surplus and covers deficits.
///
/// Each slot the battery first loses a share of its stored energy to
/// self-discharge, then looks at the ledger's current energy:
///
/// - surplus, or charge level below the force-charging limit: charge from
///   the surplus, then top up from the grid until the limit is reached;
/// - deficit: discharge to cover it;
/// - balanced: nothing.
///
/// Charging efficiency applies to what ends up stored, discharging
/// efficiency to what reaches the ledger.
///
/// # Examples
///
/// ```
/// use home_energy_sim::devices::Battery;
/// use home_energy_sim::units::{Energy, Power};
///
/// let battery = Battery::builder()
///     .capacity(Energy::from_kwh(10.0))
///     .charge_rate(Power::from_kw(5.0))
///     .discharge_rate(Power::from_kw(5.0))
///     .build();
/// assert_eq!(battery.charging_efficiency.value(), 0.9);
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct Battery {
    /// Usable storage capacity.
    pub capacity: Energy,

    /// Maximum charging power.
    pub charge_rate: Power,

    /// Maximum discharging power.
    pub discharge_rate: Power,

    /// Share of charged energy that ends up stored.
    #[builder(default = Percentage::saturating(0.9))]
    pub charging_efficiency: Percentage,

    /// Share of discharged energy that reaches the installation.
    #[builder(default = Percentage::saturating(0.9))]
    pub discharging_efficiency: Percentage,

    /// Self-discharge per day, relative to the stored energy.
    #[builder(default = Percentage::saturating(0.05))]
    pub daily_storage_loss: Percentage,

    /// Charge level at the start of a simulation.
    #[builder(default)]
    pub start_storage_level: Percentage,

    /// Below this level the battery charges from the grid even without surplus.
    #[builder(default)]
    pub force_charging_limit: Percentage,
}

impl Battery {
    /// Runs one slot of the battery state machine.
    ///
    /// # Arguments
    ///
    /// * `step` - Current slot
    /// * `ledger` - Ledger before this device
    /// * `state` - Storage state before this slot
    /// * `limit` - Force-charging limit in effect for this slot
    /// * `allow_discharge` - Whether the storage may feed a deficit
    pub(crate) fn run(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
        limit: Percentage,
        allow_discharge: bool,
    ) -> StepOutcome {
        let state = self.apply_storage_loss(step, state);
        let surplus = ledger.current_energy();

        if surplus.is_positive() || state.percentage.is_below(limit) {
            return self.charge(step, ledger, state, limit);
        }
        if surplus.is_negative() && allow_discharge {
            return self.discharge(step, ledger, state);
        }
        StepOutcome::new(ledger.clone(), state)
    }

    fn apply_storage_loss(&self, step: &SimulationStep, state: DeviceState) -> DeviceState {
        let minutes = step.duration.as_seconds_f64() / 60.0;
        let loss_fraction = self.daily_storage_loss.value() * minutes / MINUTES_PER_DAY;
        let stored = state.stored_energy();
        state.apply(stored - stored * loss_fraction)
    }

    fn charge(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
        limit: Percentage,
    ) -> StepOutcome {
        let max_charge = self.charge_rate * step.duration;
        let mut ledger = ledger.clone();
        let mut state = state;

        // From surplus only.
        let stored = state.stored_energy();
        let from_surplus = ledger
            .current_energy()
            .min(max_charge)
            .min(state.max_energy - stored);
        let mut charged = Energy::ZERO;
        if from_surplus.is_positive() {
            ledger = ledger.charge(from_surplus);
            state = state.apply(stored + from_surplus * self.charging_efficiency);
            charged = from_surplus;
        }

        // Top up from the grid; the grid balancer sees this as a deficit.
        if state.percentage.is_below(limit) {
            let stored = state.stored_energy();
            let from_grid = (max_charge - charged)
                .min(state.max_energy - stored)
                .min(state.max_energy * limit.saturating_sub(state.percentage));
            if from_grid.is_positive() {
                ledger = ledger.charge(from_grid);
                state = state.apply(stored + from_grid * self.charging_efficiency);
            }
        }

        StepOutcome::new(ledger, state)
    }

    fn discharge(&self, step: &SimulationStep, ledger: &EnergySystem, state: DeviceState) -> StepOutcome {
        let required = -ledger.current_energy();
        let stored = state.stored_energy();
        let actual = required.min(stored).min(self.discharge_rate * step.duration);
        if !actual.is_positive() {
            return StepOutcome::new(ledger.clone(), state);
        }
        StepOutcome::new(
            ledger.discharge(actual * self.discharging_efficiency),
            state.apply(stored - actual),
        )
    }
}

impl Device for Battery {
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError> {
        Ok(self.run(step, ledger, state, self.force_charging_limit, true))
    }

    fn initial_state(&self) -> DeviceState {
        DeviceState::new(self.capacity, self.start_storage_level)
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Battery
    }
}
