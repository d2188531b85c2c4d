use chrono::{Datelike, NaiveTime, Weekday};

use crate::devices::types::{Device, DeviceType, StepOutcome};
use crate::devices::{Battery, DeviceState};
use crate::sim::{EnergySystem, SimulationError, SimulationStep};
use crate::units::{Energy, Percentage, Timestamp};

/// When a car is away from the charger and how much it uses per trip.
#[derive(Debug, Clone, PartialEq)]
pub struct CarUsageProfile {
    /// Days the car leaves; on all other days it stays home.
    pub days: Vec<Weekday>,
    /// Time of day the car leaves (inclusive).
    pub start_usage: NaiveTime,
    /// Time of day the car returns (exclusive).
    pub end_usage: NaiveTime,
    /// Energy drawn from the car's battery by one trip.
    pub energy_consumption: Energy,
}

impl CarUsageProfile {
    /// Returns true if the car is at the charger at `time`.
    pub fn is_available(&self, time: Timestamp) -> bool {
        if !self.days.contains(&time.weekday()) {
            return true;
        }
        let time_of_day = time.time();
        time_of_day < self.start_usage || time_of_day >= self.end_usage
    }
}

/// An electric car: a battery that is only reachable while at home.
///
/// The car never feeds the installation. While away it neither charges nor
/// loses energy; the trip consumption is booked once, in the first slot the
/// car is back.
#[derive(Debug, Clone)]
pub struct ElectricCar {
    pub battery: Battery,
    pub usage_profile: Option<CarUsageProfile>,
    override_limit: Option<Percentage>,
}

impl ElectricCar {
    pub fn new(battery: Battery, usage_profile: Option<CarUsageProfile>) -> Self {
        Self { battery, usage_profile, override_limit: None }
    }

    /// Replaces the configured force-charging limit until reset.
    pub fn set_override_force_charging_limit(&mut self, limit: Percentage) {
        self.override_limit = Some(limit);
    }

    pub fn reset_override_force_charging_limit(&mut self) {
        self.override_limit = None;
    }

    /// Force-charging limit currently in effect.
    pub fn charging_limit(&self) -> Percentage {
        self.override_limit.unwrap_or(self.battery.force_charging_limit)
    }

    fn is_available(&self, time: Timestamp) -> bool {
        self.usage_profile.as_ref().is_none_or(|profile| profile.is_available(time))
    }

    fn apply_trip_consumption(&self, state: DeviceState) -> DeviceState {
        let Some(profile) = &self.usage_profile else {
            return state;
        };
        state.apply((state.stored_energy() - profile.energy_consumption).max(Energy::ZERO))
    }
}

impl Device for ElectricCar {
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError> {
        let was_available = self.is_available(step.start - step.duration);
        if !self.is_available(step.start) {
            return Ok(StepOutcome::new(ledger.clone(), state));
        }
        let state = if was_available { state } else { self.apply_trip_consumption(state) };
        Ok(self.battery.run(step, ledger, state, self.charging_limit(), false))
    }

    fn initial_state(&self) -> DeviceState {
        self.battery.initial_state()
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::ElectricCar
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Berlin;

    use super::*;
    use crate::forecast::Forecasts;
    use crate::units::Power;

    fn standard_battery() -> Battery {
        Battery::builder()
            .capacity(Energy::from_kwh(50.0))
            .charge_rate(Power::from_kw(11.0))
            .discharge_rate(Power::from_kw(10.0))
            .build()
    }

    fn commuter() -> ElectricCar {
        let profile = CarUsageProfile {
            days: vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            start_usage: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_usage: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            energy_consumption: Energy::from_kwh(15.0),
        };
        ElectricCar::new(standard_battery(), Some(profile))
    }

    /// Hour-long slot on 2023-06-`day`; the 9th is a Friday, the 10th a Saturday.
    fn step(day: u32, hour: u32) -> SimulationStep {
        let start = Berlin.with_ymd_and_hms(2023, 6, day, hour, 0, 0).unwrap();
        SimulationStep::new(start, TimeDelta::hours(1), Forecasts::standard())
    }

    fn sixty_percent() -> DeviceState {
        DeviceState::new(Energy::from_kwh(50.0), Percentage::saturating(0.6))
    }

    fn surplus() -> EnergySystem {
        EnergySystem::INIT.produce(Energy::from_kwh(5.0))
    }

    #[test]
    fn starts_empty_without_grid_charging() {
        let car = ElectricCar::new(standard_battery(), None);
        assert_eq!(car.initial_state().stored_energy(), Energy::ZERO);
        assert_eq!(car.charging_limit(), Percentage::ZERO);
    }

    #[test]
    fn charges_from_surplus_when_home() {
        let car = commuter();
        // Saturday, before work on Friday, after work on Friday.
        for (day, hour) in [(10, 10), (9, 7), (9, 18)] {
            let outcome = car.simulate(&step(day, hour), &surplus(), sixty_percent()).unwrap();
            // 30 kWh minus one hour of storage loss plus 5 kWh at 90%.
            assert_abs_diff_eq!(outcome.state.stored_energy().kwh(), 34.4375, epsilon = 1e-9);
        }
    }

    #[test]
    fn away_car_is_untouched() {
        let car = commuter();
        let outcome = car.simulate(&step(9, 10), &surplus(), sixty_percent()).unwrap();
        assert_eq!(outcome.state, sixty_percent());
        assert_eq!(outcome.ledger, surplus());
    }

    #[test]
    fn trip_consumption_is_booked_on_return() {
        let car = commuter();
        let outcome = car.simulate(&step(9, 17), &EnergySystem::INIT, sixty_percent()).unwrap();
        // 30 kWh minus 15 kWh trip, then one hour of storage loss on the remainder.
        assert_abs_diff_eq!(outcome.state.stored_energy().kwh(), 15.0 - 0.03125, epsilon = 1e-9);
    }

    #[test]
    fn trip_consumption_stops_at_empty() {
        let car = commuter();
        let low = DeviceState::new(Energy::from_kwh(50.0), Percentage::saturating(0.1));
        let outcome = car.simulate(&step(9, 17), &EnergySystem::INIT, low).unwrap();
        assert_eq!(outcome.state.stored_energy(), Energy::ZERO);
    }

    #[test]
    fn never_discharges() {
        let car = commuter();
        let deficit = EnergySystem::INIT.consume(Energy::from_kwh(3.0));
        let outcome = car.simulate(&step(10, 20), &deficit, sixty_percent()).unwrap();
        assert_eq!(outcome.ledger.discharged, Energy::ZERO);
        assert_eq!(outcome.ledger.current_energy(), Energy::from_kwh(-3.0));
    }

    #[test]
    fn override_limit_forces_grid_charging() {
        let mut car = commuter();
        car.set_override_force_charging_limit(Percentage::ONE_HUNDRED);
        let outcome = car.simulate(&step(10, 20), &EnergySystem::INIT, sixty_percent()).unwrap();
        assert_abs_diff_eq!(outcome.ledger.charged.kwh(), 11.0, epsilon = 1e-9);

        car.reset_override_force_charging_limit();
        let outcome = car.simulate(&step(10, 20), &EnergySystem::INIT, sixty_percent()).unwrap();
        assert_eq!(outcome.ledger.charged, Energy::ZERO);
    }
}
