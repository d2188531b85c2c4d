use chrono::Timelike;

use crate::devices::types::{Device, DeviceType, StepOutcome};
use crate::devices::DeviceState;
use crate::sim::{EnergySystem, SimulationError, SimulationStep};
use crate::units::{Percentage, Power, Timestamp};

/// Placement efficiency of a panel over the day.
///
/// Captures orientation and shading: how much of the rated production
/// reaches the inverter at a given time of day under full sun.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelStatistics {
    /// 100% at every hour.
    Full,
    /// Sine arc between two times of day (minutes after midnight), peaking at 85%.
    Curved { start_minute: u32, end_minute: u32 },
    /// Efficiency per hour of day; hours beyond the table yield nothing.
    Hourly(Vec<Percentage>),
}

impl PanelStatistics {
    /// Sine arc from 08:00 to 17:00.
    pub const CURVED: Self = Self::Curved { start_minute: 8 * 60, end_minute: 17 * 60 };

    const CURVE_PEAK: f64 = 0.85;

    pub fn efficiency(&self, time: Timestamp) -> Percentage {
        match self {
            Self::Full => Percentage::ONE_HUNDRED,
            Self::Curved { start_minute, end_minute } => {
                let minute = time.hour() * 60 + time.minute();
                if minute < *start_minute || minute >= *end_minute {
                    return Percentage::ZERO;
                }
                let normalized =
                    f64::from(minute - start_minute) / f64::from(end_minute - start_minute);
                Percentage::saturating((normalized * std::f64::consts::PI).sin() * Self::CURVE_PEAK)
            }
            Self::Hourly(table) => {
                table.get(time.hour() as usize).copied().unwrap_or(Percentage::ZERO)
            }
        }
    }
}

/// A rooftop solar array without storage.
///
/// Produces `production × sun × placement × inverter efficiency` over each slot,
/// where the sun probability comes from the weather forecast.
#[derive(Debug, Clone)]
pub struct SolarPanel {
    /// Rated output under full sun.
    pub production: Power,

    /// Inverter conversion efficiency.
    pub inverter_efficiency: Percentage,

    pub statistics: PanelStatistics,
}

impl SolarPanel {
    pub fn new(production: Power, inverter_efficiency: Percentage, statistics: PanelStatistics) -> Self {
        Self { production: production.max(Power::ZERO), inverter_efficiency, statistics }
    }

    /// Average output during the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the weather forecast does not cover the slot.
    pub fn power(&self, step: &SimulationStep) -> Result<Power, SimulationError> {
        let sun = step.forecasts.weather.sun_probability(step.start)?;
        Ok(self.production * sun * self.statistics.efficiency(step.start) * self.inverter_efficiency)
    }
}

impl Device for SolarPanel {
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError> {
        let energy = self.power(step)? * step.duration;
        Ok(StepOutcome::new(ledger.produce(energy), state))
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::SolarPanel
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Berlin;

    use super::*;
    use crate::forecast::{ClearSkyForecast, FlatPriceForecast, FlatWeatherForecast, Forecasts};

    fn clear_sky_step(hour: u32) -> SimulationStep {
        let forecasts = Forecasts::new(
            Arc::new(ClearSkyForecast),
            Arc::new(FlatPriceForecast::GERMAN_RESIDENTIAL),
        );
        let start = Berlin.with_ymd_and_hms(2026, 6, 1, hour, 0, 0).unwrap();
        SimulationStep::new(start, TimeDelta::hours(1), forecasts)
    }

    #[test]
    fn full_sun_one_hour_produces_rated_energy() {
        let panel = SolarPanel::new(Power::from_kw(2.5), Percentage::ONE_HUNDRED, PanelStatistics::Full);
        let outcome = panel.simulate(&clear_sky_step(3), &EnergySystem::INIT, DeviceState::NO_STORAGE).unwrap();
        assert_abs_diff_eq!(outcome.ledger.produced.kwh(), 2.5, epsilon = 1e-12);
        assert_eq!(outcome.state, DeviceState::NO_STORAGE);
    }

    #[test]
    fn inverter_and_weather_scale_output() {
        let panel = SolarPanel::new(Power::from_kw(10.0), Percentage::saturating(0.9), PanelStatistics::Full);
        let mut step = clear_sky_step(8);
        step.forecasts.weather = Arc::new(FlatWeatherForecast::STANDARD);
        let power = panel.power(&step).unwrap();
        assert_abs_diff_eq!(power.kw(), 10.0 * 0.9 * 0.9, epsilon = 1e-12);

        let night = SimulationStep { start: step.start - TimeDelta::hours(6), ..step };
        assert_eq!(panel.power(&night).unwrap(), Power::ZERO);
    }

    #[test]
    fn curved_statistics() {
        let at = |hour, minute| Berlin.with_ymd_and_hms(2026, 6, 1, hour, minute, 0).unwrap();
        let curve = PanelStatistics::CURVED;
        assert_eq!(curve.efficiency(at(7, 59)), Percentage::ZERO);
        assert_eq!(curve.efficiency(at(8, 0)), Percentage::ZERO);
        assert_abs_diff_eq!(curve.efficiency(at(12, 30)).value(), 0.85, epsilon = 1e-12);
        assert_eq!(curve.efficiency(at(17, 0)), Percentage::ZERO);
    }

    #[test]
    fn hourly_statistics_default_to_zero() {
        let table = vec![Percentage::ZERO, Percentage::saturating(0.4)];
        let hourly = PanelStatistics::Hourly(table);
        let at = |hour| Berlin.with_ymd_and_hms(2026, 6, 1, hour, 15, 0).unwrap();
        assert_eq!(hourly.efficiency(at(1)), Percentage::saturating(0.4));
        assert_eq!(hourly.efficiency(at(13)), Percentage::ZERO);
    }
}
