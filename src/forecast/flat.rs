use chrono::Timelike;

use super::{EnergyPriceForecast, ForecastError, WeatherForecast};
use crate::units::{Money, Percentage, Timestamp};

/// Constant import and export prices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatPriceForecast {
    pub import_price: Money,
    pub export_price: Money,
}

impl FlatPriceForecast {
    /// Typical German residential tariff.
    pub const GERMAN_RESIDENTIAL: Self =
        Self { import_price: Money::of_eur(0.39), export_price: Money::of_eur(0.08) };
}

impl EnergyPriceForecast for FlatPriceForecast {
    fn import_price(&self, _time: Timestamp) -> Result<Money, ForecastError> {
        Ok(self.import_price)
    }

    fn export_price(&self, _time: Timestamp) -> Result<Money, ForecastError> {
        Ok(self.export_price)
    }
}

/// Same sunny day, every day.
///
/// No sun up to and including `sunrise_hour` and from `sunset_hour` on,
/// 90% within two hours of either edge, full sun in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatWeatherForecast {
    pub sunrise_hour: u32,
    pub sunset_hour: u32,
}

impl FlatWeatherForecast {
    pub const STANDARD: Self = Self { sunrise_hour: 7, sunset_hour: 18 };
}

impl WeatherForecast for FlatWeatherForecast {
    fn sun_probability(&self, time: Timestamp) -> Result<Percentage, ForecastError> {
        let hour = time.hour();
        if hour <= self.sunrise_hour || hour >= self.sunset_hour {
            return Ok(Percentage::ZERO);
        }
        if hour - self.sunrise_hour < 2 || self.sunset_hour - hour < 2 {
            return Ok(Percentage::saturating(0.9));
        }
        Ok(Percentage::ONE_HUNDRED)
    }
}

/// Full sun around the clock, mostly useful for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearSkyForecast;

impl WeatherForecast for ClearSkyForecast {
    fn sun_probability(&self, _time: Timestamp) -> Result<Percentage, ForecastError> {
        Ok(Percentage::ONE_HUNDRED)
    }
}
