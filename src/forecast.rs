//! Forecast ports queried by devices during a simulation.
//!
//! Forecasts are assumed to cover the whole requested horizon. A query that
//! cannot be answered is an error and aborts the run; nothing here falls
//! back to a default value.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::units::{Money, Percentage, Timestamp, UnitError};

pub mod csv_prices;
pub mod flat;

pub use csv_prices::CsvPriceForecast;
pub use flat::{ClearSkyForecast, FlatPriceForecast, FlatWeatherForecast};

/// Grid prices per kilowatt-hour, always as positive magnitudes.
pub trait EnergyPriceForecast: Debug + Send + Sync {
    /// Cost of importing one kilowatt-hour at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::MissingPrice`] if no price is known for `time`.
    fn import_price(&self, time: Timestamp) -> Result<Money, ForecastError>;

    /// Credit for exporting one kilowatt-hour at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::MissingPrice`] if no price is known for `time`.
    fn export_price(&self, time: Timestamp) -> Result<Money, ForecastError>;
}

/// Sun intensity forecast.
pub trait WeatherForecast: Debug + Send + Sync {
    /// # Errors
    ///
    /// Returns [`ForecastError::MissingSunProbability`] if `time` is not covered.
    fn sun_probability(&self, time: Timestamp) -> Result<Percentage, ForecastError>;
}

/// All forecasts a simulation step may consult.
#[derive(Clone, Debug)]
pub struct Forecasts {
    pub weather: Arc<dyn WeatherForecast>,
    pub prices: Arc<dyn EnergyPriceForecast>,
}

impl Forecasts {
    pub fn new(weather: Arc<dyn WeatherForecast>, prices: Arc<dyn EnergyPriceForecast>) -> Self {
        Self { weather, prices }
    }

    /// Sun from 07:00 to 18:00 and German residential flat prices.
    pub fn standard() -> Self {
        Self::new(
            Arc::new(FlatWeatherForecast::STANDARD),
            Arc::new(FlatPriceForecast::GERMAN_RESIDENTIAL),
        )
    }
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("no price available for {0}")]
    MissingPrice(Timestamp),

    #[error("no sun probability available for {0}")]
    MissingSunProbability(Timestamp),

    #[error("failed to read price table `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid price table row {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error(transparent)]
    Unit(#[from] UnitError),
}
