//! Day-ahead market prices loaded from CSV tables.
//!
//! One row per day: `YYYY/MM/DD,p0,p1,...,p23`, with the hourly market price
//! in currency per megawatt-hour. Blank lines and lines starting with `#` are
//! ignored, as are cells that do not parse as a number.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, Timelike};
use tracing::debug;

use super::{EnergyPriceForecast, ForecastError};
use crate::units::{Currency, Money, Timestamp};

const DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Clone, Debug)]
pub struct CsvPriceForecast {
    currency: Currency,
    /// Added to the market price on import (grid fees, taxes).
    import_charge: Money,
    /// Subtracted from the market price on export.
    export_charge: Money,
    prices: HashMap<NaiveDate, [Option<f64>; 24]>,
}

impl CsvPriceForecast {
    pub fn new(currency: Currency, import_charge: Money, export_charge: Money) -> Self {
        Self { currency, import_charge, export_charge, prices: HashMap::new() }
    }

    /// Loads every table in `paths`; later files override earlier days.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or contains a malformed date.
    pub fn from_paths(
        currency: Currency,
        import_charge: Money,
        export_charge: Money,
        paths: &[impl AsRef<Path>],
    ) -> Result<Self, ForecastError> {
        let mut forecast = Self::new(currency, import_charge, export_charge);
        for path in paths {
            let path = path.as_ref();
            let reader = Self::reader_builder()
                .from_path(path)
                .map_err(|source| ForecastError::Read { path: path.to_path_buf(), source })?;
            forecast.load(reader)?;
        }
        Ok(forecast)
    }

    /// Adds the rows of one CSV table.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failures or a malformed date.
    pub fn extend_from_reader(&mut self, reader: impl Read) -> Result<(), ForecastError> {
        self.load(Self::reader_builder().from_reader(reader))
    }

    fn reader_builder() -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(false).flexible(true).comment(Some(b'#')).trim(csv::Trim::All);
        builder
    }

    fn load<R: Read>(&mut self, mut reader: csv::Reader<R>) -> Result<(), ForecastError> {
        for record in reader.records() {
            let record = record.map_err(|source| ForecastError::Read {
                path: "<reader>".into(),
                source,
            })?;
            let line = record.position().map_or(0, csv::Position::line);
            let Some(date) = record.get(0) else { continue };
            if date.is_empty() || record.len() < 2 {
                continue;
            }
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|error| {
                ForecastError::InvalidRow { line, message: format!("date `{date}`: {error}") }
            })?;
            let mut hourly = [None; 24];
            for (hour, cell) in record.iter().skip(1).take(24).enumerate() {
                hourly[hour] = cell.parse::<f64>().ok();
            }
            self.prices.insert(date, hourly);
        }
        debug!(days = self.prices.len(), currency = %self.currency, "loaded price table");
        Ok(())
    }

    /// Market price per kilowatt-hour for the hour containing `time`.
    fn market_price(&self, time: Timestamp) -> Result<Money, ForecastError> {
        let per_mwh = self
            .prices
            .get(&time.date_naive())
            .and_then(|hourly| hourly[time.hour() as usize])
            .ok_or(ForecastError::MissingPrice(time))?;
        Ok(Money::new(per_mwh / 1000.0, self.currency))
    }
}

impl EnergyPriceForecast for CsvPriceForecast {
    fn import_price(&self, time: Timestamp) -> Result<Money, ForecastError> {
        Ok(self.market_price(time)?.checked_add(self.import_charge)?)
    }

    fn export_price(&self, time: Timestamp) -> Result<Money, ForecastError> {
        Ok(self.market_price(time)?.checked_sub(self.export_charge)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    use super::*;

    const TABLE: &str = "\
# day-ahead prices, EUR/MWh
2026/01/02,100,90,80,70,60,50,40,30,20,10,0,-10,-20,0,10,20,30,40,50,60,70,80,90,100

2026/01/03,120,n/a,110
";

    fn forecast() -> CsvPriceForecast {
        let mut forecast =
            CsvPriceForecast::new(Currency::EUR, Money::of_eur(0.20), Money::of_eur(0.01));
        forecast.extend_from_reader(TABLE.as_bytes()).unwrap();
        forecast
    }

    #[test]
    fn adds_charges_to_market_price() {
        let forecast = forecast();
        let midnight = Berlin.with_ymd_and_hms(2026, 1, 2, 0, 30, 0).unwrap();
        assert_eq!(forecast.import_price(midnight).unwrap(), Money::of_eur(0.30));
        assert_eq!(forecast.export_price(midnight).unwrap(), Money::of_eur(0.09));
    }

    #[test]
    fn negative_market_prices_are_kept() {
        let forecast = forecast();
        let time = Berlin.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap();
        assert_eq!(forecast.export_price(time).unwrap(), Money::of_eur(-0.03));
    }

    #[test]
    fn missing_values_are_errors() {
        let forecast = forecast();
        let unparsable = Berlin.with_ymd_and_hms(2026, 1, 3, 1, 0, 0).unwrap();
        let short_row = Berlin.with_ymd_and_hms(2026, 1, 3, 5, 0, 0).unwrap();
        let unknown_day = Berlin.with_ymd_and_hms(2026, 1, 4, 5, 0, 0).unwrap();
        for time in [unparsable, short_row, unknown_day] {
            assert!(matches!(forecast.import_price(time), Err(ForecastError::MissingPrice(_))));
        }
        let ok = Berlin.with_ymd_and_hms(2026, 1, 3, 2, 0, 0).unwrap();
        assert_eq!(forecast.import_price(ok).unwrap(), Money::of_eur(0.31));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut forecast = CsvPriceForecast::new(Currency::EUR, Money::of_eur(0.0), Money::of_eur(0.0));
        let result = forecast.extend_from_reader("02.01.2026,1,2,3\n".as_bytes());
        assert!(matches!(result, Err(ForecastError::InvalidRow { .. })));
    }
}
