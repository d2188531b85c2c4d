//! Value types for energy bookkeeping: energy, power, money and fractions.

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

pub mod energy;
pub mod money;
pub mod percentage;
pub mod power;

pub use energy::Energy;
pub use money::{Currency, Money};
pub use percentage::Percentage;
pub use power::Power;

/// Zone-aware instant used for slot boundaries and forecast queries.
pub type Timestamp = DateTime<Tz>;

/// Errors raised when constructing or combining unit values.
#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("percentage must be between 0 and 1: is {0}")]
    PercentageOutOfRange(f64),

    #[error("currency mismatch: {left} vs. {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("invalid currency code `{0}`")]
    InvalidCurrency(String),

    #[error("invalid money `{0}`, expected e.g. `0.39 EUR`")]
    InvalidMoney(String),
}
