use std::{
    fmt::{Display, Formatter},
    ops::{Mul, Neg},
    str::FromStr,
};

use serde::Deserialize;

use super::{Energy, UnitError};

/// Three-letter ISO 4217 currency code.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const EUR: Self = Self(*b"EUR");

    pub fn code(&self) -> &str {
        // Only ASCII uppercase letters ever get in, see `FromStr`.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for Currency {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            &[a, b, c] if s.bytes().all(|byte| byte.is_ascii_uppercase()) => Ok(Self([a, b, c])),
            _ => Err(UnitError::InvalidCurrency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Amount of money in a single currency.
///
/// Arithmetic across currencies is rejected. Equality compares amounts
/// rounded to four decimal places.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct Money {
    amount: f64,
    currency: Currency,
}

impl Money {
    pub const fn new(amount: f64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self::new(0.0, currency)
    }

    pub const fn of_eur(amount: f64) -> Self {
        Self::new(amount, Currency::EUR)
    }

    pub const fn amount(&self) -> f64 {
        self.amount
    }

    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_add(self, rhs: Self) -> Result<Self, UnitError> {
        self.ensure_same_currency(rhs)?;
        Ok(Self::new(self.amount + rhs.amount, self.currency))
    }

    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, UnitError> {
        self.ensure_same_currency(rhs)?;
        Ok(Self::new(self.amount - rhs.amount, self.currency))
    }

    /// Price for the energy, with `self` being a price per kilowatt-hour.
    pub fn for_energy(self, energy: Energy) -> Self {
        self * energy.kwh()
    }

    /// Strict comparison of amounts, for penalties and prices.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if the currencies differ.
    pub fn is_less_than(self, rhs: Self) -> Result<bool, UnitError> {
        self.ensure_same_currency(rhs)?;
        Ok(rounded(self.amount) < rounded(rhs.amount))
    }

    fn ensure_same_currency(self, rhs: Self) -> Result<(), UnitError> {
        if self.currency == rhs.currency {
            Ok(())
        } else {
            Err(UnitError::CurrencyMismatch { left: self.currency, right: rhs.currency })
        }
    }
}

fn rounded(amount: f64) -> f64 {
    (amount * 10_000.0).round()
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.currency == other.currency && rounded(self.amount) == rounded(other.amount)
    }
}

impl Mul<f64> for Money {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.amount * rhs, self.currency)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.amount, self.currency)
    }
}

impl FromStr for Money {
    type Err = UnitError;

    /// Parses `"<amount> <CODE>"`, e.g. `"0.39 EUR"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UnitError::InvalidMoney(s.to_string());
        let (amount, currency) = s.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
        let amount = amount.parse::<f64>().map_err(|_| invalid())?;
        if !amount.is_finite() {
            return Err(invalid());
        }
        Ok(Self::new(amount, currency.trim().parse()?))
    }
}

impl TryFrom<String> for Money {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_cross_currency_arithmetic() {
        let usd: Currency = "USD".parse().unwrap();
        let result = Money::of_eur(1.0).checked_add(Money::new(1.0, usd));
        assert_eq!(
            result,
            Err(UnitError::CurrencyMismatch { left: Currency::EUR, right: usd })
        );
    }

    #[test]
    fn equality_uses_four_decimals() {
        assert_eq!(Money::of_eur(0.16), Money::of_eur(0.08 * 2.0));
        assert_eq!(Money::of_eur(1.000_04), Money::of_eur(1.0));
        assert_ne!(Money::of_eur(1.0002), Money::of_eur(1.0));
    }

    #[test]
    fn parses_text_form() {
        assert_eq!("0.39 EUR".parse::<Money>(), Ok(Money::of_eur(0.39)));
        assert!("0.39".parse::<Money>().is_err());
        assert!("abc EUR".parse::<Money>().is_err());
        assert!("1 eur".parse::<Money>().is_err());
    }

    #[test]
    fn price_times_energy() {
        let price = Money::of_eur(0.08);
        assert_eq!(price.for_energy(Energy::from_kwh(2.0)), Money::of_eur(0.16));
    }

    #[test]
    fn sign_and_difference() {
        let cost = Money::of_eur(24.0).checked_sub(Money::of_eur(14.0)).unwrap();
        assert_eq!(-cost, Money::of_eur(-10.0));
    }
}
