use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::UnitError;

/// Fraction in `[0.0, 1.0]`.
///
/// Used for charge levels, efficiencies, storage losses and sun intensity.
/// Construction outside the range fails, so every `Percentage` in flight is valid.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Self = Self(0.0);
    pub const ONE_HUNDRED: Self = Self(1.0);

    /// Creates a percentage from a fraction.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::PercentageOutOfRange`] unless `0.0 <= value <= 1.0`.
    pub fn new(value: f64) -> Result<Self, UnitError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(UnitError::PercentageOutOfRange(value))
        }
    }

    /// Creates a percentage, clamping the fraction into range. `NaN` becomes zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() { Self::ZERO } else { Self(value.clamp(0.0, 1.0)) }
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Difference to a lower percentage, zero if `rhs` is higher.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self::saturating(self.0 - rhs.0)
    }

    pub fn is_below(self, rhs: Self) -> bool {
        self.0 < rhs.0
    }
}

impl TryFrom<f64> for Percentage {
    type Error = UnitError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for f64 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Percentage::new(1.5), Err(UnitError::PercentageOutOfRange(1.5)));
        assert!(Percentage::new(-0.01).is_err());
        assert!(Percentage::new(0.0).is_ok());
        assert!(Percentage::new(1.0).is_ok());
    }

    #[test]
    fn saturating_sub_stops_at_zero() {
        let low = Percentage::saturating(0.2);
        let high = Percentage::saturating(0.9);
        assert_eq!(low.saturating_sub(high), Percentage::ZERO);
        assert!((high.saturating_sub(low).value() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn display_as_percent() {
        assert_eq!(Percentage::saturating(0.5).to_string(), "50.00%");
    }
}
