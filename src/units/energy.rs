use std::{
    fmt::{Display, Formatter},
    ops::{Div, Mul},
};

use serde::{Deserialize, Serialize};

use super::Percentage;

/// Amount of energy in kilowatt-hours.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Energy(f64);

impl Energy {
    pub const ZERO: Self = Self(0.0);

    pub const fn from_kwh(kwh: f64) -> Self {
        Self(kwh)
    }

    pub const fn kwh(self) -> f64 {
        self.0
    }

    pub fn min(self, rhs: Self) -> Self {
        if rhs < self { rhs } else { self }
    }

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0.0
    }
}

impl Mul<f64> for Energy {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Mul<Percentage> for Energy {
    type Output = Self;

    fn mul(self, rhs: Percentage) -> Self::Output {
        Self(self.0 * rhs.value())
    }
}

/// Ratio of two energies, e.g. stored over capacity.
impl Div for Energy {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl Display for Energy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_of_three_limits() {
        let surplus = Energy::from_kwh(2.0);
        let rate = Energy::from_kwh(5.0);
        let headroom = Energy::from_kwh(1.5);
        assert_eq!(surplus.min(rate).min(headroom), headroom);
    }

    #[test]
    fn arithmetic_keeps_unit() {
        let total: Energy = [1.0, 2.5, -0.5].into_iter().map(Energy::from_kwh).sum();
        assert_eq!(total, Energy::from_kwh(3.0));
        assert_eq!(-total, Energy::from_kwh(-3.0));
        assert_eq!(total * 2.0, Energy::from_kwh(6.0));
    }

    #[test]
    fn display() {
        assert_eq!(Energy::from_kwh(1.25).to_string(), "1.250 kWh");
    }
}
