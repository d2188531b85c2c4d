use std::{
    fmt::{Display, Formatter},
    ops::Mul,
};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::{Energy, Percentage};

/// Average power in kilowatts.
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
    derive_more::Neg,
    derive_more::Sub,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Power(f64);

impl Power {
    pub const ZERO: Self = Self(0.0);

    pub const fn from_kw(kw: f64) -> Self {
        Self(kw)
    }

    pub const fn kw(self) -> f64 {
        self.0
    }

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }
}

impl Mul<f64> for Power {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Mul<Percentage> for Power {
    type Output = Self;

    fn mul(self, rhs: Percentage) -> Self::Output {
        Self(self.0 * rhs.value())
    }
}

/// Energy delivered at this power over the given duration.
impl Mul<TimeDelta> for Power {
    type Output = Energy;

    fn mul(self, rhs: TimeDelta) -> Self::Output {
        Energy::from_kwh(self.0 * rhs.as_seconds_f64() / 3600.0)
    }
}

impl Display for Power {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kW", self.0)
    }
}
