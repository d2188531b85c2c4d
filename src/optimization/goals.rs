//! Penalty functions scoring a finished simulation run.

use crate::devices::DeviceType;
use crate::sim::SimulationResult;
use crate::units::{Money, Percentage, UnitError};

/// Scores a simulation result; lower is better.
pub trait OptimizationGoal {
    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if penalties in different
    /// currencies would be combined.
    fn penalty(&self, result: &SimulationResult) -> Result<Money, UnitError>;
}

/// Price of falling short of a percentage, per block of shortfall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentagePenalty {
    /// Size of one block.
    pub percentage: Percentage,
    /// Price of one full block; partial blocks are charged pro rata.
    pub price: Money,
}

/// Penalizes electric cars ending the run below a target charge level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarChargeGoal {
    pub percentage: Percentage,
    pub penalty: PercentagePenalty,
}

impl Default for CarChargeGoal {
    /// 90% target, 5 EUR per missing 10%.
    fn default() -> Self {
        Self {
            percentage: Percentage::saturating(0.9),
            penalty: PercentagePenalty { percentage: Percentage::saturating(0.1), price: Money::of_eur(5.0) },
        }
    }
}

impl OptimizationGoal for CarChargeGoal {
    fn penalty(&self, result: &SimulationResult) -> Result<Money, UnitError> {
        let block = self.penalty.percentage.value();
        let mut total = Money::zero(self.penalty.price.currency());
        if block <= 0.0 {
            return Ok(total);
        }
        for (_, state) in result.states_of_type(DeviceType::ElectricCar) {
            if state.percentage.is_below(self.percentage) {
                let blocks = (self.percentage.value() - state.percentage.value()) / block;
                total = total.checked_add(self.penalty.price * blocks)?;
            }
        }
        Ok(total)
    }
}

/// Net grid cost as penalty; net export earnings count as a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridUsingGoal {
    pub enabled: bool,
}

impl Default for GridUsingGoal {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl OptimizationGoal for GridUsingGoal {
    fn penalty(&self, result: &SimulationResult) -> Result<Money, UnitError> {
        if !self.enabled {
            return Ok(Money::zero(result.ledger.currency()));
        }
        Ok(-result.ledger.energy_revenue())
    }
}

/// All goals of an optimization; the penalty is their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptimizationGoals {
    pub car_charging: CarChargeGoal,
    pub grid_using: GridUsingGoal,
}

impl OptimizationGoal for OptimizationGoals {
    fn penalty(&self, result: &SimulationResult) -> Result<Money, UnitError> {
        self.car_charging.penalty(result)?.checked_add(self.grid_using.penalty(result)?)
    }
}
