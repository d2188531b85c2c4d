//! Penalty goals and the search for a cheaper car-charging schedule.

pub mod car_charge;
pub mod goals;
pub mod optimizer;

use chrono::TimeDelta;
use thiserror::Error;

use crate::devices::FactoryError;
use crate::forecast::ForecastError;
use crate::sim::SimulationError;
use crate::units::{Timestamp, UnitError};

pub use car_charge::CarCharge;
pub use goals::{CarChargeGoal, GridUsingGoal, OptimizationGoal, OptimizationGoals, PercentagePenalty};
pub use optimizer::{OptimizationResult, Optimizer, Schedule};

/// Horizon and resolution of an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationRequest {
    pub start: Timestamp,
    /// End of the horizon (exclusive).
    pub end: Timestamp,
    pub step: TimeDelta,
}

#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error("cannot build installation")]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("cannot compute penalty")]
    Unit(#[from] UnitError),
}
