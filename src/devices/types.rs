//! Common types and traits for device simulation components.

use std::fmt::{Display, Formatter};

use rand::{Rng, rngs::StdRng};
use serde::Deserialize;

use crate::devices::DeviceState;
use crate::sim::{EnergySystem, SimulationError, SimulationStep};

/// Kind of device in an installation.
///
/// The declaration order is the execution priority within a slot:
/// producers first, the grid balancer always last.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    SolarPanel,
    NoisyUsage,
    Battery,
    ElectricCar,
    Grid,
}

impl DeviceType {
    /// Name used for devices configured without an explicit name.
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::SolarPanel => "Panel",
            Self::NoisyUsage => "NoisyUsage",
            Self::Battery => "Battery",
            Self::ElectricCar => "ElectricCar",
            Self::Grid => "Grid",
        }
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SolarPanel => "solar_panel",
            Self::NoisyUsage => "noisy_usage",
            Self::Battery => "battery",
            Self::ElectricCar => "electric_car",
            Self::Grid => "grid",
        };
        f.write_str(name)
    }
}

/// Stable identity of a device within an installation.
///
/// Ordering is by type first, then by id, which is exactly the order
/// devices execute in.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DeviceRef {
    pub device_type: DeviceType,
    pub id: String,
}

impl DeviceRef {
    pub fn new(device_type: DeviceType, id: impl Into<String>) -> Self {
        Self { device_type, id: id.into() }
    }
}

impl Display for DeviceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.device_type, self.id)
    }
}

/// Ledger and device state after a device executed one slot.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub ledger: EnergySystem,
    pub state: DeviceState,
}

impl StepOutcome {
    pub const fn new(ledger: EnergySystem, state: DeviceState) -> Self {
        Self { ledger, state }
    }
}

/// Trait defining a device that produces, consumes, stores or balances energy.
///
/// A device never mutates the ledger or its state in place: it receives the
/// ledger as it stands after all higher-priority devices ran in this slot,
/// and returns the updated pair.
pub trait Device {
    /// Executes one slot.
    ///
    /// # Arguments
    ///
    /// * `step` - Slot start, duration and forecasts
    /// * `ledger` - Running ledger before this device
    /// * `state` - This device's state at the end of the previous slot
    ///
    /// # Errors
    ///
    /// Returns an error if a forecast has no value for the slot or money
    /// in different currencies would be combined.
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError>;

    /// State used when a request carries none for this device.
    fn initial_state(&self) -> DeviceState {
        DeviceState::NO_STORAGE
    }

    fn device_type(&self) -> DeviceType;
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
