//! Device models of a home energy installation.

use std::collections::BTreeMap;

/// Stationary battery storage model.
pub mod battery;
/// Fixed household consumption.
pub mod consumer;
/// Electric car: battery plus availability schedule.
pub mod electric_car;
pub mod factory;
/// Grid connection balancing every slot.
pub mod grid;
/// Solar photovoltaic generation model.
pub mod solar;
pub mod state;
pub mod types;

// Re-export the main types for convenience
pub use battery::Battery;
pub use consumer::FixedConsumer;
pub use electric_car::{CarUsageProfile, ElectricCar};
pub use factory::{FactoryError, create_device, create_devices, create_initial_state};
pub use grid::GridBalancer;
pub use solar::{PanelStatistics, SolarPanel};
pub use state::DeviceState;
pub use types::{Device, DeviceRef, DeviceType, StepOutcome};

use crate::sim::{EnergySystem, SimulationError, SimulationStep};

/// Devices of one installation, iterating in execution order.
pub type DeviceMap = BTreeMap<DeviceRef, HomeDevice>;

/// Any device of a home installation, dispatched by variant.
#[derive(Debug, Clone, derive_more::From)]
pub enum HomeDevice {
    Solar(SolarPanel),
    Consumer(FixedConsumer),
    Battery(Battery),
    Car(ElectricCar),
    Grid(GridBalancer),
}

impl HomeDevice {
    /// The electric car inside, for manipulators adjusting its limits.
    pub fn as_car_mut(&mut self) -> Option<&mut ElectricCar> {
        match self {
            Self::Car(car) => Some(car),
            _ => None,
        }
    }
}

impl Device for HomeDevice {
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError> {
        match self {
            Self::Solar(d) => d.simulate(step, ledger, state),
            Self::Consumer(d) => d.simulate(step, ledger, state),
            Self::Battery(d) => d.simulate(step, ledger, state),
            Self::Car(d) => d.simulate(step, ledger, state),
            Self::Grid(d) => d.simulate(step, ledger, state),
        }
    }

    fn initial_state(&self) -> DeviceState {
        match self {
            Self::Solar(d) => d.initial_state(),
            Self::Consumer(d) => d.initial_state(),
            Self::Battery(d) => d.initial_state(),
            Self::Car(d) => d.initial_state(),
            Self::Grid(d) => d.initial_state(),
        }
    }

    fn device_type(&self) -> DeviceType {
        match self {
            Self::Solar(d) => d.device_type(),
            Self::Consumer(d) => d.device_type(),
            Self::Battery(d) => d.device_type(),
            Self::Car(d) => d.device_type(),
            Self::Grid(d) => d.device_type(),
        }
    }
}
