use crate::devices::types::{Device, DeviceType, StepOutcome};
use crate::devices::DeviceState;
use crate::sim::{EnergySystem, SimulationError, SimulationStep};

/// Connection to the public grid, closing every slot's balance.
///
/// Exports whatever surplus is left after all other devices ran and imports
/// whatever deficit remains, priced by the forecast for the slot start.
/// Always runs last, so the slot ends with zero current energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBalancer;

impl Device for GridBalancer {
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError> {
        let balance = ledger.current_energy();
        let ledger = if balance.is_positive() {
            let price = step.forecasts.prices.export_price(step.start)?;
            ledger.export_energy(balance, price.for_energy(balance))?
        } else if balance.is_negative() {
            let deficit = -balance;
            let price = step.forecasts.prices.import_price(step.start)?;
            ledger.import_energy(deficit, price.for_energy(deficit))?
        } else {
            ledger.clone()
        };
        Ok(StepOutcome::new(ledger, state))
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Grid
    }
}
