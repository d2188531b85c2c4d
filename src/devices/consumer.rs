use rand::{SeedableRng, rngs::StdRng};

use crate::devices::types::{Device, DeviceType, StepOutcome, gaussian_noise};
use crate::devices::DeviceState;
use crate::sim::{EnergySystem, SimulationError, SimulationStep};
use crate::units::{Power, Timestamp};

/// Household consumption without storage ("noisy usage").
///
/// Consumes its predicted power over every slot. The prediction is the
/// configured average, optionally perturbed by Gaussian noise. The noise is
/// derived from the seed and the slot start only, so repeated runs over the
/// same horizon (as the optimizer does) see identical consumption.
#[derive(Debug, Clone)]
pub struct FixedConsumer {
    /// Average consumption.
    pub consumption: Power,

    /// Standard deviation of the noise; zero disables it.
    pub noise_std: Power,

    /// Seed for reproducible noise.
    pub seed: u64,
}

impl FixedConsumer {
    pub fn new(consumption: Power) -> Self {
        Self { consumption: consumption.max(Power::ZERO), noise_std: Power::ZERO, seed: 0 }
    }

    #[must_use]
    pub fn with_noise(mut self, noise_std: Power, seed: u64) -> Self {
        self.noise_std = noise_std.max(Power::ZERO);
        self.seed = seed;
        self
    }

    /// Predicted average consumption for the slot starting at `time`, never negative.
    pub fn predicted_power(&self, time: Timestamp) -> Power {
        if self.noise_std <= Power::ZERO {
            return self.consumption;
        }
        let slot = u64::from_ne_bytes(time.timestamp().to_ne_bytes());
        let mut rng = StdRng::seed_from_u64(self.seed ^ slot);
        let noise = gaussian_noise(&mut rng, self.noise_std.kw());
        (self.consumption + Power::from_kw(noise)).max(Power::ZERO)
    }
}

impl Device for FixedConsumer {
    fn simulate(
        &self,
        step: &SimulationStep,
        ledger: &EnergySystem,
        state: DeviceState,
    ) -> Result<StepOutcome, SimulationError> {
        let energy = self.predicted_power(step.start) * step.duration;
        Ok(StepOutcome::new(ledger.consume(energy), state))
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::NoisyUsage
    }
}
