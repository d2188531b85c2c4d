//! Core simulation types: slots, requests, results and errors.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::TimeDelta;
use thiserror::Error;

use crate::devices::{DeviceMap, DeviceRef, DeviceState, DeviceType};
use crate::forecast::{ForecastError, Forecasts};
use crate::sim::EnergySystem;
use crate::units::{Currency, Timestamp, UnitError};

/// Device-independent context of one time slot.
#[derive(Clone, Debug)]
pub struct SimulationStep {
    /// Start of the slot (inclusive).
    pub start: Timestamp,
    /// Length of the slot.
    pub duration: TimeDelta,
    pub forecasts: Forecasts,
}

impl SimulationStep {
    pub fn new(start: Timestamp, duration: TimeDelta, forecasts: Forecasts) -> Self {
        Self { start, duration, forecasts }
    }

    /// End of the slot (exclusive).
    pub fn end(&self) -> Timestamp {
        self.start + self.duration
    }

    /// The slot directly following this one.
    #[must_use]
    pub fn next_time_slot(&self) -> Self {
        Self { start: self.end(), duration: self.duration, forecasts: self.forecasts.clone() }
    }
}

/// Everything needed for one simulation run.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, TimeZone};
/// use chrono_tz::Europe::Berlin;
/// use home_energy_sim::devices::DeviceMap;
/// use home_energy_sim::sim::SimulationRequest;
///
/// let start = Berlin.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
/// let request = SimulationRequest::builder()
///     .id("empty")
///     .start(start)
///     .end(start + TimeDelta::days(1))
///     .devices(DeviceMap::new())
///     .build();
/// assert_eq!(request.step, TimeDelta::minutes(15));
/// assert_eq!(request.slot_count(), 96);
/// ```
#[derive(Clone, Debug, bon::Builder)]
pub struct SimulationRequest {
    /// Identifier used when exporting metrics.
    #[builder(into)]
    pub id: String,
    pub start: Timestamp,
    /// End of the horizon (exclusive).
    pub end: Timestamp,
    #[builder(default = TimeDelta::minutes(15))]
    pub step: TimeDelta,
    pub devices: DeviceMap,
    /// Devices missing here start from [`crate::devices::Device::initial_state`].
    #[builder(default)]
    pub initial_state: BTreeMap<DeviceRef, DeviceState>,
    #[builder(default = Forecasts::standard())]
    pub forecasts: Forecasts,
    /// Currency the ledger books revenues in.
    #[builder(default = Currency::EUR)]
    pub currency: Currency,
}

impl SimulationRequest {
    pub fn first_step(&self) -> SimulationStep {
        SimulationStep::new(self.start, self.step, self.forecasts.clone())
    }

    /// Number of slots a run will execute.
    pub fn slot_count(&self) -> usize {
        if self.step <= TimeDelta::zero() || self.end <= self.start {
            return 0;
        }
        let horizon = (self.end - self.start).num_seconds();
        let step = self.step.num_seconds().max(1);
        usize::try_from((horizon + step - 1) / step).unwrap_or(usize::MAX)
    }
}

/// Outcome of a run, or of a single slot when used for metrics export.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    pub request: Arc<SimulationRequest>,
    /// For a full run: the slot after the last executed one.
    /// For a slot report: the slot itself.
    pub last_step: SimulationStep,
    pub end_state: BTreeMap<DeviceRef, DeviceState>,
    /// Cumulative ledger for a full run, the slot's delta for a slot report.
    pub ledger: EnergySystem,
}

impl SimulationResult {
    pub fn state_of(&self, device: &DeviceRef) -> Option<&DeviceState> {
        self.end_state.get(device)
    }

    /// End states of all devices of the given type.
    pub fn states_of_type(
        &self,
        device_type: DeviceType,
    ) -> impl Iterator<Item = (&DeviceRef, &DeviceState)> {
        self.end_state.iter().filter(move |(device, _)| device.device_type == device_type)
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("step duration must be positive, got {0}")]
    InvalidStep(TimeDelta),

    #[error("simulation ends at {end} before it starts at {start}")]
    InvalidHorizon { start: Timestamp, end: Timestamp },

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Unit(#[from] UnitError),
}
