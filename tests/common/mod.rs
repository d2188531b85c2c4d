//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{TimeDelta, TimeZone};
use chrono_tz::Europe::Berlin;

use home_energy_sim::devices::{
    Battery, DeviceMap, DeviceRef, DeviceType, ElectricCar, FixedConsumer, GridBalancer, PanelStatistics, SolarPanel,
    create_initial_state,
};
use home_energy_sim::sim::{ExportError, SimulationMetricsExporter, SimulationRequest, SimulationResult};
use home_energy_sim::units::{Energy, Percentage, Power, Timestamp};

/// Tolerance for energy sums over a day of slots.
pub const EPSILON: f64 = 1e-6;

/// Monday, 1 June 2026, midnight in Berlin.
pub fn start() -> Timestamp {
    Berlin.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

/// Default home battery (10 kWh, 5 kW both ways, half full).
pub fn default_battery() -> Battery {
    Battery::builder()
        .capacity(Energy::from_kwh(10.0))
        .charge_rate(Power::from_kw(5.0))
        .discharge_rate(Power::from_kw(5.0))
        .start_storage_level(Percentage::saturating(0.5))
        .build()
}

/// Default car battery (50 kWh, 11 kW, half full).
pub fn default_car() -> ElectricCar {
    let battery = Battery::builder()
        .capacity(Energy::from_kwh(50.0))
        .charge_rate(Power::from_kw(11.0))
        .discharge_rate(Power::from_kw(11.0))
        .start_storage_level(Percentage::saturating(0.5))
        .build();
    ElectricCar::new(battery, None)
}

/// Rooftop solar, a noisy house load, a home battery, a car and the grid.
pub fn default_home() -> DeviceMap {
    let mut devices = DeviceMap::new();
    devices.insert(
        DeviceRef::new(DeviceType::SolarPanel, "Roof"),
        SolarPanel::new(Power::from_kw(5.0), Percentage::saturating(0.9), PanelStatistics::CURVED).into(),
    );
    devices.insert(
        DeviceRef::new(DeviceType::NoisyUsage, "House"),
        FixedConsumer::new(Power::from_kw(0.5)).with_noise(Power::from_kw(0.1), 42).into(),
    );
    devices.insert(DeviceRef::new(DeviceType::Battery, "Battery"), default_battery().into());
    devices.insert(DeviceRef::new(DeviceType::ElectricCar, "Car"), default_car().into());
    devices.insert(DeviceRef::new(DeviceType::Grid, "Grid"), GridBalancer.into());
    devices
}

/// Request over `hours` hours from [`start`] with 15 minute slots.
pub fn request(devices: DeviceMap, hours: i64) -> Arc<SimulationRequest> {
    let initial_state = create_initial_state(&devices);
    Arc::new(
        SimulationRequest::builder()
            .id("integration")
            .start(start())
            .end(start() + TimeDelta::hours(hours))
            .devices(devices)
            .initial_state(initial_state)
            .build(),
    )
}

/// Keeps every exported slot in memory.
#[derive(Default)]
pub struct RecordingExporter {
    slots: Mutex<Vec<SimulationResult>>,
}

impl RecordingExporter {
    pub fn slots(&self) -> Vec<SimulationResult> {
        self.slots.lock().unwrap().clone()
    }
}

impl SimulationMetricsExporter for RecordingExporter {
    fn export_metrics(&self, slot: &SimulationResult) -> Result<(), ExportError> {
        self.slots.lock().map_err(|_| ExportError::Poisoned)?.push(slot.clone());
        Ok(())
    }
}

/// Rejects every slot, like a sink whose storage went away.
pub struct FailingExporter;

impl SimulationMetricsExporter for FailingExporter {
    fn export_metrics(&self, _slot: &SimulationResult) -> Result<(), ExportError> {
        Err(ExportError::Poisoned)
    }
}
