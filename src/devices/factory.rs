//! Builds device models from scenario configuration.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::{ConfigError, DeviceConfig, StatisticsKind};
use crate::devices::{
    Battery, CarUsageProfile, Device, DeviceMap, DeviceRef, DeviceState, DeviceType, ElectricCar,
    FixedConsumer, GridBalancer, HomeDevice, PanelStatistics, SolarPanel,
};
use crate::units::{Energy, Percentage, Power, UnitError};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("{device_type} `{name}` needs `{field}`")]
    MissingField { device_type: DeviceType, name: String, field: &'static str },

    #[error("{device_type} `{name}`: invalid `{field}`")]
    InvalidField {
        device_type: DeviceType,
        name: String,
        field: &'static str,
        #[source]
        source: UnitError,
    },

    #[error("duplicate device {0}")]
    Duplicate(DeviceRef),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Creates one device from its configuration entry.
///
/// # Errors
///
/// Returns an error if a field required by the device type is missing or a
/// fraction lies outside `[0, 1]`.
pub fn create_device(config: &DeviceConfig) -> Result<HomeDevice, FactoryError> {
    let fields = Fields { config };
    let device = match config.device_type {
        DeviceType::SolarPanel => HomeDevice::Solar(SolarPanel::new(
            Power::from_kw(fields.required(config.production_kw, "production_kw")?),
            fields.percentage(config.panel_efficiency, "panel_efficiency")?,
            statistics(&fields)?,
        )),
        DeviceType::NoisyUsage => HomeDevice::Consumer(
            FixedConsumer::new(Power::from_kw(fields.required(config.consumption_kw, "consumption_kw")?))
                .with_noise(Power::from_kw(config.noise_std_kw), config.seed),
        ),
        DeviceType::Battery => HomeDevice::Battery(battery(&fields)?),
        DeviceType::ElectricCar => {
            let usage_profile = match &config.usage_profile {
                Some(profile) => {
                    let (start_usage, end_usage) = profile.times()?;
                    Some(CarUsageProfile {
                        days: profile.days.clone(),
                        start_usage,
                        end_usage,
                        energy_consumption: Energy::from_kwh(profile.energy_consumption_kwh),
                    })
                }
                None => None,
            };
            HomeDevice::Car(ElectricCar::new(battery(&fields)?, usage_profile))
        }
        DeviceType::Grid => HomeDevice::Grid(GridBalancer),
    };
    Ok(device)
}

/// Creates all configured devices, keyed by their refs.
///
/// Entries with `count > 1` expand into numbered devices, see
/// [`DeviceConfig::instance_ids`].
///
/// # Errors
///
/// Returns an error if any device cannot be created or two devices share a ref.
pub fn create_devices(configs: &[DeviceConfig]) -> Result<DeviceMap, FactoryError> {
    let mut devices = DeviceMap::new();
    for config in configs {
        let device = create_device(config)?;
        for id in config.instance_ids() {
            let device_ref = DeviceRef::new(config.device_type, id);
            if devices.contains_key(&device_ref) {
                return Err(FactoryError::Duplicate(device_ref));
            }
            devices.insert(device_ref, device.clone());
        }
    }
    Ok(devices)
}

/// Initial state of every device in `devices`.
pub fn create_initial_state(devices: &DeviceMap) -> BTreeMap<DeviceRef, DeviceState> {
    devices
        .iter()
        .map(|(device_ref, device)| (device_ref.clone(), device.initial_state()))
        .collect()
}

struct Fields<'a> {
    config: &'a DeviceConfig,
}

impl Fields<'_> {
    fn required(&self, value: Option<f64>, field: &'static str) -> Result<f64, FactoryError> {
        value.ok_or_else(|| FactoryError::MissingField {
            device_type: self.config.device_type,
            name: self.config.base_name().to_string(),
            field,
        })
    }

    fn percentage(&self, value: f64, field: &'static str) -> Result<Percentage, FactoryError> {
        Percentage::new(value).map_err(|source| FactoryError::InvalidField {
            device_type: self.config.device_type,
            name: self.config.base_name().to_string(),
            field,
            source,
        })
    }
}

fn statistics(fields: &Fields<'_>) -> Result<PanelStatistics, FactoryError> {
    let config = fields.config;
    Ok(match config.statistics {
        StatisticsKind::Full => PanelStatistics::Full,
        StatisticsKind::Curved => PanelStatistics::CURVED,
        StatisticsKind::Hourly => PanelStatistics::Hourly(
            config
                .hourly_efficiency
                .iter()
                .map(|value| fields.percentage(*value, "hourly_efficiency"))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    })
}

fn battery(fields: &Fields<'_>) -> Result<Battery, FactoryError> {
    let config = fields.config;
    Ok(Battery::builder()
        .capacity(Energy::from_kwh(fields.required(config.capacity_kwh, "capacity_kwh")?))
        .charge_rate(Power::from_kw(fields.required(config.charge_rate_kw, "charge_rate_kw")?))
        .discharge_rate(Power::from_kw(fields.required(config.discharge_rate_kw, "discharge_rate_kw")?))
        .charging_efficiency(fields.percentage(config.charging_efficiency, "charging_efficiency")?)
        .discharging_efficiency(fields.percentage(config.discharging_efficiency, "discharging_efficiency")?)
        .daily_storage_loss(fields.percentage(config.daily_storage_loss, "daily_storage_loss")?)
        .start_storage_level(fields.percentage(config.start_storage_level, "start_storage_level")?)
        .force_charging_limit(fields.percentage(config.force_charging_limit, "force_charging_limit")?)
        .build())
}
