//! TOML-based scenario configuration and preset definitions.
//!
//! A scenario describes one installation (grid tariff, weather, devices),
//! the simulated window and the optimization goals. Every table is optional;
//! missing values fall back to the baseline preset's defaults.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::devices::DeviceType;
use crate::forecast::{
    ClearSkyForecast, CsvPriceForecast, EnergyPriceForecast, FlatPriceForecast, FlatWeatherForecast,
    ForecastError, Forecasts, WeatherForecast,
};
use crate::optimization::{CarChargeGoal, GridUsingGoal, OptimizationGoals, OptimizationRequest, PercentagePenalty};
use crate::units::{Currency, Money, Percentage, Timestamp};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Top-level scenario configuration parsed from TOML.
///
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulated window and search parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Tariff, weather and devices of the home.
    #[serde(default)]
    pub installation: InstallationConfig,
    /// What the optimizer minimizes.
    #[serde(default)]
    pub goals: GoalsConfig,
}

/// Simulated window and search parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Identifier attached to exported metrics.
    pub id: String,
    /// IANA time zone of the installation, e.g. `"Europe/Berlin"`.
    pub timezone: String,
    /// Local start of the window, `YYYY-MM-DDTHH:MM`.
    pub start: String,
    /// Local end of the window (exclusive), `YYYY-MM-DDTHH:MM`.
    pub end: String,
    /// Slot length in minutes (must be > 0).
    pub step_minutes: i64,
    /// Upper bound of candidate schedules the optimizer evaluates.
    pub max_iterations: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            id: "baseline".to_string(),
            timezone: "Europe/Berlin".to_string(),
            start: "2026-06-01T00:00".to_string(),
            end: "2026-06-02T00:00".to_string(),
            step_minutes: 15,
            max_iterations: 1000,
        }
    }
}

impl SimulationConfig {
    /// # Errors
    ///
    /// Returns a `ConfigError` if the zone name is not a known IANA zone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse::<Tz>().map_err(|e| ConfigError {
            field: "simulation.timezone".into(),
            message: e.to_string(),
        })
    }

    /// Start and end of the window in the installation's zone.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a bound is malformed or does not exist
    /// in the zone (skipped by a daylight-saving change).
    pub fn window(&self) -> Result<(Timestamp, Timestamp), ConfigError> {
        let tz = self.timezone()?;
        let start = local_date_time(tz, &self.start, "simulation.start")?;
        let end = local_date_time(tz, &self.end, "simulation.end")?;
        Ok((start, end))
    }

    pub fn step(&self) -> TimeDelta {
        TimeDelta::minutes(self.step_minutes)
    }
}

fn local_date_time(tz: Tz, value: &str, field: &str) -> Result<Timestamp, ConfigError> {
    let naive = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|e| ConfigError {
        field: field.into(),
        message: format!("\"{value}\" is not a {DATE_TIME_FORMAT} date-time: {e}"),
    })?;
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| ConfigError {
        field: field.into(),
        message: format!("\"{value}\" does not exist in {tz}"),
    })
}

/// Tariff, weather and devices of the home.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallationConfig {
    pub grid: GridConfig,
    pub weather: WeatherConfig,
    pub devices: Vec<DeviceConfig>,
}

impl InstallationConfig {
    /// Currency the grid tariff is expressed in.
    pub fn currency(&self) -> Currency {
        match &self.grid {
            GridConfig::Flat { import_price, .. } => import_price.currency(),
            GridConfig::Csv { currency, .. } => *currency,
        }
    }

    /// Builds the forecast ports described by the grid and weather tables.
    ///
    /// # Errors
    ///
    /// Returns an error if a CSV price table cannot be loaded.
    pub fn forecasts(&self) -> Result<Forecasts, ForecastError> {
        let prices: Arc<dyn EnergyPriceForecast> = match &self.grid {
            GridConfig::Flat { import_price, export_price } => {
                Arc::new(FlatPriceForecast { import_price: *import_price, export_price: *export_price })
            }
            GridConfig::Csv { currency, resources, import_charge, export_charge } => Arc::new(
                CsvPriceForecast::from_paths(*currency, *import_charge, *export_charge, resources.as_slice())?,
            ),
        };
        let weather: Arc<dyn WeatherForecast> = match self.weather {
            WeatherConfig::Flat { sunrise_hour, sunset_hour } => {
                Arc::new(FlatWeatherForecast { sunrise_hour, sunset_hour })
            }
            WeatherConfig::Clear => Arc::new(ClearSkyForecast),
        };
        Ok(Forecasts::new(weather, prices))
    }
}

/// Grid tariff.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum GridConfig {
    /// Constant prices per kilowatt-hour, e.g. `"0.39 EUR"`.
    Flat {
        #[serde(default = "default_import_price")]
        import_price: Money,
        #[serde(default = "default_export_price")]
        export_price: Money,
    },
    /// Day-ahead market tables plus fixed charges.
    Csv {
        currency: Currency,
        resources: Vec<PathBuf>,
        import_charge: Money,
        export_charge: Money,
    },
}

fn default_import_price() -> Money {
    FlatPriceForecast::GERMAN_RESIDENTIAL.import_price
}

fn default_export_price() -> Money {
    FlatPriceForecast::GERMAN_RESIDENTIAL.export_price
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::Flat { import_price: default_import_price(), export_price: default_export_price() }
    }
}

/// Sun forecast.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum WeatherConfig {
    Flat {
        #[serde(default = "default_sunrise_hour")]
        sunrise_hour: u32,
        #[serde(default = "default_sunset_hour")]
        sunset_hour: u32,
    },
    Clear,
}

fn default_sunrise_hour() -> u32 {
    FlatWeatherForecast::STANDARD.sunrise_hour
}

fn default_sunset_hour() -> u32 {
    FlatWeatherForecast::STANDARD.sunset_hour
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::Flat { sunrise_hour: default_sunrise_hour(), sunset_hour: default_sunset_hour() }
    }
}

/// Placement statistics of a solar panel.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsKind {
    #[default]
    Full,
    Curved,
    /// Uses `hourly_efficiency`.
    Hourly,
}

/// One device entry; which fields are required depends on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Base id; defaults to the type's default name.
    #[serde(default)]
    pub name: Option<String>,
    /// Number of identical devices to create.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Rated solar output (kW).
    #[serde(default)]
    pub production_kw: Option<f64>,
    /// Average consumption (kW).
    #[serde(default)]
    pub consumption_kw: Option<f64>,
    /// Consumption noise standard deviation (kW).
    #[serde(default)]
    pub noise_std_kw: f64,
    #[serde(default)]
    pub seed: u64,
    /// Storage capacity (kWh).
    #[serde(default)]
    pub capacity_kwh: Option<f64>,
    /// Maximum charging power (kW).
    #[serde(default)]
    pub charge_rate_kw: Option<f64>,
    /// Maximum discharging power (kW).
    #[serde(default)]
    pub discharge_rate_kw: Option<f64>,
    #[serde(default = "default_efficiency")]
    pub charging_efficiency: f64,
    #[serde(default = "default_efficiency")]
    pub discharging_efficiency: f64,
    /// Self-discharge per day (0.0–1.0).
    #[serde(default = "default_daily_storage_loss")]
    pub daily_storage_loss: f64,
    /// Solar inverter efficiency (0.0–1.0).
    #[serde(default = "default_efficiency")]
    pub panel_efficiency: f64,
    #[serde(default)]
    pub statistics: StatisticsKind,
    /// Efficiency per hour of day, for `statistics = "hourly"`.
    #[serde(default)]
    pub hourly_efficiency: Vec<f64>,
    /// Initial charge level (0.0–1.0).
    #[serde(default)]
    pub start_storage_level: f64,
    /// Level below which the device charges from the grid (0.0–1.0).
    #[serde(default)]
    pub force_charging_limit: f64,
    /// When an electric car is away.
    #[serde(default)]
    pub usage_profile: Option<UsageProfileConfig>,
}

fn default_count() -> usize {
    1
}

fn default_efficiency() -> f64 {
    0.9
}

fn default_daily_storage_loss() -> f64 {
    0.05
}

impl DeviceConfig {
    /// Entry of the given type with every optional field at its default.
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            device_type,
            name: None,
            count: default_count(),
            production_kw: None,
            consumption_kw: None,
            noise_std_kw: 0.0,
            seed: 0,
            capacity_kwh: None,
            charge_rate_kw: None,
            discharge_rate_kw: None,
            charging_efficiency: default_efficiency(),
            discharging_efficiency: default_efficiency(),
            daily_storage_loss: default_daily_storage_loss(),
            panel_efficiency: default_efficiency(),
            statistics: StatisticsKind::default(),
            hourly_efficiency: Vec::new(),
            start_storage_level: 0.0,
            force_charging_limit: 0.0,
            usage_profile: None,
        }
    }

    /// Configured name, or the type's default name.
    pub fn base_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.device_type.default_name())
    }

    /// Ids of the devices this entry expands to.
    ///
    /// A single device keeps the base name; `count > 1` numbers them
    /// `name-01`, `name-02`, ...
    pub fn instance_ids(&self) -> Vec<String> {
        let base = self.base_name();
        if self.count == 1 {
            return vec![base.to_string()];
        }
        (1..=self.count).map(|index| format!("{base}-{index:02}")).collect()
    }
}

/// Weekly absence of an electric car.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageProfileConfig {
    /// Days the car leaves, e.g. `["Mon", "Tue"]`.
    pub days: Vec<Weekday>,
    /// Departure, `HH:MM`.
    pub start_usage: String,
    /// Return, `HH:MM`.
    pub end_usage: String,
    /// Energy used per trip (kWh).
    pub energy_consumption_kwh: f64,
}

impl UsageProfileConfig {
    /// Parses departure and return times.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the malformed field.
    pub fn times(&self) -> Result<(NaiveTime, NaiveTime), ConfigError> {
        let parse = |value: &str, field: &str| {
            NaiveTime::parse_from_str(value, TIME_OF_DAY_FORMAT).map_err(|e| ConfigError {
                field: format!("usage_profile.{field}"),
                message: format!("\"{value}\" is not a {TIME_OF_DAY_FORMAT} time: {e}"),
            })
        };
        Ok((parse(&self.start_usage, "start_usage")?, parse(&self.end_usage, "end_usage")?))
    }
}

/// What the optimizer minimizes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoalsConfig {
    pub car_charging: CarChargingConfig,
    pub grid_using: GridUsingConfig,
}

/// Penalty for cars ending below a charge level.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarChargingConfig {
    /// Target charge level (0.0–1.0).
    pub percentage: f64,
    /// Size of one penalty block (0.0–1.0, > 0).
    pub block: f64,
    /// Price of one block of shortfall.
    pub price: Money,
}

impl Default for CarChargingConfig {
    fn default() -> Self {
        Self { percentage: 0.9, block: 0.1, price: Money::of_eur(5.0) }
    }
}

/// Net grid cost as penalty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridUsingConfig {
    pub enabled: bool,
}

impl Default for GridUsingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl GoalsConfig {
    /// # Errors
    ///
    /// Returns a `ConfigError` if a percentage is outside `[0, 1]`.
    pub fn to_goals(&self) -> Result<OptimizationGoals, ConfigError> {
        let car = &self.car_charging;
        let percentage = |value: f64, field: &str| {
            Percentage::new(value).map_err(|e| ConfigError {
                field: format!("goals.car_charging.{field}"),
                message: e.to_string(),
            })
        };
        Ok(OptimizationGoals {
            car_charging: CarChargeGoal {
                percentage: percentage(car.percentage, "percentage")?,
                penalty: PercentagePenalty { percentage: percentage(car.block, "block")?, price: car.price },
            },
            grid_using: GridUsingGoal { enabled: self.grid_using.enabled },
        })
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.step_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
    /// A house with rooftop solar, a home battery and a car that stays home.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            installation: InstallationConfig {
                devices: vec![
                    DeviceConfig {
                        production_kw: Some(5.0),
                        statistics: StatisticsKind::Curved,
                        ..DeviceConfig::new(DeviceType::SolarPanel)
                    },
                    DeviceConfig {
                        name: Some("House".into()),
                        consumption_kw: Some(0.5),
                        noise_std_kw: 0.1,
                        seed: 42,
                        ..DeviceConfig::new(DeviceType::NoisyUsage)
                    },
                    DeviceConfig {
                        capacity_kwh: Some(10.0),
                        charge_rate_kw: Some(5.0),
                        discharge_rate_kw: Some(5.0),
                        start_storage_level: 0.5,
                        ..DeviceConfig::new(DeviceType::Battery)
                    },
                    DeviceConfig {
                        name: Some("Car".into()),
                        capacity_kwh: Some(50.0),
                        charge_rate_kw: Some(11.0),
                        discharge_rate_kw: Some(11.0),
                        start_storage_level: 0.5,
                        ..DeviceConfig::new(DeviceType::ElectricCar)
                    },
                    DeviceConfig::new(DeviceType::Grid),
                ],
                ..InstallationConfig::default()
            },
            goals: GoalsConfig::default(),
        }
    }

    /// Baseline with a car that is away on weekdays during office hours.
    pub fn commuter() -> Self {
        let mut scenario = Self::baseline();
        scenario.simulation.id = "commuter".to_string();
        for device in &mut scenario.installation.devices {
            if device.device_type == DeviceType::ElectricCar {
                device.start_storage_level = 0.3;
                device.usage_profile = Some(UsageProfileConfig {
                    days: vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
                    start_usage: "07:30".into(),
                    end_usage: "17:30".into(),
                    energy_consumption_kwh: 12.0,
                });
            }
        }
        scenario
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "commuter"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "commuter" => Ok(Self::commuter()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Time window of the optimization.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the window cannot be resolved.
    pub fn optimization_request(&self) -> Result<OptimizationRequest, ConfigError> {
        let (start, end) = self.simulation.window()?;
        Ok(OptimizationRequest { start, end, step: self.simulation.step() })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        self.validate_simulation(&mut errors);
        self.validate_installation(&mut errors);
        self.validate_goals(&mut errors);
        errors
    }

    fn validate_simulation(&self, errors: &mut Vec<ConfigError>) {
        let s = &self.simulation;
        if s.id.trim().is_empty() {
            errors.push(ConfigError { field: "simulation.id".into(), message: "must not be empty".into() });
        }
        if s.step_minutes <= 0 {
            errors.push(ConfigError {
                field: "simulation.step_minutes".into(),
                message: "must be > 0".into(),
            });
        }
        if s.max_iterations == 0 {
            errors.push(ConfigError {
                field: "simulation.max_iterations".into(),
                message: "must be > 0".into(),
            });
        }
        match s.window() {
            Ok((start, end)) if end <= start => errors.push(ConfigError {
                field: "simulation.end".into(),
                message: "must be after simulation.start".into(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }

    fn validate_installation(&self, errors: &mut Vec<ConfigError>) {
        let installation = &self.installation;
        match &installation.grid {
            GridConfig::Flat { import_price, export_price } => {
                if import_price.currency() != export_price.currency() {
                    errors.push(ConfigError {
                        field: "installation.grid.export_price".into(),
                        message: format!("must be in {}", import_price.currency()),
                    });
                }
                if import_price.amount() < 0.0 || export_price.amount() < 0.0 {
                    errors.push(ConfigError {
                        field: "installation.grid".into(),
                        message: "prices must be >= 0".into(),
                    });
                }
            }
            GridConfig::Csv { currency, resources, import_charge, export_charge } => {
                if resources.is_empty() {
                    errors.push(ConfigError {
                        field: "installation.grid.resources".into(),
                        message: "must list at least one price table".into(),
                    });
                }
                for (field, charge) in [("import_charge", import_charge), ("export_charge", export_charge)] {
                    if charge.currency() != *currency {
                        errors.push(ConfigError {
                            field: format!("installation.grid.{field}"),
                            message: format!("must be in {currency}"),
                        });
                    }
                }
            }
        }

        if let WeatherConfig::Flat { sunrise_hour, sunset_hour } = installation.weather {
            if sunrise_hour >= sunset_hour || sunset_hour > 24 {
                errors.push(ConfigError {
                    field: "installation.weather.sunrise_hour".into(),
                    message: "must be < installation.weather.sunset_hour <= 24".into(),
                });
            }
        }

        let mut ids = BTreeSet::new();
        let mut grids = 0;
        for (index, device) in installation.devices.iter().enumerate() {
            let prefix = format!("installation.devices[{index}]");
            validate_device(device, &prefix, errors);
            if device.device_type == DeviceType::Grid {
                grids += device.count;
            }
            for id in device.instance_ids() {
                if !ids.insert((device.device_type, id.clone())) {
                    errors.push(ConfigError {
                        field: format!("{prefix}.name"),
                        message: format!("duplicate {} \"{id}\"", device.device_type),
                    });
                }
            }
        }
        if grids != 1 {
            errors.push(ConfigError {
                field: "installation.devices".into(),
                message: format!("must contain exactly one grid device, found {grids}"),
            });
        }
    }

    fn validate_goals(&self, errors: &mut Vec<ConfigError>) {
        let car = &self.goals.car_charging;
        if !(0.0..=1.0).contains(&car.percentage) {
            errors.push(ConfigError {
                field: "goals.car_charging.percentage".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if !(car.block > 0.0 && car.block <= 1.0) {
            errors.push(ConfigError {
                field: "goals.car_charging.block".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if car.price.currency() != self.installation.currency() {
            errors.push(ConfigError {
                field: "goals.car_charging.price".into(),
                message: format!("must be in {}", self.installation.currency()),
            });
        }
    }
}

fn validate_device(device: &DeviceConfig, prefix: &str, errors: &mut Vec<ConfigError>) {
    let mut require = |value: Option<f64>, field: &str| match value {
        None => errors.push(ConfigError {
            field: format!("{prefix}.{field}"),
            message: format!("required for {}", device.device_type),
        }),
        Some(v) if v < 0.0 => errors.push(ConfigError {
            field: format!("{prefix}.{field}"),
            message: "must be >= 0".into(),
        }),
        Some(_) => {}
    };
    match device.device_type {
        DeviceType::SolarPanel => require(device.production_kw, "production_kw"),
        DeviceType::NoisyUsage => require(device.consumption_kw, "consumption_kw"),
        DeviceType::Battery | DeviceType::ElectricCar => {
            require(device.capacity_kwh, "capacity_kwh");
            require(device.charge_rate_kw, "charge_rate_kw");
            require(device.discharge_rate_kw, "discharge_rate_kw");
        }
        DeviceType::Grid => {}
    }

    if device.count == 0 {
        errors.push(ConfigError { field: format!("{prefix}.count"), message: "must be >= 1".into() });
    }
    if device.noise_std_kw < 0.0 {
        errors.push(ConfigError { field: format!("{prefix}.noise_std_kw"), message: "must be >= 0".into() });
    }

    let fractions = [
        ("charging_efficiency", device.charging_efficiency),
        ("discharging_efficiency", device.discharging_efficiency),
        ("daily_storage_loss", device.daily_storage_loss),
        ("panel_efficiency", device.panel_efficiency),
        ("start_storage_level", device.start_storage_level),
        ("force_charging_limit", device.force_charging_limit),
    ];
    for (field, value) in fractions {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError {
                field: format!("{prefix}.{field}"),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
    }

    if device.statistics == StatisticsKind::Hourly {
        if device.hourly_efficiency.len() != 24 {
            errors.push(ConfigError {
                field: format!("{prefix}.hourly_efficiency"),
                message: format!("must have 24 values, got {}", device.hourly_efficiency.len()),
            });
        }
        if device.hourly_efficiency.iter().any(|v| !(0.0..=1.0).contains(v)) {
            errors.push(ConfigError {
                field: format!("{prefix}.hourly_efficiency"),
                message: "values must be in [0.0, 1.0]".into(),
            });
        }
    }

    if let Some(profile) = &device.usage_profile {
        if device.device_type != DeviceType::ElectricCar {
            errors.push(ConfigError {
                field: format!("{prefix}.usage_profile"),
                message: "only electric cars have a usage profile".into(),
            });
        }
        match profile.times() {
            Ok((start, end)) if end <= start => errors.push(ConfigError {
                field: format!("{prefix}.usage_profile.end_usage"),
                message: "must be after start_usage".into(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ConfigError { field: format!("{prefix}.{}", e.field), message: e.message }),
        }
        if profile.energy_consumption_kwh < 0.0 {
            errors.push(ConfigError {
                field: format!("{prefix}.usage_profile.energy_consumption_kwh"),
                message: "must be >= 0".into(),
            });
        }
    }
}
