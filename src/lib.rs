//! Home energy installation simulator and charge-schedule optimizer.

/// TOML scenario configuration and presets.
pub mod config;
pub mod devices;
pub mod forecast;
/// Penalty goals and schedule search.
pub mod optimization;
/// Simulation engine, ledger, manipulators and metrics.
pub mod sim;
pub mod units;
