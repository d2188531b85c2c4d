//! Slot-by-slot simulation of a home installation.

/// Engine running requests slot by slot.
pub mod engine;
/// Running energy and revenue ledger.
pub mod ledger;
pub mod manipulator;
/// Per-slot metrics sinks.
pub mod metrics;
pub mod types;

pub use engine::Simulator;
pub use ledger::EnergySystem;
pub use manipulator::DeviceManipulator;
pub use metrics::{CsvMetricsExporter, ExportError, NoopExporter, SimulationMetricsExporter};
pub use types::{SimulationError, SimulationRequest, SimulationResult, SimulationStep};
