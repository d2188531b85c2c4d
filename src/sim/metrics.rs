//! Per-slot metrics sinks.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;

use crate::forecast::ForecastError;
use crate::sim::SimulationResult;

/// Column header of the per-slot CSV export.
const HEADER: &str = "simulation,slot_start,duration_min,produced_kwh,consumed_kwh,\
                      charged_kwh,discharged_kwh,imported_kwh,exported_kwh,\
                      import_revenue,export_revenue,import_price,export_price,currency";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write metrics")]
    Csv(#[from] csv::Error),

    #[error("failed to write metrics")]
    Io(#[from] io::Error),

    #[error("metrics writer is poisoned")]
    Poisoned,

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Receives the delta of every simulated slot.
///
/// The engine logs export failures and carries on; a sink never changes
/// the outcome of a run.
pub trait SimulationMetricsExporter: Send + Sync {
    /// Records one slot. `slot.ledger` holds only this slot's flows and
    /// `slot.last_step` is the slot itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot could not be recorded.
    fn export_metrics(&self, slot: &SimulationResult) -> Result<(), ExportError>;

    /// Whether the engine should assemble slot reports at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discards all metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExporter;

impl SimulationMetricsExporter for NoopExporter {
    fn export_metrics(&self, _slot: &SimulationResult) -> Result<(), ExportError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Writes one CSV row per slot.
///
/// Rows are written in the order slots are exported; the header is written
/// on construction. Call [`CsvMetricsExporter::flush`] once the run is done.
pub struct CsvMetricsExporter<W: Write + Send> {
    writer: Mutex<csv::Writer<W>>,
}

impl CsvMetricsExporter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the header written.
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + Send> CsvMetricsExporter<W> {
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(writer: W) -> Result<Self, ExportError> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(HEADER.split(',').map(str::trim))?;
        Ok(Self { writer: Mutex::new(wtr) })
    }

    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be written.
    pub fn flush(&self) -> Result<(), ExportError> {
        let mut wtr = self.writer.lock().map_err(|_| ExportError::Poisoned)?;
        wtr.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be written.
    pub fn into_inner(self) -> Result<W, ExportError> {
        let mut wtr = self.writer.into_inner().map_err(|_| ExportError::Poisoned)?;
        wtr.flush()?;
        wtr.into_inner().map_err(|e| ExportError::Io(io::Error::new(e.error().kind(), e.to_string())))
    }
}

impl<W: Write + Send> SimulationMetricsExporter for CsvMetricsExporter<W> {
    fn export_metrics(&self, slot: &SimulationResult) -> Result<(), ExportError> {
        let step = &slot.last_step;
        let import_price = step.forecasts.prices.import_price(step.start)?;
        let export_price = step.forecasts.prices.export_price(step.start)?;
        let ledger = &slot.ledger;

        let mut wtr = self.writer.lock().map_err(|_| ExportError::Poisoned)?;
        wtr.write_record(&[
            slot.request.id.clone(),
            step.start.to_rfc3339(),
            step.duration.num_minutes().to_string(),
            format!("{:.4}", ledger.produced.kwh()),
            format!("{:.4}", ledger.consumed.kwh()),
            format!("{:.4}", ledger.charged.kwh()),
            format!("{:.4}", ledger.discharged.kwh()),
            format!("{:.4}", ledger.imported.kwh()),
            format!("{:.4}", ledger.exported.kwh()),
            format!("{:.4}", ledger.import_revenue.amount()),
            format!("{:.4}", ledger.export_revenue.amount()),
            format!("{:.4}", import_price.amount()),
            format!("{:.4}", export_price.amount()),
            ledger.currency().to_string(),
        ])?;
        Ok(())
    }
}
