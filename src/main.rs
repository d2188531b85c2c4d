//! Home energy simulator entry point: CLI wiring around the optimizer.

mod cli;

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

use home_energy_sim::config::ScenarioConfig;
use home_energy_sim::optimization::{OptimizationResult, Optimizer};
use home_energy_sim::sim::{CsvMetricsExporter, DeviceManipulator, SimulationMetricsExporter, Simulator};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().compact().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_scenario(options: &cli::CliOptions) -> Result<ScenarioConfig> {
    let scenario = if let Some(path) = &options.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(name) = &options.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("scenario \"{}\" has {} configuration error(s)", scenario.simulation.id, errors.len());
    }
    Ok(scenario)
}

/// Re-runs the best schedule with a CSV sink attached.
fn write_metrics(path: &Path, scenario: &ScenarioConfig, result: &OptimizationResult) -> Result<()> {
    let exporter = Arc::new(
        CsvMetricsExporter::create(path).with_context(|| format!("cannot create \"{}\"", path.display()))?,
    );
    let sink: Arc<dyn SimulationMetricsExporter> = exporter.clone();

    let mut request = (*result.simulation_result.request).clone();
    request.id.clone_from(&scenario.simulation.id);
    let manipulators: Vec<&dyn DeviceManipulator> =
        result.schedule.iter().map(|m| m as &dyn DeviceManipulator).collect();
    Simulator::new(sink).simulate_with(Arc::new(request), &manipulators)?;
    exporter.flush().with_context(|| format!("cannot write \"{}\"", path.display()))?;

    info!(path = %path.display(), "metrics written");
    Ok(())
}

fn print_summary(scenario: &ScenarioConfig, result: &OptimizationResult) {
    let request = &result.simulation_result.request;
    println!("scenario:         {}", scenario.simulation.id);
    println!("horizon:          {} .. {} ({} min slots)", request.start, request.end, request.step.num_minutes());
    println!("baseline penalty: {}", result.baseline_penalty);
    println!("best penalty:     {} after {} iteration(s)", result.penalty, result.iterations);
    if result.schedule.is_empty() {
        println!("schedule:         none, baseline is best");
    } else {
        println!("schedule:         {}", result.schedule.iter().join(", "));
    }
    println!("ledger:           {}", result.simulation_result.ledger);
    for (device, state) in &result.simulation_result.end_state {
        println!("  {device}: {state}");
    }
}

fn run(options: &cli::CliOptions) -> Result<()> {
    let scenario = load_scenario(options)?;
    let goals = scenario.goals.to_goals()?;
    let request = scenario.optimization_request()?;
    let max_iterations = options.max_iterations.unwrap_or(scenario.simulation.max_iterations);

    let result = Optimizer::default()
        .with_max_iterations(max_iterations)
        .optimize(&scenario.installation, &goals, &request)
        .with_context(|| format!("optimizing scenario \"{}\"", scenario.simulation.id))?;

    if let Some(path) = &options.metrics_out {
        write_metrics(path, &scenario, &result)?;
    }
    print_summary(&scenario, &result);
    Ok(())
}

fn main() {
    init_logging();

    let options = match cli::parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
