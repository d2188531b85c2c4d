use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub metrics_out: Option<PathBuf>,
    pub max_iterations: Option<usize>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut metrics_out = None;
    let mut max_iterations = None;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--metrics-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --metrics-out (expected a file path)")?;
                if metrics_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--metrics-out provided more than once".to_string());
                }
            }
            "--max-iterations" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --max-iterations (expected a number)")?;
                let n = value
                    .parse::<usize>()
                    .map_err(|_| format!("--max-iterations value \"{value}\" is not a valid number"))?;
                max_iterations = Some(n);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err("arguments `--scenario` and `--preset` are mutually exclusive; choose one source".to_string());
    }

    Ok(CliOptions { scenario, preset, metrics_out, max_iterations })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index).map(String::as_str).ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("home-energy-sim: simulate a home installation and optimize car charging");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  home-energy-sim [--scenario <path> | --preset <name>] [--metrics-out <path>] [--max-iterations <n>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, commuter)");
    eprintln!("  --metrics-out <path>     Write per-slot metrics of the best schedule to CSV");
    eprintln!("  --max-iterations <n>     Override the optimizer's iteration cap");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If neither --scenario nor --preset is given, the baseline preset is used.");
}

#[cfg(test)]
mod tests {
    use super::parse_options;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_options(&args(&["--scenario", "home.toml"])).expect("parse should succeed");
        assert_eq!(opts.scenario.as_deref().and_then(|p| p.to_str()), Some("home.toml"));
        assert!(opts.preset.is_none());
    }

    #[test]
    fn supports_preset_and_overrides() {
        let opts = parse_options(&args(&["--preset", "commuter", "--metrics-out", "slots.csv", "--max-iterations", "50"]))
            .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("commuter"));
        assert_eq!(opts.metrics_out.as_deref().and_then(|p| p.to_str()), Some("slots.csv"));
        assert_eq!(opts.max_iterations, Some(50));
    }

    #[test]
    fn rejects_conflicting_sources() {
        let err = parse_options(&args(&["--scenario", "a.toml", "--preset", "baseline"])).err();
        assert!(err.is_some_and(|e| e.contains("mutually exclusive")));
    }

    #[test]
    fn rejects_bad_iteration_count() {
        assert!(parse_options(&args(&["--max-iterations", "many"])).is_err());
        assert!(parse_options(&args(&["--max-iterations"])).is_err());
    }

    #[test]
    fn defaults_to_no_source() {
        let opts = parse_options(&[]).expect("parse should succeed");
        assert!(opts.scenario.is_none() && opts.preset.is_none());
        assert!(opts.max_iterations.is_none());
    }
}
