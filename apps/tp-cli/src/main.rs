use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tp_config::{ConfigError, ConfigSources, ParameterConfig, ProcessEnv};
use tp_core::timing::{PerfStats, Timer};
use tp_results::{
    ChartSeries, ResultsError, RunManifest, RunStore, TimeseriesRecord, compute_run_id,
};
use tp_sim::{GainGrid, SimError, SimSummary, SimulationLoop, SimulationParameters, run_sweep};
use tracing::{debug, info, warn};

const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "thermopid")]
#[command(about = "thermopid - closed-loop PID temperature simulation", long_about = None)]
struct Cli {
    /// Emit logs as JSON (also enabled by TP_LOG_FORMAT=json)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one simulation and print its statistics
    Run {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        overrides: ParamOverrides,
        /// Chart CSV path (defaults to OUTPUT_FILE / output_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory holding the run cache
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Do not write the run to the cache
        #[arg(long)]
        no_save: bool,
    },
    /// Run a grid of gains in parallel and rank them by final error
    Sweep {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        overrides: ParamOverrides,
        /// Comma-separated proportional gains
        #[arg(long = "kp-values", value_delimiter = ',')]
        kp_values: Vec<f64>,
        /// Comma-separated integral gains
        #[arg(long = "ki-values", value_delimiter = ',')]
        ki_values: Vec<f64>,
        /// Comma-separated derivative gains
        #[arg(long = "kd-values", value_delimiter = ',')]
        kd_values: Vec<f64>,
        /// Number of rows to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// List cached runs
    Runs {
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Run ID to display
        run_id: String,
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,
    },
    /// Export time series data from a cached run as CSV
    ExportSeries {
        /// Run ID
        run_id: String,
        /// Single variable (pv, error, cv, setpoint); all columns if omitted
        variable: Option<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,
    },
    /// Write a parameter file populated with the defaults
    InitConfig {
        /// Destination (.yaml, .yml or .json)
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Parameter file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ParamOverrides {
    #[arg(long)]
    kp: Option<f64>,
    #[arg(long)]
    ki: Option<f64>,
    #[arg(long)]
    kd: Option<f64>,
    #[arg(long)]
    sample_time: Option<f64>,
    #[arg(long)]
    ambient_temp: Option<f64>,
    #[arg(long)]
    cooling_rate: Option<f64>,
    #[arg(long)]
    heating_efficiency: Option<f64>,
    #[arg(long)]
    thermal_inertia: Option<f64>,
    #[arg(long)]
    setpoint: Option<f64>,
    #[arg(long)]
    initial_temp: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    max_iterations: Option<i64>,
}

impl ParamOverrides {
    fn apply(&self, cfg: &mut ParameterConfig) {
        let reals = [
            (self.kp, &mut cfg.kp),
            (self.ki, &mut cfg.ki),
            (self.kd, &mut cfg.kd),
            (self.sample_time, &mut cfg.sample_time),
            (self.ambient_temp, &mut cfg.ambient_temp),
            (self.cooling_rate, &mut cfg.cooling_rate),
            (self.heating_efficiency, &mut cfg.heating_efficiency),
            (self.thermal_inertia, &mut cfg.thermal_inertia),
            (self.setpoint, &mut cfg.setpoint),
            (self.initial_temp, &mut cfg.initial_temp),
        ];
        for (value, slot) in reals {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(n) = self.max_iterations {
            cfg.max_iterations = n;
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let json = json || std::env::var("TP_LOG_FORMAT").as_deref() == Ok("json");

    // Logs go to stderr so the report on stdout stays clean.
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Run {
            source,
            overrides,
            output,
            store_dir,
            no_cache,
            no_save,
        } => cmd_run(
            &source,
            &overrides,
            output.as_deref(),
            &store_dir,
            !no_cache,
            !no_save,
        ),
        Commands::Sweep {
            source,
            overrides,
            kp_values,
            ki_values,
            kd_values,
            top,
        } => cmd_sweep(
            &source,
            &overrides,
            GainGrid {
                kp: kp_values,
                ki: ki_values,
                kd: kd_values,
            },
            top,
        ),
        Commands::Runs { store_dir } => cmd_runs(&store_dir),
        Commands::ShowRun { run_id, store_dir } => cmd_show_run(&store_dir, &run_id),
        Commands::ExportSeries {
            run_id,
            variable,
            output,
            store_dir,
        } => cmd_export_series(&store_dir, &run_id, variable.as_deref(), output.as_deref()),
        Commands::InitConfig { path, force } => cmd_init_config(&path, force),
    }
}

fn resolve_config(source: &SourceArgs, overrides: &ParamOverrides) -> CliResult<ParameterConfig> {
    let default_env = Path::new(".env");
    let dotenv = match &source.env_file {
        Some(path) => Some(path.as_path()),
        None if default_env.is_file() => Some(default_env),
        None => None,
    };

    let mut cfg = tp_config::resolve(&ConfigSources {
        file: source.config.as_deref(),
        dotenv,
        env: &ProcessEnv,
    })?;
    overrides.apply(&mut cfg);
    debug!(?cfg, "resolved configuration");
    Ok(cfg)
}

fn cmd_run(
    source: &SourceArgs,
    overrides: &ParamOverrides,
    output: Option<&Path>,
    store_dir: &Path,
    use_cache: bool,
    save: bool,
) -> CliResult<()> {
    let mut perf = PerfStats::default();

    let timer = Timer::start();
    let cfg = resolve_config(source, overrides)?;
    let params = cfg.to_parameters()?;
    perf.config_time_s = timer.elapsed_s();

    let store = if save || use_cache {
        Some(RunStore::in_dir(store_dir)?)
    } else {
        None
    };
    let run_id = compute_run_id(&params, SOLVER_VERSION);

    let cached = match &store {
        Some(store) if use_cache => {
            let timer = Timer::start();
            let loaded = load_cached(store, &run_id);
            perf.load_cache_time_s = timer.elapsed_s();
            loaded
        }
        _ => None,
    };

    let (summary, rows) = match cached {
        Some((manifest, rows)) => {
            println!("✓ Loaded from cache: {}", run_id);
            (manifest.summary, rows)
        }
        None => {
            let timer = Timer::start();
            let sim = SimulationLoop::new(params)?;
            let record = sim.run();
            perf.simulate_time_s = timer.elapsed_s();
            perf.runs = 1;

            let summary = SimSummary::from_record(&params, &record);
            let rows = TimeseriesRecord::from_record(&record, params.sample_time);

            if let (true, Some(store)) = (save, &store) {
                let timer = Timer::start();
                let manifest = RunManifest::new(params, summary.clone(), SOLVER_VERSION);
                match store.save_run(&manifest, &rows) {
                    Ok(()) => println!("✓ Simulation completed: {}", manifest.run_id),
                    Err(ResultsError::NonFiniteRun { run_id }) => {
                        warn!(%run_id, "run diverged to NaN or infinity, not cached");
                        println!("✓ Simulation completed (not cached: non-finite values)");
                    }
                    Err(err) => return Err(err.into()),
                }
                perf.save_time_s = timer.elapsed_s();
            } else {
                println!("✓ Simulation completed");
            }
            (summary, rows)
        }
    };

    let chart = ChartSeries::from_timeseries(&rows, params.sample_time, params.initial_temp);
    let output = output.unwrap_or(cfg.output_file.as_path());
    write_chart_csv(&chart, output)?;
    println!("✓ Chart data saved: {}", output.display());

    print_statistics(&params, &summary);
    perf.print_summary();
    Ok(())
}

fn write_chart_csv(chart: &ChartSeries, path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = io::BufWriter::new(std::fs::File::create(path)?);
    chart.write_csv(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Cached run for `run_id`, or `None` on a miss. An entry that cannot be
/// read counts as a miss so the run is simulated again.
fn load_cached(store: &RunStore, run_id: &str) -> Option<(RunManifest, Vec<TimeseriesRecord>)> {
    if !store.has_run(run_id) {
        return None;
    }
    match store.load_run(run_id) {
        Ok(loaded) => Some(loaded),
        Err(err) => {
            warn!(run_id, error = %err, "ignoring unreadable cached run");
            None
        }
    }
}

fn print_statistics(params: &SimulationParameters, summary: &SimSummary) {
    println!("\nSimulation statistics:");
    println!("  Setpoint:            {:.2} °C", summary.setpoint);
    println!("  Initial temperature: {:.2} °C", summary.initial_temp);
    println!("  Final temperature:   {:.2} °C", summary.final_temp);
    println!("  Final error:         {:.2} °C", summary.final_abs_error);
    println!("  Max overshoot:       {:.2} °C", summary.max_overshoot);
    println!(
        "  Total time:          {:.1} min ({} iterations)",
        summary.total_time_min(),
        summary.iterations
    );
    println!(
        "  Saturated steps:     {} (peak CV {:.1}%)",
        summary.saturated_iterations, summary.peak_control_value
    );
    println!(
        "\nPID gains: Kp={}, Ki={}, Kd={}",
        params.kp, params.ki, params.kd
    );
    println!(
        "Plant: inertia={}, cooling={}, efficiency={}",
        params.thermal_inertia, params.cooling_rate, params.heating_efficiency
    );
}

fn cmd_sweep(
    source: &SourceArgs,
    overrides: &ParamOverrides,
    grid: GainGrid,
    top: usize,
) -> CliResult<()> {
    let mut perf = PerfStats::default();

    let timer = Timer::start();
    let base = resolve_config(source, overrides)?.to_parameters()?;
    let sets = grid.expand(&base);
    perf.config_time_s = timer.elapsed_s();

    println!("Running sweep over {} parameter set(s)", sets.len());
    let timer = Timer::start();
    let outcomes = run_sweep(&sets);
    perf.simulate_time_s = timer.elapsed_s();
    perf.runs = outcomes.len();

    let mut ranked = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(summary) => ranked.push((outcome.parameters, summary)),
            Err(e) => warn!(
                kp = outcome.parameters.kp,
                ki = outcome.parameters.ki,
                kd = outcome.parameters.kd,
                error = %e,
                "sweep run rejected"
            ),
        }
    }
    ranked.sort_by(|a, b| a.1.final_abs_error.total_cmp(&b.1.final_abs_error));
    info!(valid = ranked.len(), total = sets.len(), "sweep finished");

    println!(
        "\n{:>10} {:>10} {:>10} {:>12} {:>12} {:>12}",
        "Kp", "Ki", "Kd", "final °C", "error °C", "overshoot"
    );
    for (params, summary) in ranked.iter().take(top) {
        println!(
            "{:>10} {:>10} {:>10} {:>12.2} {:>12.2} {:>12.2}",
            params.kp,
            params.ki,
            params.kd,
            summary.final_temp,
            summary.final_abs_error,
            summary.max_overshoot
        );
    }
    if ranked.len() < sets.len() {
        println!(
            "\n{} parameter set(s) rejected (see log)",
            sets.len() - ranked.len()
        );
    }

    perf.print_summary();
    Ok(())
}

fn cmd_runs(store_dir: &Path) -> CliResult<()> {
    let store = RunStore::in_dir(store_dir)?;
    let runs = store.list_runs()?;

    if runs.is_empty() {
        println!("No cached runs in {}", store.root_dir().display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            let p = &manifest.parameters;
            println!(
                "  {} ({})  Kp={} Ki={} Kd={}  final={:.2} °C",
                manifest.run_id,
                manifest.timestamp,
                p.kp,
                p.ki,
                p.kd,
                manifest.summary.final_temp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(store_dir: &Path, run_id: &str) -> CliResult<()> {
    println!("Loading run: {}", run_id);

    let store = RunStore::in_dir(store_dir)?;
    let (manifest, records) = store.load_run(run_id)?;

    println!("\nRun Summary:");
    println!("  Created: {}", manifest.timestamp);
    println!("  Solver version: {}", manifest.solver_version);
    println!("  Time points: {}", records.len());
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        println!("  Time range: {:.1} - {:.1} s", first.time_s, last.time_s);
    }
    print_statistics(&manifest.parameters, &manifest.summary);
    Ok(())
}

fn cmd_export_series(
    store_dir: &Path,
    run_id: &str,
    variable: Option<&str>,
    output: Option<&Path>,
) -> CliResult<()> {
    let store = RunStore::in_dir(store_dir)?;
    let (manifest, records) = store.load_run(run_id)?;
    let p = &manifest.parameters;
    let chart = ChartSeries::from_timeseries(&records, p.sample_time, p.initial_temp);

    let csv = match variable {
        None => chart.to_csv_string(),
        Some(name) => {
            let values = chart
                .column(name)
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown variable: {}", name)))?;
            let mut csv = String::from("time_s,value\n");
            for (t, val) in chart.time_s.iter().zip(values) {
                csv.push_str(&format!("{},{}\n", t, val));
            }
            csv
        }
    };

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            chart.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
        io::stdout().flush()?;
    }

    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let cfg = ParameterConfig::default();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => tp_config::save_json(path, &cfg)?,
        Some("yaml" | "yml") => tp_config::save_yaml(path, &cfg)?,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
            .into());
        }
    }
    println!("✓ Wrote default parameters to {}", path.display());
    Ok(())
}
