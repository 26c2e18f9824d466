use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use ps_app::{
    AppError, AppResult, RunOptions, RunProgressEvent, RunRequest, RunResponse, RunStage, Signal,
    apply_preset, execute_run_with_progress, extract_series, frame_at, tuning_preset,
};
use ps_project::RunConfig;
use ps_sim::PlantKind;

#[derive(Parser)]
#[command(name = "pidsim")]
#[command(about = "pidsim CLI - Closed-loop PID control simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run configuration file
    Validate {
        /// Path to the configuration (YAML or JSON)
        config_path: PathBuf,
    },
    /// Write a default run configuration
    Init {
        /// Destination path (.yaml or .json)
        path: PathBuf,
        /// Plant kind (first_order, mass_spring_damper, dc_motor)
        #[arg(long, default_value = "mass_spring_damper")]
        plant: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run a simulation and report step-response metrics
    Run {
        /// Path to the configuration (YAML or JSON)
        config_path: PathBuf,
        /// Noise seed, overriding the configured one
        #[arg(long)]
        seed: Option<u64>,
        /// Replace the gains with the tuning preset for the plant
        #[arg(long)]
        preset: bool,
        /// Write samples to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sample file format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Print the animation frame at a sample index
    Frame {
        /// Path to the configuration (YAML or JSON)
        config_path: PathBuf,
        /// Sample index
        index: usize,
        /// Noise seed, overriding the configured one
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Export one signal as time,value CSV
    ExportSeries {
        /// Path to the configuration (YAML or JSON)
        config_path: PathBuf,
        /// Signal name (y_true, y_measured, reference, u, e)
        signal: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List tuning presets per plant kind
    Presets,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Init { path, plant, force } => cmd_init(&path, &plant, force),
        Commands::Run {
            config_path,
            seed,
            preset,
            output,
            format,
        } => cmd_run(&config_path, seed, preset, output.as_deref(), format),
        Commands::Frame {
            config_path,
            index,
            seed,
        } => cmd_frame(&config_path, index, seed),
        Commands::ExportSeries {
            config_path,
            signal,
            output,
        } => cmd_export_series(&config_path, &signal, output.as_deref()),
        Commands::Presets => cmd_presets(),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = ps_project::load_config(config_path)?;
    println!("✓ Configuration is valid");
    println!("  Name: {}", config.name);
    println!("  Plant: {}", config.plant.kind);
    println!(
        "  dt = {:.4} s, t_end = {:.3} s",
        config.experiment.dt, config.experiment.t_end
    );
    Ok(())
}

fn cmd_init(path: &Path, plant: &str, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let kind: PlantKind = plant.parse()?;
    let config = RunConfig::with_plant(kind);
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        ps_project::save_json(path, &config)?;
    } else {
        ps_project::save_yaml(path, &config)?;
    }
    println!("✓ Wrote {} configuration to {}", kind, path.display());
    Ok(())
}

fn cmd_run(
    config_path: &Path,
    seed: Option<u64>,
    preset: bool,
    output: Option<&Path>,
    format: OutputFormat,
) -> AppResult<()> {
    let mut config = ps_project::load_config(config_path)?;
    if preset {
        let gains = apply_preset(&mut config)?;
        println!(
            "Using preset gains: Kp={} Ki={} Kd={} N={}",
            gains.kp, gains.ki, gains.kd, gains.n
        );
    }

    println!("Running '{}' ({})", config.name, config.plant.kind);
    println!(
        "  dt = {:.4} s, t_end = {:.3} s",
        config.experiment.dt, config.experiment.t_end
    );

    let response = run_with_cli_progress(&config, seed)?;

    println!("✓ Simulation completed: {} samples", response.samples.len());
    print_metrics(&response);
    print_timing_summary(&response.timing);

    if let Some(path) = output {
        let writer = BufWriter::new(File::create(path)?);
        match format {
            OutputFormat::Csv => ps_results::write_csv(writer, &response.samples)?,
            OutputFormat::Json => ps_results::write_json(writer, &response.samples)?,
        }
        println!(
            "✓ Exported {} samples to {}",
            response.samples.len(),
            path.display()
        );
    }

    Ok(())
}

fn cmd_frame(config_path: &Path, index: usize, seed: Option<u64>) -> AppResult<()> {
    let config = ps_project::load_config(config_path)?;
    let response = run_with_cli_progress(&config, seed)?;
    let frame = frame_at(&response.samples, index)?;
    println!(
        "frame {}: t={:.4} y={:.6} reference={:.6}",
        index, frame.t, frame.y_true, frame.reference
    );
    Ok(())
}

fn cmd_export_series(config_path: &Path, signal: &str, output: Option<&Path>) -> AppResult<()> {
    let signal: Signal = signal.parse()?;
    let config = ps_project::load_config(config_path)?;
    let response = run_with_cli_progress(&config, None)?;
    let series = extract_series(&response.samples, signal);

    // Build CSV
    let mut csv = format!("t,{}\n", signal.column());
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    // Write to file or stdout
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}

fn cmd_presets() -> AppResult<()> {
    println!("Tuning presets:");
    for kind in PlantKind::ALL {
        let g = tuning_preset(kind);
        println!(
            "  {:<20} Kp={:<5} Ki={:<5} Kd={:<5} N={}",
            kind.as_str(),
            g.kp,
            g.ki,
            g.kd,
            g.n
        );
    }
    Ok(())
}

fn run_with_cli_progress(config: &RunConfig, seed: Option<u64>) -> AppResult<RunResponse> {
    let request = RunRequest {
        config,
        options: RunOptions {
            seed_override: seed,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = execute_run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            let fraction = event
                .simulation
                .as_ref()
                .map(|s| s.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    );
    clear_progress_line();
    response
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.simulation) {
        (RunStage::Simulating, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  step={}/{}  elapsed={:.1}s",
                bar,
                s.fraction_complete * 100.0,
                s.sim_time_s,
                s.t_end_s,
                s.step,
                s.steps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let mut line = format!(
                "\r{}  elapsed={:.2}s",
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.4}{}", v, unit),
        None => "n/a".to_string(),
    }
}

fn print_metrics(response: &RunResponse) {
    let m = &response.metrics;
    println!("\nStep response (target {}):", response.metric_target);
    println!("  Overshoot:     {}", fmt_opt(m.overshoot_pct, " %"));
    println!("  Rise time:     {}", fmt_opt(m.rise_time_s, " s"));
    println!("  Settling time: {}", fmt_opt(m.settling_time_s, " s"));
    println!("  Final value:   {}", fmt_opt(m.final_value, ""));

    let c = &response.control_metrics;
    println!("\nControl effort:");
    println!("  Max |u|:       {}", fmt_opt(c.max_abs_u, ""));
    println!("  Saturated:     {}", fmt_opt(c.saturation_pct, " %"));
    println!("  IAE:           {}", fmt_opt(c.integral_abs_error, ""));
    println!("  Final error:   {}", fmt_opt(c.steady_state_error, ""));
}

fn print_timing_summary(timing: &ps_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let compile_pct = 100.0 * timing.compile_time_s / total;
    let simulate_pct = 100.0 * timing.simulate_time_s / total;
    let metrics_pct = 100.0 * timing.metrics_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Compile:  {:.3}s ({:.1}%)",
        timing.compile_time_s, compile_pct
    );
    println!(
        "  Simulate: {:.3}s ({:.1}%)",
        timing.simulate_time_s, simulate_pct
    );
    println!(
        "  Metrics:  {:.3}s ({:.1}%)",
        timing.metrics_time_s, metrics_pct
    );
    println!("  Total:    {:.3}s", timing.total_time_s);
    println!("  Steps:    {}", timing.steps);
}
