// src/main.rs - `otg` command line: plan jobs, stress the planner, check inputs
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use krusty_otg::config::{self, OtgConfig};
use krusty_otg::motion::{missed_target, Calculator, InputParameter, Randomizer, Trajectory};

/// Jerk-limited trajectory generator
#[derive(Parser, Debug)]
#[command(name = "otg", about = "Time-optimal, jerk-limited trajectory planning.")]
struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the config
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan a job and print its trajectory
    Plan {
        job: PathBuf,
        /// Number of evenly spaced states to print
        #[arg(long, default_value_t = 10)]
        samples: usize,
        /// Print JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Plan random inputs and report failures
    Stress {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 10_000)]
        count: usize,
        #[arg(long, default_value_t = 3)]
        dofs: usize,
    },
    /// Validate a job without planning it
    Check { job: PathBuf },
}

#[derive(Debug, Serialize)]
struct Sample<'a> {
    time: f64,
    position: &'a [f64],
    velocity: &'a [f64],
    acceleration: &'a [f64],
}

fn load_job(path: &Path, config: &OtgConfig) -> Result<InputParameter, Box<dyn std::error::Error>> {
    let mut input = InputParameter::load(path)?;
    config.apply_limits(&mut input);
    Ok(input)
}

fn print_trajectory(trajectory: &Trajectory, samples: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dofs = trajectory.degrees_of_freedom();
    println!("duration: {:.10} s", trajectory.duration());
    println!("independent minimum durations: {:?}", trajectory.independent_min_durations());
    println!("position extrema: {}", serde_json::to_string(&trajectory.position_extrema())?);

    let (mut p, mut v, mut a, mut j) = (vec![0.0; dofs], vec![0.0; dofs], vec![0.0; dofs], vec![0.0; dofs]);
    let steps = samples.max(2) - 1;
    for k in 0..=steps {
        let time = trajectory.duration() * k as f64 / steps as f64;
        trajectory.at_time(time, &mut p, &mut v, &mut a, &mut j)?;
        if json {
            println!("{}", serde_json::to_string(&Sample { time, position: &p, velocity: &v, acceleration: &a })?);
        } else {
            println!("{time:>10.4}  p={p:.5?}  v={v:.5?}  a={a:.5?}");
        }
    }
    Ok(())
}

fn stress(seed: u64, count: usize, dofs: usize, delta_time: f64) -> usize {
    let mut randomizer = Randomizer::new(seed);
    let mut calculator = Calculator::new(dofs, delta_time);
    let mut failures = 0;
    for i in 0..count {
        let input = if i % 4 == 3 { randomizer.velocity_input(dofs) } else { randomizer.position_input(dofs) };
        match calculator.calculate(&input) {
            Ok(trajectory) => {
                if let Some(dof) = missed_target(&input, &trajectory) {
                    failures += 1;
                    tracing::warn!(case = i, dof, "trajectory misses its target");
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(case = i, error = %e, input = ?input, "planning failed");
            }
        }
    }
    failures
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => OtgConfig::default(),
    };
    let level = if cli.verbose { tracing::Level::DEBUG } else { config.logging.tracing_level()? };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Plan { job, samples, json } => {
            let input = load_job(&job, &config)?;
            tracing::info!("Planning {} with {} DOFs", job.display(), input.degrees_of_freedom);
            let mut calculator = Calculator::new(input.degrees_of_freedom, config.control.delta_time);
            let trajectory = calculator.calculate(&input)?;
            print_trajectory(&trajectory, samples, json)?;
        }
        Commands::Stress { seed, count, dofs } => {
            tracing::info!("Stress run: seed {seed}, {count} inputs, {dofs} DOFs");
            let failures = stress(seed, count, dofs, config.control.delta_time);
            println!("{failures} of {count} inputs failed");
            if failures > 0 {
                std::process::exit(1);
            }
        }
        Commands::Check { job } => {
            let input = load_job(&job, &config)?;
            match input.validate(false, true) {
                Ok(()) => println!("{}: ok", job.display()),
                Err(e) => {
                    println!("{}: {e}", job.display());
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
