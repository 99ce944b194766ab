//! Drone Patrol Simulation
//!
//! Headless driver: runs a fleet of drones over a grid for a fixed number of
//! ticks, writing the event stream, periodic snapshots and run statistics.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use patrol_core::config::{SimConfig, DEFAULT_CONFIG_PATH};
use patrol_core::events::EventLogger;
use patrol_core::output::{write_current_state, write_snapshot_to_dir, write_summary};
use patrol_core::{PatrolError, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "drone_patrol")]
#[command(about = "Decentralized drone area-coverage simulation")]
struct Args {
    /// Path to a TOML config file (defaults to patrol.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate (overrides the config)
    #[arg(long)]
    ticks: Option<u64>,

    /// Interval between snapshots in ticks, 0 disables (overrides the config)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for events, snapshots and statistics
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Run without writing any files
    #[arg(long)]
    no_output: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<SimConfig, PatrolError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => SimConfig::load(DEFAULT_CONFIG_PATH)?,
        None => {
            tracing::info!("No config file given, using defaults");
            SimConfig::default()
        }
    };

    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(interval) = args.snapshot_interval {
        config.run.snapshot_interval = interval;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), PatrolError> {
    let config = load_config(args)?;
    tracing::info!(
        seed = config.run.seed,
        ticks = config.run.ticks,
        snapshot_interval = config.run.snapshot_interval,
        "Starting drone patrol"
    );

    let mut sim = Simulation::new(&config)?;

    let mut logger = if args.no_output {
        EventLogger::null()
    } else {
        fs::create_dir_all(&args.output_dir)?;
        EventLogger::new(args.output_dir.join("events.jsonl"))?
    };

    if !args.no_output {
        let initial = sim.snapshot("simulation_start");
        write_snapshot_to_dir(&initial, &args.output_dir)?;
        write_current_state(&initial, &args.output_dir)?;
        sim.mark_snapshot();
    }

    for _ in 0..config.run.ticks {
        sim.step_all();
        let tick = sim.tick();

        let events = sim.drain_events();
        logger.log_batch(&events)?;

        if sim.snapshot_due() && !args.no_output {
            let snapshot = sim.snapshot("periodic");
            write_snapshot_to_dir(&snapshot, &args.output_dir)?;
            write_current_state(&snapshot, &args.output_dir)?;
            sim.mark_snapshot();
        }

        if config.run.report_interval > 0 && tick % config.run.report_interval == 0 {
            let coverage = sim.coverage();
            let moves = events.iter().filter(|e| e.is_move()).count();
            tracing::info!(
                tick,
                moves,
                max_staleness = coverage.max_staleness,
                mean_staleness = coverage.mean_staleness,
                never_visited = coverage.never_visited,
                "Tick {} / {}",
                tick,
                config.run.ticks
            );
        }
    }

    logger.flush()?;

    let summary = sim.summary();
    if !args.no_output {
        // A periodic snapshot on the last tick already holds the final state
        if !sim.snapshot_written() {
            let final_snapshot = sim.snapshot("simulation_end");
            write_snapshot_to_dir(&final_snapshot, &args.output_dir)?;
            write_current_state(&final_snapshot, &args.output_dir)?;
            sim.mark_snapshot();
        }
        write_summary(&summary, args.output_dir.join("stats.json"))?;
    }

    tracing::info!(
        ticks = summary.total_ticks,
        drones = sim.drone_count(),
        events = logger.event_count(),
        worst_staleness = summary.final_metrics.worst_staleness,
        average_max_staleness = summary.average_max_staleness,
        "Simulation complete"
    );

    Ok(())
}
