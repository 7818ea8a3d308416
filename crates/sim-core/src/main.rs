//! Storm Foraging Simulation
//!
//! Headless runner: loads the configuration, runs the tick budget, writes
//! events, snapshots and the final report to the output directory.

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sim_core::config::{Config, DEFAULT_CONFIG_PATH};
use sim_core::driver::{Driver, SnapshotPresenter};
use sim_core::error::SimError;
use sim_core::events::EventLogger;
use sim_core::output::{write_current_state, SimulationReport, REPORT_FILE};
use sim_core::setup::get_spawn_summary;
use sim_core::simulation::Simulation;
use sim_events::StrategyKind;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "storm_sim")]
#[command(about = "Multi-agent foraging on a grid, interrupted by storms")]
struct Args {
    /// TOML configuration file (defaults to storm_sim.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Interval between world snapshots (in ticks, 0 disables)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for events, snapshots and the report
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Agent strategies, one agent each (e.g. simple,bdi,bdi)
    #[arg(long, value_delimiter = ',')]
    agents: Option<Vec<StrategyKind>>,

    /// Ticks per second (0 runs as fast as possible)
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.max_ticks = ticks;
    }
    if let Some(interval) = args.snapshot_interval {
        config.simulation.snapshot_interval = interval;
    }
    if let Some(strategies) = &args.agents {
        config.set_strategies(strategies);
    }
    if let Some(frame_rate) = args.frame_rate {
        config.simulation.frame_rate = frame_rate;
    }
    config.validate()?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing::info!(
        "Storm simulation: seed {}, {} ticks, {}x{} grid (config: {})",
        config.simulation.seed,
        config.simulation.max_ticks,
        config.grid.width,
        config.grid.height,
        args.config
            .as_deref()
            .map_or(DEFAULT_CONFIG_PATH.into(), |p| p.display().to_string())
    );

    fs::create_dir_all(&args.output_dir)?;

    let mut sim = Simulation::from_config(&config)?;
    tracing::info!(
        "Spawned {} with {} resources",
        get_spawn_summary(sim.agents()),
        sim.registry().uncollected_count()
    );

    let logger = EventLogger::new(args.output_dir.join("events.jsonl"))?;
    let presenter = SnapshotPresenter::new(&args.output_dir, config.simulation.snapshot_interval);
    let mut driver = Driver::new(presenter, logger, config.simulation.max_ticks)
        .with_frame_rate(config.simulation.frame_rate);

    let ticks_run = driver.run(&mut sim)?;
    tracing::info!(
        "Run finished after {} ticks, {} events, {} snapshots",
        ticks_run,
        driver.logger().event_count(),
        driver.presenter().written().len()
    );
    for (category, count) in driver.logger().tally() {
        tracing::debug!("  {:?}: {}", category, count);
    }

    write_current_state(&sim.snapshot("final", "end_of_run"), &args.output_dir)?;

    let report = SimulationReport::from_simulation(&sim, ticks_run);
    report.write_json(args.output_dir.join(REPORT_FILE))?;
    println!("{}", report);

    Ok(())
}
