//! invader: command-line runner for the alien invasion simulation.
//!
//! Usage:
//!   invader start --aliens 10 --file map.txt
//!   invader generate --depth 8 --seed 12345 > map.txt
//!   invader --debug start --seed 7 < map.txt

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use invasion_core::{
    cancel::CancelToken,
    config::SimConfig,
    engine::SimEngine,
    event::{RunOutcome, SimEvent},
    map_format, map_gen,
    rng::{RngBank, RngSlot},
};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Simulate an alien invasion over a map of cities
#[derive(Parser, Debug)]
#[command(name = "invader")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the invasion on a map read from a file or stdin
    Start {
        /// Number of aliens to land on the map
        #[arg(short, long)]
        aliens: Option<usize>,

        /// Maximum number of iterations before the aliens are exhausted
        #[arg(short, long)]
        max_steps: Option<u64>,

        /// Read the map from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop the run after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// JSON config file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format for the final report
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Generate a random map and print it to stdout
    Generate {
        /// Size of the grid the map is laid out on
        #[arg(short, long)]
        depth: Option<usize>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Narration followed by the final map.
    Text,
    /// Final snapshot and event log as JSON.
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match args.command {
        Commands::Start { aliens, max_steps, file, seed, timeout_secs, config, format } => {
            let mut cfg = match config {
                Some(path) => SimConfig::load(&path)?,
                None => SimConfig::default(),
            };
            cfg.aliens = aliens.unwrap_or(cfg.aliens);
            cfg.max_steps = max_steps.unwrap_or(cfg.max_steps);
            cfg.seed = seed.or(cfg.seed);
            cfg.timeout_secs = timeout_secs.or(cfg.timeout_secs);
            start(&cfg, file, format)
        }
        Commands::Generate { depth, seed } => {
            let cfg = SimConfig {
                depth: depth.unwrap_or(SimConfig::default().depth),
                seed,
                ..SimConfig::default()
            };
            generate(&cfg)
        }
    }
}

fn start(cfg: &SimConfig, file: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let seed = cfg.seed.unwrap_or_else(rand::random);
    log::info!("using seed {seed}");
    let mut engine = SimEngine::new(seed);

    let loaded = match &file {
        Some(path) => {
            let reader = File::open(path)
                .with_context(|| format!("unable to open file `{}`", path.display()))?;
            log::info!("reading `{}` file map", path.display());
            engine.load(BufReader::new(reader))
        }
        None => engine.load(io::stdin().lock()),
    };
    loaded.context("unable to parse the given map")?;

    engine
        .generate_agents(cfg.aliens)
        .with_context(|| format!("unable to generate {} aliens", cfg.aliens))?;

    let cancel = match cfg.timeout_secs {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if format == OutputFormat::Text {
        writeln!(out, "* Starting the simulation with {} aliens", cfg.aliens)?;
    }

    let outcome = engine.run(cfg.max_steps, &cancel);
    log::info!("simulation completed: {outcome:?}");

    match format {
        OutputFormat::Text => print_report(&mut out, &engine, outcome, cfg.max_steps)?,
        OutputFormat::Json => {
            let report = serde_json::json!({
                "outcome":  outcome,
                "snapshot": engine.snapshot(),
                "events":   engine.events(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
    }
    Ok(())
}

fn print_report<W: Write>(
    out: &mut W,
    engine: &SimEngine,
    outcome: RunOutcome,
    max_steps: u64,
) -> Result<()> {
    for event in engine.events() {
        match event {
            SimEvent::AlienTrapped { alien, .. } => {
                writeln!(out, "{alien} has been trapped!")?;
            }
            SimEvent::CityDestroyed { city, attacker, defender, .. } => {
                writeln!(out, "{city} has been destroyed by alien {attacker} and alien {defender}!")?;
            }
            _ => {}
        }
    }

    match outcome {
        RunOutcome::AllAgentsResolved => writeln!(out, "All aliens have been killed/trapped!")?,
        RunOutcome::StepLimitReached => writeln!(
            out,
            "All aliens are exhausted after performing {max_steps} steps!"
        )?,
        RunOutcome::Cancelled => writeln!(
            out,
            "Simulation cancelled after {} iterations, {} aliens still roaming",
            engine.iteration(),
            engine.active_count()
        )?,
    }

    writeln!(out, "* final map:")?;
    engine.dump(out)?;
    Ok(())
}

fn generate(cfg: &SimConfig) -> Result<()> {
    if cfg.depth == 0 {
        bail!("depth cannot be zero");
    }
    let seed = cfg.seed.unwrap_or_else(rand::random);
    log::info!("generating new map of size {} with seed {seed}", cfg.depth);

    let mut rng = RngBank::new(seed).for_slot(RngSlot::MapGen);
    let map = map_gen::generate_random(cfg.depth, &mut rng)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    map_format::print(&mut out, &map)?;
    Ok(())
}
