//! biota - headless driver for the biota engine
//!
//! `biota run` seeds the relocating ancestor (or resumes a snapshot), runs
//! the engine in batches and logs population figures after each batch.
//! `biota inspect` prints the statistics and a memory disassembly of a saved
//! snapshot.

mod ancestor;
mod report;

use anyhow::{bail, Context, Result};
use biota_runtime::{Engine, EngineConfig, EngineSnapshot};
use biota_spec::encoding::{FIELD_MAX, FIELD_MIN};
use biota_spec::{check_address, disassemble, MEMORY_SIZE};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "biota")]
#[command(about = "Run and inspect a population of self-replicating programs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the ancestor (or resume a snapshot) and run the engine
    Run(RunArgs),
    /// Print statistics and a disassembly from a snapshot
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Total cycles to run
    #[arg(long, default_value = "10000")]
    cycles: u64,

    /// Cycles between reports
    #[arg(long, default_value = "1000")]
    batch: u64,

    /// Seed for the random streams (drawn from entropy if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Per-write bit-flip probability
    #[arg(long)]
    mutation_rate: Option<f64>,

    /// Age limit in turns (0 = unlimited)
    #[arg(long)]
    max_age: Option<u64>,

    /// Address the ancestor is loaded at
    #[arg(long, default_value = "2048")]
    start: usize,

    /// Number of copy instructions in the ancestor
    #[arg(long, default_value = "10")]
    length: usize,

    /// Distance the ancestor copies itself forward
    #[arg(long, default_value = "128", allow_negative_numbers = true)]
    offset: i32,

    /// Continue from a saved snapshot instead of seeding
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write a snapshot here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Snapshot file
    file: PathBuf,

    /// First address of the disassembly window
    #[arg(long, default_value = "0")]
    from: usize,

    /// Number of words to disassemble
    #[arg(long, default_value = "32")]
    count: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biota=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Inspect(args) => inspect(args),
    }
}

fn load_snapshot(path: &Path) -> Result<Engine> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = EngineSnapshot::from_bytes(&bytes)
        .with_context(|| format!("decoding snapshot {}", path.display()))?;
    Ok(Engine::from_snapshot(snapshot)?)
}

fn build_engine(args: &RunArgs) -> Result<Engine> {
    if let Some(path) = &args.resume {
        let mut engine = load_snapshot(path)?;
        if let Some(rate) = args.mutation_rate {
            engine.set_mutation_rate(rate);
        }
        if let Some(max_age) = args.max_age {
            engine.set_max_age(max_age);
        }
        info!(
            path = %path.display(),
            cycle = engine.cycles(),
            population = engine.alive_count(),
            "resumed snapshot"
        );
        return Ok(engine);
    }

    if args.offset.unsigned_abs() as usize <= args.length {
        bail!(
            "offset {} would overlap the {}-instruction copy block",
            args.offset,
            args.length
        );
    }
    let spawn_offset = i64::from(args.offset) - args.length as i64;
    if !(i64::from(FIELD_MIN)..=i64::from(FIELD_MAX)).contains(&spawn_offset)
        || !(FIELD_MIN..=FIELD_MAX).contains(&args.offset)
    {
        bail!(
            "offset {} does not fit a 12-bit operand for length {}",
            args.offset,
            args.length
        );
    }
    check_address(args.start)?;
    if args.length + 2 > MEMORY_SIZE {
        bail!("ancestor of length {} does not fit in memory", args.length);
    }

    let mut config = EngineConfig::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(rate) = args.mutation_rate {
        config = config.with_mutation_rate(rate);
    }
    if let Some(max_age) = args.max_age {
        config = config.with_max_age(max_age);
    }

    let mut engine = Engine::new(config);
    let program = ancestor::relocating_replicator(args.length, args.offset);
    if engine.seed(args.start, &program).is_none() {
        bail!("population cap leaves no room for the ancestor");
    }
    info!(
        start = args.start,
        length = args.length,
        offset = args.offset,
        "seeded ancestor"
    );
    Ok(engine)
}

fn run(args: RunArgs) -> Result<()> {
    let mut engine = build_engine(&args)?;
    let batch = args.batch.max(1);

    let mut remaining = args.cycles;
    while remaining > 0 {
        let executed = engine.run(batch.min(remaining));
        remaining -= executed.min(remaining);
        report::log_batch(&engine);

        if engine.is_extinct() {
            warn!(cycle = engine.cycles(), "population extinct");
            break;
        }
    }

    if let Some(path) = &args.save {
        let bytes = engine.export().to_bytes()?;
        fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), cycle = engine.cycles(), "snapshot saved");
    }

    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let from = check_address(args.from)?;
    let engine = load_snapshot(&args.file)?;

    println!("{}", report::Summary(&engine.stats()));
    if let Some((low, high)) = report::population_range(engine.history()) {
        println!(
            "history:      {} samples, population {}..={}",
            engine.history().len(),
            low,
            high
        );
    }
    println!();

    let count = args.count.min(MEMORY_SIZE);
    let words = engine.memory().window(from, count);
    print!("{}", disassemble(&words, from));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["biota", "run"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.start, 2048);
        assert_eq!(args.length, 10);
        assert_eq!(args.offset, 128);
        assert!(args.seed.is_none());
        assert!(args.resume.is_none());
    }

    #[test]
    fn test_build_engine_seeds_ancestor() {
        let cli = Cli::parse_from(["biota", "run", "--seed", "3", "--mutation-rate", "0"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let engine = build_engine(&args).unwrap();
        assert_eq!(engine.alive_count(), 1);
        assert_eq!(engine.processes()[0].ip, 2048);
        assert_eq!(engine.mutation_rate(), 0.0);
    }

    #[test]
    fn test_overlapping_offset_rejected() {
        let cli = Cli::parse_from(["biota", "run", "--offset", "5"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(build_engine(&args).is_err());

        let cli = Cli::parse_from(["biota", "run", "--offset", "3000"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(build_engine(&args).is_err());
    }
}
