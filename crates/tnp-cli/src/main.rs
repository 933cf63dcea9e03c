//! Tag-and-probe skim CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tnp_select::{Policy, SelectionConfig, Skimmer};

#[derive(Parser)]
#[command(name = "tnp")]
#[command(about = "Electron tag-and-probe skimming")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Random pair from the mass-windowed cross product
    RandomPair,
    /// pT-ordered tag, pole-mass-nearest probe
    PoleNearest,
}

impl From<PolicyArg> for Policy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::RandomPair => Policy::RandomPair,
            PolicyArg::PoleNearest => Policy::PoleNearest,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce events to per-pair records
    Skim {
        /// Input events (JSON array of column maps)
        #[arg(short, long)]
        events: PathBuf,

        /// Selection configuration (JSON). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Candidate-resolution policy
        #[arg(long, value_enum, default_value = "random-pair")]
        policy: PolicyArg,

        /// Output Parquet file. Without it, records print as JSON to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Threads (0 = auto)
        #[arg(long, default_value = "0")]
        threads: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_string())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Skim { events, config, policy, output, seed, threads } => {
            run_skim(events, config, policy.into(), output, seed, threads)
        }
    }
}

fn run_skim(
    events_path: PathBuf,
    config_path: Option<PathBuf>,
    policy: Policy,
    output: Option<PathBuf>,
    seed: Option<u64>,
    threads: usize,
) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the rayon thread pool")?;
    }

    let mut config = match &config_path {
        Some(path) => SelectionConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SelectionConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }

    let events = tnp_event::read_events(&events_path)
        .with_context(|| format!("failed to read events {}", events_path.display()))?;
    tracing::info!(n_events = events.len(), ?policy, "skimming");

    let skimmer = Skimmer::new(config, policy)?;
    let records = skimmer.skim_events(&events)?;

    match &output {
        Some(path) => {
            tnp_select::write_parquet(&records, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), &records)?;
            println!();
        }
    }

    eprintln!("{} events in, {} pair records out", events.len(), records.len());
    Ok(())
}
