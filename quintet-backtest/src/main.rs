//! # Run a single simulation with the reference parameters
//! quintet-backtest run
//!
//! # Run from a config file with a fixed seed, JSON output
//! quintet-backtest run --config config/default.toml --seed 42 --json
//!
//! # Distribution of P&L over 200 seeds
//! quintet-backtest sweep --config config/default.toml --runs 200 --base-seed 1

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use quintet_backtest::{BacktestEngine, MetricsCalculator, SeedSweep, SimulationConfig};

#[derive(Parser)]
#[command(name = "quintet-backtest")]
#[command(about = "Tick-driven GBM backtest of five options strategies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation
    Run {
        /// Path to configuration file (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the shock source (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of ticks (overrides the config)
        #[arg(short, long)]
        ticks: Option<usize>,

        /// Print per-strategy trade statistics
        #[arg(long)]
        stats: bool,

        /// Emit the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the same configuration over many seeds
    Sweep {
        /// Path to configuration file (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of seeded runs
        #[arg(short, long, default_value_t = 100)]
        runs: usize,

        /// First seed; runs use consecutive seeds from here
        #[arg(short, long, default_value_t = 1)]
        base_seed: u64,

        /// Number of ticks (overrides the config)
        #[arg(short, long)]
        ticks: Option<usize>,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<PathBuf>, ticks: Option<usize>) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => SimulationConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(ticks) = ticks {
        config.total_ticks = ticks;
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quintet_backtest=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            ticks,
            stats,
            json,
        } => {
            let mut config = load_config(config, ticks)?;
            if seed.is_some() {
                config.seed = seed;
            }

            let result = BacktestEngine::from_config(config)
                .context("Invalid simulation configuration")?
                .run()
                .context("Simulation aborted")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!("{}", result.summary());
            if stats {
                println!();
                for metrics in MetricsCalculator::per_strategy(&result) {
                    println!("{}", metrics.summary());
                }
                println!("{}", MetricsCalculator::overall(&result).summary());
            }
            if !result.open_trades.is_empty() {
                println!(
                    "\n{} position(s) open at horizon, unrealized intrinsic value {:.4}",
                    result.open_trades.len(),
                    result.unrealized_pnl()
                );
            }
        }
        Commands::Sweep {
            config,
            runs,
            base_seed,
            ticks,
            json,
        } => {
            let config = load_config(config, ticks)?;
            let sweep = SeedSweep::consecutive(config, base_seed, runs);

            let pb = ProgressBar::new(runs as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({eta})")?
                    .progress_chars("#>-"),
            );
            let summary = sweep
                .run_with_progress(|_| pb.inc(1))
                .context("Seed sweep failed")?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", summary.summary());
            }
        }
    }

    Ok(())
}
