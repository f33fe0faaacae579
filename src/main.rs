//! The Prowler - Weighted-Pool Arbitrage Scanner
//!
//! Run with: cargo run
//!
//! Repeatedly snapshots the weighted-pool landscape, builds the exchange
//! graph, hunts negative cycles, and prices every loop it finds. Detection
//! only: no trade is ever submitted.

use clap::Parser;
use color_eyre::eyre::Result;
use console::style;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod brain;
mod cartographer;
mod config;
mod engine;
mod error;
mod reporter;
mod tokens;

use cartographer::PoolProvider;
use config::Config;
use reporter::{symbol_table, Reporter};

#[derive(Parser, Debug)]
#[command(name = "prowler", about = "Weighted-pool arbitrage scanner")]
struct Cli {
    /// Run a single scan and exit
    #[arg(long)]
    once: bool,

    /// Load configuration from a TOML file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the scan interval in seconds
    #[arg(long)]
    interval: Option<u64>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🐺 THE PROWLER - Weighted-Pool Arbitrage Scanner").cyan().bold()
    );
    println!(
        "{}",
        style("    Snapshot | Graph | Negative Cycles | Profit").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

/// One full scan: fetch, pipeline, report.
async fn run_scan(provider: &PoolProvider, reporter: &Reporter) -> Result<(), error::ScanError> {
    println!();
    println!("{}", style("═══ PHASE 1: THE CARTOGRAPHER ═══").blue().bold());

    let start = Instant::now();
    let pools = provider.fetch_all_pools().await?;
    println!(
        "{} Fetched {} pools in {:?}",
        style("✓").green(),
        pools.len(),
        start.elapsed()
    );

    println!();
    println!("{}", style("═══ PHASE 2: THE BRAIN ═══").magenta().bold());

    let start = Instant::now();
    let outcome = engine::scan(&pools);
    println!(
        "{} Scanned {} nodes / {} edges in {:?}: {} cycles, {} priced, {} unresolved",
        style("✓").green(),
        outcome.node_count,
        outcome.edge_count,
        start.elapsed(),
        outcome.cycle_count,
        outcome.opportunities.len(),
        outcome.unresolved_count,
    );

    println!();
    println!("{}", style("═══ PHASE 3: THE LEDGER ═══").green().bold());

    let symbols = symbol_table(&pools);
    match reporter.report(&outcome.opportunities, &symbols) {
        Ok(highlighted) if highlighted > 0 => {
            println!(
                "{} {} loops worth a closer look",
                style("✓").green(),
                highlighted
            );
        }
        Ok(_) => {}
        Err(e) => warn!("Opportunity log write failed: {}", e),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prowler=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    print_banner();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(interval) = cli.interval {
        config.scan_interval_secs = interval;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }
    config.print_summary();

    let provider = PoolProvider::new(&config.subgraph_url, config.page_size, config.max_pools);
    let log_path = config
        .opportunity_log
        .then(|| config.opportunity_log_path.clone());
    let reporter = Reporter::new(config.min_profit_ratio, log_path);

    let mut ticker = tokio::time::interval(Duration::from_secs(config.scan_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down between scans");
                break;
            }
        }

        match run_scan(&provider, &reporter).await {
            Ok(()) => {
                consecutive_failures = 0;
            }
            Err(e) => {
                // Provider trouble fails this scan only; next tick retries
                consecutive_failures += 1;
                warn!(
                    "Scan failed ({} consecutive): {}",
                    consecutive_failures, e
                );
                if consecutive_failures >= config.max_consecutive_failures {
                    error!(
                        "{} consecutive failures, pausing {}s",
                        consecutive_failures, config.failure_pause_secs
                    );
                    tokio::time::sleep(Duration::from_secs(config.failure_pause_secs)).await;
                    consecutive_failures = 0;
                }
            }
        }

        if cli.once {
            break;
        }
    }

    Ok(())
}
