//! Sumi-Selector main entry point
//!
//! This is the command-line interface for the same-domain link selector.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_selector::config::{load_config_with_hash, Config};
use sumi_selector::crawler::run_workers;
use sumi_selector::storage::SqliteStorage;
use sumi_selector::ExclusionPolicy;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Selector: same-domain link selection for crawl workers
///
/// Workers read documents the fetcher has stored, queue every same-domain
/// link that passes the exclusion rules, and keep polling the frontier
/// until interrupted.
#[derive(Parser, Debug)]
#[command(name = "sumi-selector")]
#[command(version = "1.0.0")]
#[command(about = "Same-domain link selector for crawl workers", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Seed URL to queue before starting (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Override the number of workers from the config
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Validate config and show the effective settings without running
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show frontier statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(workers) = cli.workers {
        anyhow::ensure!(
            (1..=64).contains(&workers),
            "--workers must be between 1 and 64, got {}",
            workers
        );
        config.worker.workers = workers;
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli.seeds);
        return Ok(());
    }

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))
        .with_context(|| format!("failed to open {}", config.storage.database_path))?;

    if cli.stats {
        return handle_stats(&config, &storage);
    }

    handle_run(config, storage, &cli.seeds).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_selector=info,warn"),
            1 => EnvFilter::new("sumi_selector=debug,info"),
            2 => EnvFilter::new("sumi_selector=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what the workers would run with
fn handle_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Sumi-Selector Dry Run ===\n");

    println!("Worker Configuration:");
    if config.worker.max_depth < 0 {
        println!("  Max depth: unbounded");
    } else {
        println!("  Max depth: {}", config.worker.max_depth);
    }
    println!("  Workers: {}", config.worker.workers);
    println!("  Backoff unit: {}ms", config.worker.backoff_unit_ms);
    println!("  Max backoff: {} units", config.worker.max_backoff);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    let policy = ExclusionPolicy::from_config(config);
    println!("\nExclusion Rules ({}, first match wins):", policy.len());
    for (suffix, fragments) in policy.rules() {
        if fragments.is_empty() {
            println!("  - {} (nothing blocked)", suffix);
        } else {
            println!("  - {}: {}", suffix, fragments.join(", "));
        }
    }

    if !seeds.is_empty() {
        println!("\nSeeds ({}):", seeds.len());
        for seed in seeds {
            println!("  * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows frontier counts
fn handle_stats(config: &Config, storage: &SqliteStorage) -> anyhow::Result<()> {
    let stats = storage.frontier_stats()?;

    println!("Database: {}\n", config.storage.database_path);
    println!("Frontier:");
    println!("  Queued:    {}", stats.queued);
    println!("  Claimed:   {}", stats.claimed);
    println!("  Processed: {}", stats.processed);
    println!("  Total:     {}", stats.total_urls());
    println!("\nStored documents: {}", stats.documents);

    Ok(())
}

/// Handles the main worker run
async fn handle_run(config: Config, storage: SqliteStorage, seeds: &[String]) -> anyhow::Result<()> {
    let released = storage.release_claimed()?;
    if released > 0 {
        tracing::info!("Returned {} URLs claimed by an interrupted run to the queue", released);
    }

    for seed in seeds {
        if storage.add_seed(seed)? {
            tracing::info!("Queued seed {}", seed);
        } else {
            tracing::info!("Seed already known: {}", seed);
        }
    }

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
                ctrl_c_token.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let summary = run_workers(&config, Arc::new(storage), shutdown).await?;

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} workers stopped with an error",
            summary.failed,
            summary.workers
        );
    }

    tracing::info!("Selector finished");
    Ok(())
}
