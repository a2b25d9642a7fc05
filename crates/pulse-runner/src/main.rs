//! # pulse-runner
//!
//! Runs the BTC pulse fetch pipeline headless, logging every update.
//!
//! Loads an optional JSON configuration file, starts the pipeline against the
//! live Kraken and Fear & Greed endpoints, and drives the aggregator on a
//! dedicated UI thread until Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! pulse-runner config.json --log-level info
//! pulse-runner --currency usd --range 31d
//! ```

mod log_presenter;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pulse_core::config::AppConfig;
use pulse_core::types::{Currency, TimeRange};
use pulse_feed::http_source::HttpSource;
use pulse_feed::pipeline::Pipeline;
use tokio::runtime::Handle;
use tracing::{error, info};

use crate::log_presenter::LogPresenter;

/// BTC price pulse runner.
#[derive(Parser)]
#[command(name = "pulse-runner", about = "BTC price pulse: fetch pipeline runner")]
struct Cli {
    /// Configuration file path (JSON). Defaults apply when omitted.
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,

    /// Display currency override (usd, eur).
    #[arg(long)]
    currency: Option<Currency>,

    /// History range override (12h, 31d, 90d, 365d, ytd, all).
    #[arg(long)]
    range: Option<TimeRange>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let mut config = match &cli.config {
        Some(path) => pulse_core::config::load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(currency) = cli.currency {
        config.selection.currency = currency;
    }
    if let Some(range) = cli.range {
        config.selection.time_range = range;
    }

    // 2. Initialize logging; the CLI directory wins over the config one
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    pulse_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name());
    info!(
        "pulse-runner starting, config={}, selection={:?}",
        cli.config.as_ref().map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string()),
        config.selection,
    );

    // 3. Build the pipeline and hand the aggregator to the UI thread
    let tick = config.schedule.tick();
    let source = Arc::new(HttpSource::new(config.endpoints.clone()));
    let (mut pipeline, aggregator) = Pipeline::build(Handle::current(), source, config, LogPresenter);

    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    let ui = std::thread::Builder::new()
        .name("ui".into())
        .spawn(move || aggregator.run(tick, shutdown_rx))
        .context("failed to spawn UI thread")?;

    pipeline.start();
    info!("pipeline '{}' started, press Ctrl+C to stop", pipeline.name());

    // 4. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    // 5. Stop fetching, then the UI loop
    pipeline.stop();
    let _ = shutdown_tx.send(());
    match ui.join() {
        Ok(aggregator) => info!("final snapshot: {:?}", aggregator.snapshot()),
        Err(_) => error!("UI thread panicked"),
    }

    info!("stopped, goodbye");
    Ok(())
}
