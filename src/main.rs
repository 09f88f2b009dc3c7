//! Product Harvester CLI
//!
//! Loads the configuration, initializes logging, runs every configured source
//! once and writes `<source><suffix>` JSON files to the output directory.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use product_harvester_lib::application::{Orchestrator, build_sources};
use product_harvester_lib::infrastructure::logging::log_system_info;
use product_harvester_lib::infrastructure::{
    ConfigManager, HttpClient, JsonFileSink, PageFetcher, RecordSink, init_logging_with_config,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract, validate and store product records from e-commerce sources", long_about = None)]
struct Cli {
    /// Configuration file (default: the per-user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for output files, overriding the configured one
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only run the named sources (repeatable)
    #[arg(long = "only", value_name = "SOURCE")]
    only: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;

    init_logging_with_config(config.logging.clone()).context("Failed to initialize logging")?;
    log_system_info();
    info!("Using configuration at {:?}", manager.config_path());

    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }
    if !cli.only.is_empty() {
        config.sources.retain(|source| cli.only.contains(&source.name));
        for requested in &cli.only {
            if !config.sources.iter().any(|source| &source.name == requested) {
                warn!("No configured source named '{}'", requested);
            }
        }
    }
    if config.sources.is_empty() {
        return Err(anyhow!("No sources to run"));
    }

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpClient::with_config(config.http.clone())?);
    let sources = build_sources(&config, &fetcher)?;
    let sink: Arc<dyn RecordSink> = Arc::new(JsonFileSink::new(
        config.output.directory.clone(),
        config.output.file_suffix.clone(),
    ));

    let summary = Orchestrator::new(sources, sink).run().await;
    info!(
        "📊 {} of {} source(s) produced a valid record",
        summary.accepted.len(),
        summary.total()
    );
    for (name, reason) in &summary.failed {
        warn!("Source '{}' failed: {}", name, reason);
    }
    Ok(())
}
