//! Trakt fetcher CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use shared::{Config, DataPaths};
use std::path::PathBuf;
use tracing::info;
use trakt_fetcher::{TraktClient, TraktFetcher};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (file + environment overlay)
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Missing key is fatal before any network call
    config.require_trakt_key()?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "trakt-fetcher".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!("Trakt fetcher starting");
    info!(config_file = %args.config.display(), username = %config.trakt.username, "Loaded configuration");

    // Initialize data paths
    let data_paths = DataPaths::new(config.data_dir());
    data_paths
        .create_dirs()
        .context("Failed to create data directories")?;

    // Initialize API client and fetcher
    let client = TraktClient::new(&config.trakt).context("Failed to create Trakt client")?;
    let fetcher = TraktFetcher::new(client, data_paths, config.trakt.username.clone());

    // Run fetcher
    let stats = fetcher.run().await.context("Fetch failed")?;

    info!("=== Fetch Complete ===");
    info!("Endpoints fetched: {}", stats.endpoints_fetched);
    info!("Endpoints skipped: {}", stats.endpoints_skipped);
    info!("Lists fetched: {}", stats.lists_fetched);
    info!("Avatar downloaded: {}", stats.avatar_downloaded);

    Ok(())
}
