//! Media downloader CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use media_downloader::{MediaDownloader, TmdbClient};
use shared::{Config, DataPaths};
use std::path::PathBuf;
use tracing::info;

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
    config.require_tmdb_key()?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "media-downloader".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!("Media downloader starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    // Initialize data paths
    let data_paths = DataPaths::new(config.data_dir());
    data_paths
        .create_dirs()
        .context("Failed to create data directories")?;

    // Initialize API client and downloader
    let tmdb = TmdbClient::new(&config.tmdb).context("Failed to create TMDB client")?;
    let mut downloader = MediaDownloader::new(tmdb, data_paths);

    // Run downloader
    let stats = downloader.run().await.context("Media download failed")?;

    info!("=== Download Complete ===");
    info!("Source files processed: {}", stats.files_processed);
    info!("Items processed: {}", stats.items_processed);
    info!("Images downloaded: {}", stats.images_downloaded);
    info!("Images skipped (already present): {}", stats.images_skipped);
    info!("Errors: {}", stats.errors);

    Ok(())
}
