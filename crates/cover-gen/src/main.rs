//! Cover generator CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use shared::Config;
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
    config.require_trakt_key()?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "cover-gen".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!("Cover generator starting");
    info!(config_file = %args.config.display(), username = %config.trakt.username, "Loaded configuration");

    let stats = cover_gen::runner::generate(&config)
        .await
        .context("Cover generation failed")?;

    info!("=== Cover Generation Complete ===");
    info!("Movies selected: {}", stats.movies_selected);
    info!("Shows selected: {}", stats.shows_selected);
    info!("Posters composited: {}", stats.posters_composited);

    Ok(())
}
