//! Data management CLI.
//!
//! Unified interface over the pipeline stages: fetch Trakt data, download
//! artwork, generate the cover, or run fetch+download as one update, plus
//! small maintenance actions (status, environment check, log cleanup).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use media_downloader::{MediaDownloader, TmdbClient};
use serde_json::Value;
use shared::{Config, DataPaths};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
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

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Fetch Trakt data only
    Fetch,
    /// Download media files only
    Download,
    /// Generate the cover image
    Cover,
    /// Full update: fetch data, then download media
    Full,
    /// Show status of data and media files
    Status,
    /// Check that required environment variables are set
    Check,
    /// Delete old log files
    Cleanup {
        /// Days to keep log files
        #[arg(long, default_value_t = 30)]
        days: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "data-manager".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!(action = ?args.action, "Data manager starting");

    match args.action {
        Action::Fetch => {
            config.require_trakt_key()?;
            run_fetch(&config).await?;
        }
        Action::Download => {
            config.require_tmdb_key()?;
            run_download(&config).await?;
        }
        Action::Cover => {
            config.require_trakt_key()?;
            let stats = cover_gen::runner::generate(&config).await?;
            info!(
                movies = stats.movies_selected,
                shows = stats.shows_selected,
                posters = stats.posters_composited,
                "Cover generated"
            );
        }
        Action::Full => {
            config.require_trakt_key()?;
            config.require_tmdb_key()?;

            let start = SystemTime::now();
            run_fetch(&config).await.context("Full update failed at data fetch step")?;
            run_download(&config)
                .await
                .context("Full update failed at media download step")?;

            let duration = start.elapsed().unwrap_or_default();
            info!(seconds = duration.as_secs(), "Full update completed");
        }
        Action::Status => show_status(&config)?,
        Action::Check => check_environment(&config)?,
        Action::Cleanup { days } => cleanup_old_logs(&config.log_dir(), days)?,
    }

    info!("Action completed successfully");
    Ok(())
}

/// Run the Trakt data fetch stage
async fn run_fetch(config: &Config) -> Result<()> {
    let paths = DataPaths::new(config.data_dir());
    paths
        .create_dirs()
        .context("Failed to create data directories")?;

    let client = TraktClient::new(&config.trakt).context("Failed to create Trakt client")?;
    let fetcher = TraktFetcher::new(client, paths, config.trakt.username.clone());

    let stats = fetcher.run().await.context("Fetch failed")?;
    info!(
        fetched = stats.endpoints_fetched,
        skipped = stats.endpoints_skipped,
        "Trakt data fetch completed"
    );
    Ok(())
}

/// Run the media download stage
async fn run_download(config: &Config) -> Result<()> {
    let paths = DataPaths::new(config.data_dir());
    paths
        .create_dirs()
        .context("Failed to create data directories")?;

    let tmdb = TmdbClient::new(&config.tmdb).context("Failed to create TMDB client")?;
    let mut downloader = MediaDownloader::new(tmdb, paths);

    let stats = downloader.run().await.context("Media download failed")?;
    info!(
        downloaded = stats.images_downloaded,
        skipped = stats.images_skipped,
        errors = stats.errors,
        "Media download completed"
    );
    Ok(())
}

/// Report what is on disk: document counts, image counts, last-updated stamps
fn show_status(config: &Config) -> Result<()> {
    let paths = DataPaths::new(config.data_dir());

    let json_dir = paths.json_dir();
    if !json_dir.exists() {
        warn!("JSON data directory doesn't exist");
    } else {
        let json_files = count_files(&json_dir, &["json"])?;
        info!(json_files = json_files, "JSON documents on disk");

        if let Some(last_updated) = document_last_updated(&paths.index_json()) {
            info!(last_updated = %last_updated, "Data last updated");
        }
    }

    let imgs_dir = paths.imgs_dir();
    if !imgs_dir.exists() {
        warn!("Images directory doesn't exist");
    } else {
        let image_files = count_files(&imgs_dir, &["jpg", "png"])?;
        info!(image_files = image_files, "Image files on disk");

        if let Some(last_updated) = media_index_last_updated(&paths.media_index()) {
            info!(last_updated = %last_updated, "Media last updated");
        }
    }

    Ok(())
}

/// Verify the required API keys are present
fn check_environment(config: &Config) -> Result<()> {
    let mut missing = Vec::new();
    if config.trakt.api_key.is_empty() {
        missing.push("TRAKT_API_KEY");
    }
    if config.tmdb.api_key.is_empty() {
        missing.push("TMDB_API_KEY");
    }

    if !missing.is_empty() {
        bail!("Missing required environment variables: {}", missing.join(", "));
    }

    info!("All required environment variables are set");
    Ok(())
}

/// Delete `*.log` files in the log directory older than `days`
fn cleanup_old_logs(log_dir: &Path, days: u64) -> Result<()> {
    info!(days = days, dir = %log_dir.display(), "Cleaning up old log files");

    if !log_dir.exists() {
        return Ok(());
    }

    let cutoff = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);

    for entry in std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read directory {}", log_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !entry.file_type()?.is_file() || !name.contains(".log") {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if modified < cutoff {
            std::fs::remove_file(entry.path())
                .with_context(|| format!("Failed to delete {}", name))?;
            info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

/// Count files under a directory (recursive) with one of the extensions
fn count_files(dir: &Path, extensions: &[&str]) -> Result<usize> {
    let mut count = 0;

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            count += count_files(&path, extensions)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| extensions.contains(&ext))
        {
            count += 1;
        }
    }

    Ok(count)
}

/// Read `data.last_updated` from a wrapped index document
fn document_last_updated(path: &Path) -> Option<String> {
    let value: Value = serde_json::from_str(&std::fs::read_to_string(path).ok()?).ok()?;
    value
        .get("data")?
        .get("last_updated")?
        .as_str()
        .map(str::to_string)
}

/// Read `last_updated` from the media index
fn media_index_last_updated(path: &Path) -> Option<String> {
    let value: Value = serde_json::from_str(&std::fs::read_to_string(path).ok()?).ok()?;
    value.get("last_updated")?.as_str().map(str::to_string)
}
