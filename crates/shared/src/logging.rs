//! Logging infrastructure for the sync pipeline.
//!
//! This module provides structured logging with file rotation, contextual
//! fields, and module-specific log levels.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "public/logs".to_string(),
            component: "trakt-sync".to_string(),
            default_level: Level::INFO,
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Daily file rotation
/// - Structured logging with contextual fields
/// - Module-specific log levels, overridable via RUST_LOG
/// - Optional JSON formatting
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

    // Build environment filter
    // Default to configured level, but allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={},shared={},trakt_fetcher={},media_downloader={},cover_gen={},hyper=warn,reqwest=warn,h2=warn",
            config.component,
            config.default_level,
            config.default_level,
            config.default_level,
            config.default_level,
            config.default_level
        ))
    });

    let mut layers = Vec::new();

    // Console layer (human-readable)
    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stdout)
            .boxed();
        layers.push(console_layer);
    }

    // File layer with rotation
    if config.file {
        // Files land as <component>.log.YYYY-MM-DD so cleanup can match them
        let file_appender =
            tracing_appender::rolling::daily(log_dir, format!("{}.log", config.component));

        let file_layer = if config.json_format {
            // JSON format for structured logs
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            // Human-readable format
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    // Initialize the subscriber
    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}

/// Initialize logging for a specific component
pub fn init_for_component(component: &str, log_dir: &str) -> Result<()> {
    init(LogConfig {
        component: component.to_string(),
        log_dir: log_dir.to_string(),
        ..Default::default()
    })
}
