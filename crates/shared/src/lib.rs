//! Shared library for the Trakt data sync pipeline.
//!
//! This crate provides common functionality used across all binary crates:
//! - Configuration management
//! - Data models (document wrapper, fetch metadata)
//! - File path utilities
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::{Document, FetchMetadata};
pub use paths::DataPaths;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
