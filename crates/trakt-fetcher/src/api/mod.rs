//! Trakt API module.
//!
//! Provides the HTTP client and response types for the Trakt v2 API.

pub mod client;
pub mod types;

pub use client::TraktClient;
pub use types::{Ids, MediaSummary, WatchedMovie, WatchedSeason, WatchedShow};
