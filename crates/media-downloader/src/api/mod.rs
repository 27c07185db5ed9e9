//! TMDB API module.
//!
//! Provides the HTTP client and response types for the TMDB v3 API.

pub mod client;
pub mod types;

pub use client::TmdbClient;
pub use types::{ImageList, ImageRecord, SeasonImages, SeasonRecord, TvDetails};
