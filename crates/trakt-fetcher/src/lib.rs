//! Trakt data fetcher library.
//!
//! This library fetches a single user's public viewing data from the Trakt
//! API and persists each endpoint response as a metadata-wrapped JSON
//! document.

pub mod api;
pub mod fetcher;

pub use api::{TraktClient, WatchedMovie, WatchedSeason, WatchedShow};
pub use fetcher::{FetchStats, TraktFetcher};
