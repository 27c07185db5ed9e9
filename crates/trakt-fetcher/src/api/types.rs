//! Trakt API v2 response types.
//!
//! The fetcher persists raw payloads untouched; these types exist for the
//! places that need structured access (the cover generator's watched
//! lists). Every field is defaulted so one malformed entry never fails a
//! whole batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External id bundle attached to movies, shows and lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ids {
    #[serde(default)]
    pub trakt: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub tmdb: Option<u64>,
    #[serde(default)]
    pub imdb: Option<String>,
    #[serde(default)]
    pub tvdb: Option<u64>,
}

/// Movie or show summary as embedded in watched/history entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub ids: Ids,
}

/// Entry from `/users/{username}/watched/movies`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchedMovie {
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub movie: Option<MediaSummary>,
}

/// Entry from `/users/{username}/watched/shows`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchedShow {
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub show: Option<MediaSummary>,
    #[serde(default)]
    pub seasons: Vec<WatchedSeason>,
}

/// Season descriptor embedded in a watched show entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchedSeason {
    #[serde(default)]
    pub number: Option<i64>,
}
