//! Poster selection for the cover image.
//!
//! Selection is a pure function of the watched lists: keep entries with a
//! numeric TMDB id and a last-watched timestamp, sort newest first, take
//! the top ten of each kind. Shows additionally get one season picked at
//! random from the seasons actually watched (or 1..=5 when no season data
//! is present); the rng is injected so tests can seed it.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use trakt_fetcher::{WatchedMovie, WatchedShow};

/// Maximum selected entries per kind
pub const MAX_PER_KIND: usize = 10;

/// Selected movie entry, as persisted in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverMovie {
    pub tmdb_id: u64,
    pub title: String,
    pub poster_url: String,
    pub last_watched_at: DateTime<Utc>,
}

/// Selected show entry, as persisted in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverShow {
    pub tmdb_id: u64,
    pub title: String,
    pub season: i64,
    pub available_seasons: Vec<i64>,
    pub poster_url: String,
    pub last_watched_at: DateTime<Utc>,
}

/// The full cover selection (the `cover.json` manifest)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverSelection {
    pub movies: Vec<CoverMovie>,
    pub shows: Vec<CoverShow>,
}

impl CoverSelection {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty()
    }
}

/// Select the ten most recently watched movies
pub fn select_movies(entries: &[WatchedMovie], cdn_base: &str) -> Vec<CoverMovie> {
    let mut selected: Vec<CoverMovie> = entries
        .iter()
        .filter_map(|entry| {
            let watched_at = entry.last_watched_at?;
            let movie = entry.movie.as_ref()?;
            let tmdb_id = movie.ids.tmdb?;

            Some(CoverMovie {
                tmdb_id,
                title: movie.title.clone().unwrap_or_else(|| "Unknown".to_string()),
                poster_url: movie_poster_url(cdn_base, tmdb_id),
                last_watched_at: watched_at,
            })
        })
        .collect();

    selected.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
    selected.truncate(MAX_PER_KIND);
    selected
}

/// Select the ten most recently watched shows, picking a season for each
pub fn select_shows<R: Rng>(
    entries: &[WatchedShow],
    cdn_base: &str,
    rng: &mut R,
) -> Vec<CoverShow> {
    let mut selected: Vec<CoverShow> = entries
        .iter()
        .filter_map(|entry| {
            let watched_at = entry.last_watched_at?;
            let show = entry.show.as_ref()?;
            let tmdb_id = show.ids.tmdb?;

            let available_seasons: Vec<i64> = entry
                .seasons
                .iter()
                .filter_map(|season| season.number)
                .filter(|&number| number > 0)
                .collect();

            let season = match available_seasons.choose(rng) {
                Some(&season) => season,
                None => rng.random_range(1..=5),
            };

            Some(CoverShow {
                tmdb_id,
                title: show.title.clone().unwrap_or_else(|| "Unknown".to_string()),
                season,
                available_seasons,
                poster_url: season_poster_url(cdn_base, tmdb_id, season),
                last_watched_at: watched_at,
            })
        })
        .collect();

    selected.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
    selected.truncate(MAX_PER_KIND);
    selected
}

/// CDN URL of a movie poster
pub fn movie_poster_url(cdn_base: &str, tmdb_id: u64) -> String {
    format!("{}/movies/posters/{}_poster.jpg", cdn_base, tmdb_id)
}

/// CDN URL of a season poster
pub fn season_poster_url(cdn_base: &str, tmdb_id: u64, season: i64) -> String {
    format!(
        "{}/shows/posters/{}/{}/season_{}_poster.jpg",
        cdn_base, tmdb_id, season, season
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use trakt_fetcher::{WatchedMovie, WatchedShow};

    const CDN: &str = "https://cfcdn.sayed.app/watch";

    fn movie(tmdb: Option<u64>, watched_at: &str) -> WatchedMovie {
        serde_json::from_value(json!({
            "last_watched_at": watched_at,
            "movie": {"title": "T", "ids": {"tmdb": tmdb}}
        }))
        .unwrap()
    }

    fn show(tmdb: Option<u64>, watched_at: &str, seasons: Vec<i64>) -> WatchedShow {
        let seasons: Vec<_> = seasons.iter().map(|n| json!({"number": n})).collect();
        serde_json::from_value(json!({
            "last_watched_at": watched_at,
            "show": {"title": "S", "ids": {"tmdb": tmdb}},
            "seasons": seasons
        }))
        .unwrap()
    }

    #[test]
    fn test_movies_sorted_newest_first_and_capped() {
        let mut entries = Vec::new();
        for day in 1..=15 {
            entries.push(movie(Some(day), &format!("2024-01-{:02}T00:00:00Z", day)));
        }

        let selected = select_movies(&entries, CDN);
        assert_eq!(selected.len(), MAX_PER_KIND);
        // Strictly non-increasing by last_watched_at
        for pair in selected.windows(2) {
            assert!(pair[0].last_watched_at >= pair[1].last_watched_at);
        }
        assert_eq!(selected[0].tmdb_id, 15);
    }

    #[test]
    fn test_entries_without_tmdb_id_are_dropped() {
        let entries = vec![
            movie(Some(603), "2024-01-01T00:00:00Z"),
            movie(None, "2024-06-01T00:00:00Z"),
        ];

        let selected = select_movies(&entries, CDN);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].tmdb_id, 603);
    }

    #[test]
    fn test_movie_poster_url_template() {
        let entries = vec![movie(Some(603), "2024-01-01T00:00:00Z")];
        let selected = select_movies(&entries, CDN);
        assert_eq!(
            selected[0].poster_url,
            "https://cfcdn.sayed.app/watch/movies/posters/603_poster.jpg"
        );
    }

    #[test]
    fn test_show_season_from_watched_seasons() {
        let mut rng = StdRng::seed_from_u64(7);
        // Season 0 (specials) must never be chosen
        let entries = vec![show(Some(1396), "2024-01-01T00:00:00Z", vec![0, 3])];

        let selected = select_shows(&entries, CDN, &mut rng);
        assert_eq!(selected[0].season, 3);
        assert_eq!(selected[0].available_seasons, vec![3]);
        assert_eq!(
            selected[0].poster_url,
            "https://cfcdn.sayed.app/watch/shows/posters/1396/3/season_3_poster.jpg"
        );
    }

    #[test]
    fn test_show_season_random_fallback_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let entries = vec![show(Some(1396), "2024-01-01T00:00:00Z", vec![])];

        for _ in 0..20 {
            let selected = select_shows(&entries, CDN, &mut rng);
            assert!((1..=5).contains(&selected[0].season));
            assert!(selected[0].available_seasons.is_empty());
        }
    }

    #[test]
    fn test_manifest_field_names() {
        let entries = vec![show(Some(1396), "2024-01-01T00:00:00Z", vec![2])];
        let mut rng = StdRng::seed_from_u64(1);
        let selection = CoverSelection {
            movies: select_movies(&[movie(Some(603), "2024-01-02T00:00:00Z")], CDN),
            shows: select_shows(&entries, CDN, &mut rng),
        };

        let value = serde_json::to_value(&selection).unwrap();
        assert!(value["movies"][0]["tmdb_id"].is_u64());
        assert!(value["movies"][0]["poster_url"].is_string());
        assert!(value["shows"][0]["season"].is_i64());
        assert!(value["shows"][0]["available_seasons"].is_array());
    }
}
