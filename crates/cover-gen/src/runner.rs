//! Cover generation entry point shared by the CLI and the data manager.

use crate::compositor::Compositor;
use crate::selection::{self, CoverSelection};
use anyhow::{bail, Context, Result};
use shared::{Config, DataPaths};
use tracing::{info, warn};
use trakt_fetcher::{TraktClient, WatchedMovie, WatchedShow};

/// Statistics for a cover generation run
#[derive(Debug, Clone, Default)]
pub struct CoverStats {
    pub movies_selected: usize,
    pub shows_selected: usize,
    pub posters_composited: usize,
}

/// Fetch watched data, write the manifest, and render the cover image
pub async fn generate(config: &Config) -> Result<CoverStats> {
    let paths = DataPaths::new(config.data_dir());
    let selection = build_selection(config).await?;

    if selection.is_empty() {
        bail!("No watched data fetched, cannot generate cover");
    }

    // Persist the manifest before rendering so the selection survives a
    // failed render
    write_manifest(&selection, &paths)?;

    let compositor = Compositor::new(&config.cover)?;
    let successful = compositor.render(&selection, &paths.cover_jpg()).await?;

    Ok(CoverStats {
        movies_selected: selection.movies.len(),
        shows_selected: selection.shows.len(),
        posters_composited: successful,
    })
}

/// Fetch the watched aggregations and build the cover selection
async fn build_selection(config: &Config) -> Result<CoverSelection> {
    let client = TraktClient::new(&config.trakt).context("Failed to create Trakt client")?;
    let username = &config.trakt.username;

    let movies = fetch_watched::<WatchedMovie>(&client, username, "movies").await?;
    let shows = fetch_watched::<WatchedShow>(&client, username, "shows").await?;

    let mut rng = rand::rng();
    let selection = CoverSelection {
        movies: selection::select_movies(&movies, &config.cover.cdn_base_url),
        shows: selection::select_shows(&shows, &config.cover.cdn_base_url, &mut rng),
    };

    info!(
        movies = selection.movies.len(),
        shows = selection.shows.len(),
        "Selected most recently watched titles"
    );

    Ok(selection)
}

/// Fetch one watched list, tolerating an unavailable endpoint
async fn fetch_watched<T: serde::de::DeserializeOwned>(
    client: &TraktClient,
    username: &str,
    kind: &str,
) -> Result<Vec<T>> {
    let endpoint = format!("/users/{}/watched/{}", username, kind);

    let Some(value) = client.get(&endpoint, &[]).await? else {
        warn!(kind = kind, "Watched list unavailable");
        return Ok(Vec::new());
    };

    match serde_json::from_value(value) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!(kind = kind, error = %e, "Unexpected watched list shape");
            Ok(Vec::new())
        }
    }
}

/// Write the selection manifest (`cover.json`)
fn write_manifest(selection: &CoverSelection, paths: &DataPaths) -> Result<()> {
    let path = paths.cover_json();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let content =
        serde_json::to_string_pretty(selection).context("Failed to serialize cover manifest")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Cover manifest saved");
    Ok(())
}
