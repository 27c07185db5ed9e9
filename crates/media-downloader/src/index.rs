//! Media index: a derived record of every image present on disk.
//!
//! The index is rebuilt from a full directory walk on every run, never
//! patched incrementally, so it always matches disk state regardless of
//! which downloads succeeded. Ordered maps and sorted filename lists keep
//! rebuilds over an unchanged tree byte-identical.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Poster/backdrop filename lists for one media kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGroup {
    pub posters: Vec<String>,
    pub backdrops: Vec<String>,
}

/// Show images, including the nested show-id -> season -> filenames map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowImageGroup {
    pub posters: Vec<String>,
    pub backdrops: Vec<String>,
    pub season_posters: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// Flat index of all downloaded media files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaIndex {
    pub last_updated: String,
    pub movies: ImageGroup,
    pub shows: ShowImageGroup,
}

impl MediaIndex {
    /// Rebuild the index by walking the image tree
    pub fn rebuild(imgs_dir: &Path) -> Result<Self> {
        let movies_dir = imgs_dir.join("movies");
        let movies = ImageGroup {
            posters: scan_jpgs(&movies_dir.join("posters"))?,
            backdrops: scan_jpgs(&movies_dir.join("backdrops"))?,
        };

        let shows_dir = imgs_dir.join("shows");
        let shows = ShowImageGroup {
            posters: scan_jpgs(&shows_dir.join("posters"))?,
            backdrops: scan_jpgs(&shows_dir.join("backdrops"))?,
            season_posters: scan_season_posters(&shows_dir.join("posters"))?,
        };

        Ok(Self {
            last_updated: Utc::now().to_rfc3339(),
            movies,
            shows,
        })
    }

    /// Write the index as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize index")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(
            path = %path.display(),
            movie_posters = self.movies.posters.len(),
            show_posters = self.shows.posters.len(),
            season_shows = self.shows.season_posters.len(),
            "Media index written"
        );

        Ok(())
    }
}

/// List the `.jpg` filenames directly inside a directory, sorted
fn scan_jpgs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    if !dir.exists() {
        return Ok(names);
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".jpg") {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Walk `shows/posters/{id}/{season}/` for season poster filenames
fn scan_season_posters(
    posters_dir: &Path,
) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
    let mut seasons = BTreeMap::new();

    if !posters_dir.exists() {
        return Ok(seasons);
    }

    for entry in std::fs::read_dir(posters_dir)
        .with_context(|| format!("Failed to read directory {}", posters_dir.display()))?
    {
        let entry = entry?;
        let show_id = entry.file_name().to_string_lossy().to_string();
        if !entry.file_type()?.is_dir() || !show_id.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let mut show_seasons = BTreeMap::new();
        for season_entry in std::fs::read_dir(entry.path())? {
            let season_entry = season_entry?;
            if !season_entry.file_type()?.is_dir() {
                continue;
            }

            let season = season_entry.file_name().to_string_lossy().to_string();
            let posters = scan_jpgs(&season_entry.path())?;
            if !posters.is_empty() {
                show_seasons.insert(season, posters);
            }
        }

        seasons.insert(show_id, show_seasons);
    }

    Ok(seasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"jpg").unwrap();
    }

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let imgs = temp.path();

        touch(&imgs.join("movies/posters/603_poster.jpg"));
        touch(&imgs.join("movies/posters/155_poster.jpg"));
        touch(&imgs.join("movies/backdrops/603_backdrop.jpg"));
        touch(&imgs.join("shows/posters/1396_poster.jpg"));
        touch(&imgs.join("shows/backdrops/1396_backdrop.jpg"));
        touch(&imgs.join("shows/posters/1396/1/season_1_poster.jpg"));
        touch(&imgs.join("shows/posters/1396/2/season_2_poster.jpg"));

        temp
    }

    #[test]
    fn test_rebuild_walks_the_tree() {
        let temp = sample_tree();
        let index = MediaIndex::rebuild(temp.path()).unwrap();

        // Sorted lexicographically
        assert_eq!(
            index.movies.posters,
            vec!["155_poster.jpg", "603_poster.jpg"]
        );
        assert_eq!(index.movies.backdrops, vec!["603_backdrop.jpg"]);
        assert_eq!(index.shows.posters, vec!["1396_poster.jpg"]);

        let seasons = &index.shows.season_posters["1396"];
        assert_eq!(seasons["1"], vec!["season_1_poster.jpg"]);
        assert_eq!(seasons["2"], vec!["season_2_poster.jpg"]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let temp = sample_tree();
        let first = MediaIndex::rebuild(temp.path()).unwrap();
        let second = MediaIndex::rebuild(temp.path()).unwrap();

        // Identical apart from the timestamp
        assert_eq!(first.movies, second.movies);
        assert_eq!(first.shows, second.shows);
    }

    #[test]
    fn test_rebuild_of_empty_tree() {
        let temp = TempDir::new().unwrap();
        let index = MediaIndex::rebuild(temp.path()).unwrap();

        assert!(index.movies.posters.is_empty());
        assert!(index.shows.season_posters.is_empty());
    }

    #[test]
    fn test_non_numeric_directories_are_ignored() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("shows/posters/notashow/1/season_1_poster.jpg"));

        let index = MediaIndex::rebuild(temp.path()).unwrap();
        assert!(index.shows.season_posters.is_empty());
    }
}
