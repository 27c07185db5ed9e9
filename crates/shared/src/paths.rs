//! File path utilities for the on-disk data trees.
//!
//! This module provides a centralized way to manage paths for all output
//! files: the JSON document tree, the downloaded image tree, the media
//! index, and the cover outputs.

use std::path::{Path, PathBuf};

/// File path manager for the output trees
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== JSON tree ==========

    /// Get the JSON data directory
    pub fn json_dir(&self) -> PathBuf {
        self.root.join("data").join("json")
    }

    /// Get the user profile document
    pub fn profile_json(&self) -> PathBuf {
        self.json_dir().join("user/profile/basic.json")
    }

    /// Get the user stats document
    pub fn stats_json(&self) -> PathBuf {
        self.json_dir().join("user/stats/overview.json")
    }

    /// Get a history document ("movies" or "shows")
    pub fn history_json(&self, kind: &str) -> PathBuf {
        self.json_dir().join(format!("user/history/{}.json", kind))
    }

    /// Get a watched document ("movies" or "shows")
    pub fn watched_json(&self, kind: &str) -> PathBuf {
        self.json_dir().join(format!("user/watched/{}.json", kind))
    }

    /// Get a watchlist document ("all", "movies" or "shows")
    pub fn watchlist_json(&self, kind: &str) -> PathBuf {
        self.json_dir().join(format!("user/watchlist/{}.json", kind))
    }

    /// Get the lists directory
    pub fn lists_dir(&self) -> PathBuf {
        self.json_dir().join("user/lists")
    }

    /// Get the user lists document
    pub fn user_lists_json(&self) -> PathBuf {
        self.lists_dir().join("user_lists.json")
    }

    /// Get the items document for a single list
    pub fn list_items_json(&self, slug: &str) -> PathBuf {
        self.lists_dir().join(format!("{}_items.json", slug))
    }

    /// Get the comments document
    pub fn comments_json(&self) -> PathBuf {
        self.json_dir().join("user/comments/all.json")
    }

    /// Get the fetch index document
    pub fn index_json(&self) -> PathBuf {
        self.json_dir().join("index.json")
    }

    // ========== Image tree ==========

    /// Get the image directory
    pub fn imgs_dir(&self) -> PathBuf {
        self.root.join("data").join("imgs")
    }

    /// Get the avatar file path for a given extension
    pub fn avatar_file(&self, extension: &str) -> PathBuf {
        self.imgs_dir().join(format!("dp.{}", extension))
    }

    /// Get a movie poster path
    pub fn movie_poster(&self, tmdb_id: u64) -> PathBuf {
        self.imgs_dir()
            .join("movies/posters")
            .join(format!("{}_poster.jpg", tmdb_id))
    }

    /// Get a movie backdrop path
    pub fn movie_backdrop(&self, tmdb_id: u64) -> PathBuf {
        self.imgs_dir()
            .join("movies/backdrops")
            .join(format!("{}_backdrop.jpg", tmdb_id))
    }

    /// Get a show poster path
    pub fn show_poster(&self, tmdb_id: u64) -> PathBuf {
        self.imgs_dir()
            .join("shows/posters")
            .join(format!("{}_poster.jpg", tmdb_id))
    }

    /// Get a show backdrop path
    pub fn show_backdrop(&self, tmdb_id: u64) -> PathBuf {
        self.imgs_dir()
            .join("shows/backdrops")
            .join(format!("{}_backdrop.jpg", tmdb_id))
    }

    /// Get a season poster path (shows/posters/{id}/{season}/...)
    pub fn season_poster(&self, tmdb_id: u64, season: i64) -> PathBuf {
        self.imgs_dir()
            .join("shows/posters")
            .join(tmdb_id.to_string())
            .join(season.to_string())
            .join(format!("season_{}_poster.jpg", season))
    }

    /// Get the media index path
    pub fn media_index(&self) -> PathBuf {
        self.imgs_dir().join("media_index.json")
    }

    // ========== Cover outputs ==========

    /// Get the cover manifest path
    pub fn cover_json(&self) -> PathBuf {
        self.root.join("cover.json")
    }

    /// Get the cover image path
    pub fn cover_jpg(&self) -> PathBuf {
        self.root.join("cover.jpg")
    }

    // ========== Utility Methods ==========

    /// Create all necessary directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        let json = self.json_dir();
        let imgs = self.imgs_dir();
        let dirs = vec![
            json.join("user/profile"),
            json.join("user/stats"),
            json.join("user/history"),
            json.join("user/watched"),
            json.join("user/watchlist"),
            json.join("user/lists"),
            json.join("user/comments"),
            imgs.join("movies/posters"),
            imgs.join("movies/backdrops"),
            imgs.join("shows/posters"),
            imgs.join("shows/backdrops"),
        ];

        for dir in dirs {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_paths() {
        let paths = DataPaths::new("/out");

        assert_eq!(
            paths.profile_json(),
            PathBuf::from("/out/data/json/user/profile/basic.json")
        );
        assert_eq!(
            paths.watched_json("movies"),
            PathBuf::from("/out/data/json/user/watched/movies.json")
        );
        assert_eq!(
            paths.list_items_json("best-of-2024"),
            PathBuf::from("/out/data/json/user/lists/best-of-2024_items.json")
        );
        assert_eq!(
            paths.index_json(),
            PathBuf::from("/out/data/json/index.json")
        );
    }

    #[test]
    fn test_image_paths() {
        let paths = DataPaths::new("/out");

        assert_eq!(
            paths.movie_poster(603),
            PathBuf::from("/out/data/imgs/movies/posters/603_poster.jpg")
        );
        assert_eq!(
            paths.movie_backdrop(603),
            PathBuf::from("/out/data/imgs/movies/backdrops/603_backdrop.jpg")
        );
        assert_eq!(
            paths.season_poster(1396, 2),
            PathBuf::from("/out/data/imgs/shows/posters/1396/2/season_2_poster.jpg")
        );
        assert_eq!(
            paths.avatar_file("png"),
            PathBuf::from("/out/data/imgs/dp.png")
        );
    }

    #[test]
    fn test_cover_paths() {
        let paths = DataPaths::new("/out");
        assert_eq!(paths.cover_json(), PathBuf::from("/out/cover.json"));
        assert_eq!(paths.cover_jpg(), PathBuf::from("/out/cover.jpg"));
    }

    #[test]
    fn test_create_dirs() -> std::io::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let paths = DataPaths::new(temp.path());
        paths.create_dirs()?;

        assert!(paths.json_dir().join("user/watched").is_dir());
        assert!(paths.imgs_dir().join("shows/backdrops").is_dir());
        Ok(())
    }
}
