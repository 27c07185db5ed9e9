//! Artwork download orchestrator.
//!
//! Scans the persisted JSON documents, classifies every item, downloads at
//! most one poster and one backdrop per title (plus one poster per season
//! for shows), and finishes by rebuilding the media index from disk.

use crate::api::TmdbClient;
use crate::index::MediaIndex;
use crate::items::{classify, MediaKind, SourceHint};
use anyhow::{Context, Result};
use serde_json::Value;
use shared::DataPaths;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Statistics for a download session
#[derive(Debug, Clone, Default)]
pub struct DownloadStats {
    pub files_processed: usize,
    pub items_processed: usize,
    pub images_downloaded: usize,
    pub images_skipped: usize,
    pub errors: usize,
}

/// Media download coordinator
pub struct MediaDownloader {
    tmdb: TmdbClient,
    paths: DataPaths,
    stats: DownloadStats,
}

impl MediaDownloader {
    /// Create a new downloader
    pub fn new(tmdb: TmdbClient, paths: DataPaths) -> Self {
        Self {
            tmdb,
            paths,
            stats: DownloadStats::default(),
        }
    }

    /// Run the complete download process
    ///
    /// Every failure is per-item or per-image: logged, counted, and the
    /// run continues. The index rebuild at the end always happens.
    pub async fn run(&mut self) -> Result<DownloadStats> {
        info!("Starting media download");

        let json_dir = self.paths.json_dir();
        if !json_dir.exists() {
            error!(dir = %json_dir.display(), "JSON data directory not found, nothing to do");
            return Ok(self.stats.clone());
        }

        for source in self.source_files() {
            if source.exists() {
                info!(file = %source.display(), "Processing source");
                self.process_file(&source).await;
                self.stats.files_processed += 1;
            } else {
                warn!(file = %source.display(), "Source file not found");
            }
        }

        for source in self.list_item_files()? {
            info!(file = %source.display(), "Processing list");
            self.process_file(&source).await;
            self.stats.files_processed += 1;
        }

        // Always derived from a fresh walk, never from in-memory bookkeeping
        let index = MediaIndex::rebuild(&self.paths.imgs_dir())
            .context("Failed to rebuild media index")?;
        index
            .write(&self.paths.media_index())
            .context("Failed to write media index")?;

        info!(
            files = self.stats.files_processed,
            items = self.stats.items_processed,
            downloaded = self.stats.images_downloaded,
            skipped = self.stats.images_skipped,
            errors = self.stats.errors,
            "Media download complete"
        );

        Ok(self.stats.clone())
    }

    /// Fixed set of documents that feed the downloader
    fn source_files(&self) -> Vec<PathBuf> {
        vec![
            self.paths.watchlist_json("movies"),
            self.paths.watchlist_json("all"),
            self.paths.history_json("movies"),
            self.paths.history_json("shows"),
            self.paths.watched_json("movies"),
            self.paths.watched_json("shows"),
        ]
    }

    /// All persisted list item documents (`user/lists/*_items.json`)
    fn list_item_files(&self) -> Result<Vec<PathBuf>> {
        let lists_dir = self.paths.lists_dir();
        let mut files = Vec::new();

        if !lists_dir.exists() {
            return Ok(files);
        }

        for entry in std::fs::read_dir(&lists_dir)
            .with_context(|| format!("Failed to read directory {}", lists_dir.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with("_items.json") {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Process every item of one persisted document
    async fn process_file(&mut self, path: &Path) {
        let items = match read_items(path) {
            Ok(items) => items,
            Err(e) => {
                error!(file = %path.display(), error = %e, "Failed to read source file");
                self.stats.errors += 1;
                return;
            }
        };

        let hint = SourceHint::from_path(path);

        for item in &items {
            if !item.is_object() {
                continue;
            }

            let Some(media) = classify(item, hint) else {
                debug!(file = %path.display(), "Item without resolvable kind or TMDB id, skipping");
                continue;
            };

            self.stats.items_processed += 1;

            let result = match media.kind {
                MediaKind::Movie => self.process_movie(media.tmdb).await,
                MediaKind::Show => self.process_show(media.tmdb).await,
            };

            if let Err(e) = result {
                error!(tmdb_id = media.tmdb, error = %e, "Item processing failed");
                self.stats.errors += 1;
            }
        }
    }

    /// Download poster and backdrop for one movie
    async fn process_movie(&mut self, tmdb_id: u64) -> Result<()> {
        debug!(tmdb_id = tmdb_id, "Processing movie");

        let Some(images) = self.tmdb.movie_images(tmdb_id).await? else {
            return Ok(());
        };

        if let Some(file_path) = first_file_path(&images.posters) {
            let url = self.tmdb.poster_url(file_path);
            self.fetch_image(&url, &self.paths.movie_poster(tmdb_id))
                .await;
        }
        if let Some(file_path) = first_file_path(&images.backdrops) {
            let url = self.tmdb.backdrop_url(file_path);
            self.fetch_image(&url, &self.paths.movie_backdrop(tmdb_id))
                .await;
        }

        Ok(())
    }

    /// Download poster, backdrop and per-season posters for one show
    async fn process_show(&mut self, tmdb_id: u64) -> Result<()> {
        debug!(tmdb_id = tmdb_id, "Processing show");

        if let Some(images) = self.tmdb.tv_images(tmdb_id).await? {
            if let Some(file_path) = first_file_path(&images.posters) {
                let url = self.tmdb.poster_url(file_path);
                self.fetch_image(&url, &self.paths.show_poster(tmdb_id))
                    .await;
            }
            if let Some(file_path) = first_file_path(&images.backdrops) {
                let url = self.tmdb.backdrop_url(file_path);
                self.fetch_image(&url, &self.paths.show_backdrop(tmdb_id))
                    .await;
            }
        }

        let Some(details) = self.tmdb.tv_details(tmdb_id).await? else {
            return Ok(());
        };

        for season in &details.seasons {
            let Some(number) = season.season_number else {
                continue;
            };

            let dest = self.paths.season_poster(tmdb_id, number);
            if dest.exists() {
                debug!(tmdb_id = tmdb_id, season = number, "Season poster already exists");
                self.stats.images_skipped += 1;
                continue;
            }

            let Some(season_images) = self.tmdb.season_images(tmdb_id, number).await? else {
                continue;
            };

            if let Some(file_path) = first_file_path(&season_images.posters) {
                let url = self.tmdb.poster_url(file_path);
                self.fetch_image(&url, &dest).await;
            } else {
                debug!(tmdb_id = tmdb_id, season = number, "No season poster available");
            }
        }

        Ok(())
    }

    /// Download one image, folding the outcome into the stats
    async fn fetch_image(&mut self, url: &str, dest: &Path) {
        match self.tmdb.download_image(url, dest).await {
            Ok(true) => {
                info!(dest = %dest.display(), "Downloaded");
                self.stats.images_downloaded += 1;
            }
            Ok(false) => {
                self.stats.images_skipped += 1;
            }
            Err(e) => {
                error!(url = url, error = %e, "Image download failed");
                self.stats.errors += 1;
            }
        }
    }
}

/// Read a persisted document and return its items as a flat list
///
/// Accepts the `{metadata, data}` wrapper, a bare array, or a single
/// object (wrapped into a one-element list).
fn read_items(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let payload = match data {
        Value::Object(ref map) if map.contains_key("data") => map["data"].clone(),
        other => other,
    };

    Ok(match payload {
        Value::Array(items) => items,
        single => vec![single],
    })
}

/// First usable file path of an image list
fn first_file_path(records: &[crate::api::ImageRecord]) -> Option<&str> {
    records.iter().find_map(|record| record.file_path.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_items_unwraps_document() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("watched.json");
        std::fs::write(
            &path,
            serde_json::to_string(&json!({
                "metadata": {"count": 2},
                "data": [{"movie": {"ids": {"tmdb": 603}}}, {"movie": {"ids": {"tmdb": 155}}}]
            }))?,
        )?;

        let items = read_items(&path)?;
        assert_eq!(items.len(), 2);
        Ok(())
    }

    #[test]
    fn test_read_items_accepts_bare_shapes() -> Result<()> {
        let temp = TempDir::new()?;

        let path = temp.path().join("array.json");
        std::fs::write(&path, "[1, 2, 3]")?;
        assert_eq!(read_items(&path)?.len(), 3);

        let path = temp.path().join("object.json");
        std::fs::write(&path, r#"{"ids": {"tmdb": 603}}"#)?;
        assert_eq!(read_items(&path)?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_first_file_path_skips_null_entries() {
        use crate::api::ImageRecord;

        let records = vec![
            ImageRecord { file_path: None },
            ImageRecord {
                file_path: Some("/abc.jpg".to_string()),
            },
        ];
        assert_eq!(first_file_path(&records), Some("/abc.jpg"));
        assert_eq!(first_file_path(&[]), None);
    }
}
