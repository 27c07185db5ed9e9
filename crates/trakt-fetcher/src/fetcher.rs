//! Main fetch orchestrator.
//!
//! Walks the fixed set of per-user Trakt endpoints, persisting each
//! response as a metadata-wrapped JSON document, downloading the avatar
//! as a side effect of the profile fetch, and finishing with an index
//! document describing the tree.

use crate::api::TraktClient;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use shared::{DataPaths, Document};
use std::path::Path;
use tracing::{error, info, warn};

/// Statistics for a fetch session
#[derive(Debug, Clone, Default)]
pub struct FetchStats {
    pub endpoints_fetched: usize,
    pub endpoints_skipped: usize,
    pub lists_fetched: usize,
    pub avatar_downloaded: bool,
}

/// Fetch coordinator for a single user's public data
pub struct TraktFetcher {
    client: TraktClient,
    paths: DataPaths,
    username: String,
}

impl TraktFetcher {
    /// Create a new fetcher
    pub fn new(client: TraktClient, paths: DataPaths, username: String) -> Self {
        Self {
            client,
            paths,
            username,
        }
    }

    /// Run the complete fetch process
    ///
    /// Every endpoint failure is independent: it is logged, counted, and
    /// the run proceeds to the next endpoint.
    pub async fn run(&self) -> Result<FetchStats> {
        info!(username = %self.username, "Starting Trakt data fetch");

        let mut stats = FetchStats::default();

        self.fetch_profile(&mut stats).await;
        self.fetch_history(&mut stats).await;
        self.fetch_watched(&mut stats).await;
        self.fetch_watchlist(&mut stats).await;
        self.fetch_lists(&mut stats).await;
        self.fetch_comments(&mut stats).await;

        self.write_index()
            .context("Failed to write fetch index")?;

        info!(
            username = %self.username,
            fetched = stats.endpoints_fetched,
            skipped = stats.endpoints_skipped,
            lists = stats.lists_fetched,
            "Trakt data fetch complete"
        );

        Ok(stats)
    }

    /// Fetch user profile and stats, downloading the avatar on the way
    async fn fetch_profile(&self, stats: &mut FetchStats) {
        let endpoint = format!("/users/{}", self.username);
        let profile = self
            .fetch_to(
                stats,
                &endpoint,
                &[("extended", "full")],
                "user/profile/basic.json",
                &self.paths.profile_json(),
            )
            .await;

        if let Some(profile) = profile {
            self.download_avatar(&profile, stats).await;
        }

        let endpoint = format!("/users/{}/stats", self.username);
        self.fetch_to(
            stats,
            &endpoint,
            &[],
            "user/stats/overview.json",
            &self.paths.stats_json(),
        )
        .await;
    }

    /// Fetch watch history for movies and shows
    async fn fetch_history(&self, stats: &mut FetchStats) {
        for kind in ["movies", "shows"] {
            let endpoint = format!("/users/{}/history/{}", self.username, kind);
            self.fetch_to(
                stats,
                &endpoint,
                &[],
                &format!("user/history/{}.json", kind),
                &self.paths.history_json(kind),
            )
            .await;
        }
    }

    /// Fetch watched aggregations for movies and shows
    async fn fetch_watched(&self, stats: &mut FetchStats) {
        for kind in ["movies", "shows"] {
            let endpoint = format!("/users/{}/watched/{}", self.username, kind);
            self.fetch_to(
                stats,
                &endpoint,
                &[],
                &format!("user/watched/{}.json", kind),
                &self.paths.watched_json(kind),
            )
            .await;
        }
    }

    /// Fetch the watchlist, combined and per type
    async fn fetch_watchlist(&self, stats: &mut FetchStats) {
        let endpoint = format!("/users/{}/watchlist", self.username);
        self.fetch_to(
            stats,
            &endpoint,
            &[],
            "user/watchlist/all.json",
            &self.paths.watchlist_json("all"),
        )
        .await;

        for kind in ["movies", "shows"] {
            let endpoint = format!("/users/{}/watchlist/{}", self.username, kind);
            self.fetch_to(
                stats,
                &endpoint,
                &[],
                &format!("user/watchlist/{}.json", kind),
                &self.paths.watchlist_json(kind),
            )
            .await;
        }
    }

    /// Fetch the user's lists, then the items of every list with a slug
    async fn fetch_lists(&self, stats: &mut FetchStats) {
        let endpoint = format!("/users/{}/lists", self.username);
        let lists = self
            .fetch_to(
                stats,
                &endpoint,
                &[],
                "user/lists/user_lists.json",
                &self.paths.user_lists_json(),
            )
            .await;

        let Some(Value::Array(lists)) = lists else {
            return;
        };

        for list in &lists {
            let Some(slug) = list
                .get("ids")
                .and_then(|ids| ids.get("slug"))
                .and_then(Value::as_str)
            else {
                continue;
            };

            let endpoint = format!("/users/{}/lists/{}/items", self.username, slug);
            let saved = self
                .fetch_to(
                    stats,
                    &endpoint,
                    &[],
                    &format!("user/lists/{}_items.json", slug),
                    &self.paths.list_items_json(slug),
                )
                .await;

            if saved.is_some() {
                stats.lists_fetched += 1;
            }
        }
    }

    /// Fetch the user's comments
    async fn fetch_comments(&self, stats: &mut FetchStats) {
        let endpoint = format!("/users/{}/comments", self.username);
        self.fetch_to(
            stats,
            &endpoint,
            &[],
            "user/comments/all.json",
            &self.paths.comments_json(),
        )
        .await;
    }

    /// Fetch one endpoint and persist the wrapped document
    ///
    /// Returns the raw payload when it was fetched and saved, `None` when
    /// the endpoint was skipped for any reason.
    async fn fetch_to(
        &self,
        stats: &mut FetchStats,
        endpoint: &str,
        query: &[(&str, &str)],
        doc_endpoint: &str,
        file: &Path,
    ) -> Option<Value> {
        let data = match self.client.get(endpoint, query).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                stats.endpoints_skipped += 1;
                return None;
            }
            Err(e) => {
                error!(endpoint = endpoint, error = %e, "Endpoint fetch failed");
                stats.endpoints_skipped += 1;
                return None;
            }
        };

        match self.save_json(data.clone(), doc_endpoint, file) {
            Ok(count) => {
                info!(endpoint = doc_endpoint, count = count, "Saved document");
                stats.endpoints_fetched += 1;
                Some(data)
            }
            Err(e) => {
                error!(file = %file.display(), error = %e, "Failed to save document");
                stats.endpoints_skipped += 1;
                None
            }
        }
    }

    /// Wrap a payload with fetch metadata and write it to disk
    fn save_json(&self, data: Value, doc_endpoint: &str, file: &Path) -> Result<usize> {
        let document = Document::new(data, &self.username, doc_endpoint);
        let count = document.metadata.count;

        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&document)
            .context("Failed to serialize document")?;
        std::fs::write(file, content)
            .with_context(|| format!("Failed to write {}", file.display()))?;

        Ok(count)
    }

    /// Download the user's avatar, trying full, then medium, then thumb
    async fn download_avatar(&self, profile: &Value, stats: &mut FetchStats) {
        let Some(url) = avatar_url(profile) else {
            info!("No avatar URL in profile");
            return;
        };

        let extension = extension_from_url(url);
        let dest = self.paths.avatar_file(&extension);

        match self.client.download_file(url, &dest).await {
            Ok(()) => {
                info!(dest = %dest.display(), "Avatar downloaded");
                stats.avatar_downloaded = true;
            }
            Err(e) => {
                warn!(url = url, error = %e, "Avatar download failed");
            }
        }
    }

    /// Write the final index document summarizing the fetched tree
    fn write_index(&self) -> Result<()> {
        let index = json!({
            "last_updated": Utc::now().to_rfc3339(),
            "data_type": "personal_user_data",
            "username": self.username,
            "authentication": "api_key_only",
            "data_structure": {
                "user": {
                    "profile": ["basic.json"],
                    "stats": ["overview.json"],
                    "history": ["movies.json", "shows.json"],
                    "watched": ["movies.json", "shows.json"],
                    "watchlist": ["all.json", "movies.json", "shows.json"],
                    "lists": ["user_lists.json", "[list_slug]_items.json"],
                    "comments": ["all.json"],
                }
            }
        });

        self.save_json(index, "index.json", &self.paths.index_json())?;
        Ok(())
    }
}

/// Pick the avatar URL from a profile payload, largest size first
fn avatar_url(profile: &Value) -> Option<&str> {
    let avatar = profile.get("images")?.get("avatar")?;
    for size in ["full", "medium", "thumb"] {
        if let Some(url) = avatar.get(size).and_then(Value::as_str) {
            if !url.is_empty() {
                return Some(url);
            }
        }
    }
    None
}

/// Infer an image extension from a URL, defaulting to jpg
fn extension_from_url(url: &str) -> String {
    let ext = url
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "webp" | "gif" => ext,
        _ => "jpg".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_avatar_url_prefers_full() {
        let profile = json!({
            "images": {"avatar": {
                "full": "https://img/full.png",
                "medium": "https://img/medium.png",
                "thumb": "https://img/thumb.png"
            }}
        });
        assert_eq!(avatar_url(&profile), Some("https://img/full.png"));
    }

    #[test]
    fn test_avatar_url_falls_back_through_sizes() {
        let profile = json!({
            "images": {"avatar": {"full": "", "thumb": "https://img/thumb.png"}}
        });
        assert_eq!(avatar_url(&profile), Some("https://img/thumb.png"));

        let profile = json!({"images": {}});
        assert_eq!(avatar_url(&profile), None);
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("https://img/avatar.png"), "png");
        assert_eq!(extension_from_url("https://img/avatar.JPEG"), "jpeg");
        assert_eq!(extension_from_url("https://img/avatar.webp"), "webp");
        // Unknown or missing extensions fall back to jpg
        assert_eq!(extension_from_url("https://img/avatar.svg"), "jpg");
        assert_eq!(extension_from_url("https://img/avatar"), "jpg");
    }
}
