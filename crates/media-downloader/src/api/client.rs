//! TMDB API v3 client with fixed-delay rate limiting and bounded 429 retry.

use super::types::{ImageList, SeasonImages, TvDetails};
use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::config::TmdbConfig;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// TMDB API v3 client
///
/// Authenticates with the `api_key` query parameter and inserts a fixed
/// delay before every outbound call. The limiter is deliberately a plain
/// sleep, not adaptive: requests are strictly sequential and TMDB's
/// 40-per-10-seconds budget leaves plenty of headroom at 4/s.
pub struct TmdbClient {
    /// HTTP client
    client: Client,
    /// Base URL for the TMDB API
    base_url: String,
    /// Base URL for the TMDB image CDN
    image_base_url: String,
    /// API key, sent as a query parameter
    api_key: String,
    /// Poster size to download
    poster_size: String,
    /// Backdrop size to download
    backdrop_size: String,
    /// Fixed delay before every outbound call
    request_delay: Duration,
    /// Wait applied when a 429 carries no Retry-After header
    default_retry_after: Duration,
    /// Maximum attempts while the server keeps answering 429
    max_retries: u32,
}

impl TmdbClient {
    /// Create a new TMDB client
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("trakt-sync/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            image_base_url: config.image_base_url.clone(),
            api_key: config.api_key.clone(),
            poster_size: config.poster_size.clone(),
            backdrop_size: config.backdrop_size.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
            default_retry_after: Duration::from_secs(config.retry_after_default_secs),
            max_retries: config.max_retries,
        })
    }

    /// Make a GET request, returning `None` when the endpoint is unavailable
    ///
    /// Same contract as the Trakt client: only 429 is retried, bounded by
    /// `max_retries`; everything else logs and maps to `Ok(None)`.
    async fn get(&self, endpoint: &str) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, endpoint);

        for attempt in 0..=self.max_retries {
            // Crude rate limiter: fixed pause before every call
            sleep(self.request_delay).await;

            debug!(url = %url, attempt = attempt + 1, "Making API request");

            let request = self
                .client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())]);

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(url = %url, error = %e, "Request error, skipping");
                    return Ok(None);
                }
            };

            let status = response.status();

            if status.is_success() {
                match response.json::<Value>().await {
                    Ok(data) => return Ok(Some(data)),
                    Err(e) => {
                        warn!(url = %url, error = %e, "Failed to parse response");
                        return Ok(None);
                    }
                }
            } else if status == StatusCode::TOO_MANY_REQUESTS {
                let delay = retry_after_delay(response.headers(), self.default_retry_after);
                warn!(
                    url = %url,
                    delay_secs = delay.as_secs(),
                    attempt = attempt + 1,
                    "Rate limited by server, waiting"
                );
                sleep(delay).await;
                continue;
            } else {
                warn!(url = %url, status = %status, "Request failed, skipping");
                return Ok(None);
            }
        }

        Err(anyhow!(
            "Still rate limited after {} attempts: {}",
            self.max_retries + 1,
            url
        ))
    }

    /// Make a GET request and decode into a typed response
    async fn get_typed<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>> {
        let Some(value) = self.get(endpoint).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(endpoint = endpoint, error = %e, "Unexpected response shape");
                Ok(None)
            }
        }
    }

    /// Fetch the image list for a movie
    pub async fn movie_images(&self, tmdb_id: u64) -> Result<Option<ImageList>> {
        self.get_typed(&format!("/movie/{}/images", tmdb_id)).await
    }

    /// Fetch the image list for a TV show
    pub async fn tv_images(&self, tmdb_id: u64) -> Result<Option<ImageList>> {
        self.get_typed(&format!("/tv/{}/images", tmdb_id)).await
    }

    /// Fetch show details (season list)
    pub async fn tv_details(&self, tmdb_id: u64) -> Result<Option<TvDetails>> {
        self.get_typed(&format!("/tv/{}", tmdb_id)).await
    }

    /// Fetch the poster list for one season of a show
    pub async fn season_images(&self, tmdb_id: u64, season: i64) -> Result<Option<SeasonImages>> {
        self.get_typed(&format!("/tv/{}/season/{}/images", tmdb_id, season))
            .await
    }

    /// Build a full CDN URL for a poster file path
    pub fn poster_url(&self, file_path: &str) -> String {
        format!("{}/{}{}", self.image_base_url, self.poster_size, file_path)
    }

    /// Build a full CDN URL for a backdrop file path
    pub fn backdrop_url(&self, file_path: &str) -> String {
        format!(
            "{}/{}{}",
            self.image_base_url, self.backdrop_size, file_path
        )
    }

    /// Download an image to `dest` unless it already exists
    ///
    /// Returns `true` when a new file was written, `false` when the
    /// existing file was kept. Existing files are never re-validated.
    pub async fn download_image(&self, url: &str, dest: &Path) -> Result<bool> {
        if dest.exists() {
            debug!(dest = %dest.display(), "Image already exists, skipping");
            return Ok(false);
        }

        sleep(self.request_delay).await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad status downloading {}", url))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(dest, &bytes)
            .with_context(|| format!("Failed to write {}", dest.display()))?;

        debug!(dest = %dest.display(), bytes = bytes.len(), "Image downloaded");
        Ok(true)
    }
}

/// Read the wait duration from a 429 response, defaulting when absent
fn retry_after_delay(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TmdbConfig {
        TmdbConfig {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            api_key: "k".to_string(),
            poster_size: "w780".to_string(),
            backdrop_size: "w1280".to_string(),
            request_delay_ms: 0,
            max_retries: 3,
            retry_after_default_secs: 10,
        }
    }

    #[test]
    fn test_image_urls() {
        let client = TmdbClient::new(&test_config()).unwrap();
        assert_eq!(
            client.poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w780/abc.jpg"
        );
        assert_eq!(
            client.backdrop_url("/xyz.jpg"),
            "https://image.tmdb.org/t/p/w1280/xyz.jpg"
        );
    }

    #[test]
    fn test_retry_after_default_is_ten_seconds() {
        let headers = HeaderMap::new();
        assert_eq!(
            retry_after_delay(&headers, Duration::from_secs(10)),
            Duration::from_secs(10)
        );

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(
            retry_after_delay(&headers, Duration::from_secs(10)),
            Duration::from_secs(2)
        );
    }

    #[tokio::test]
    async fn test_download_skips_existing_file() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        let dest = temp.path().join("603_poster.jpg");
        std::fs::write(&dest, b"existing")?;

        let client = TmdbClient::new(&test_config())?;
        // No network call happens for an existing destination
        let written = client
            .download_image("https://invalid.test/poster.jpg", &dest)
            .await?;

        assert!(!written);
        assert_eq!(std::fs::read(&dest)?, b"existing");
        Ok(())
    }
}
