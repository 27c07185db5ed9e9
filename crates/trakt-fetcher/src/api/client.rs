//! Trakt API v2 client with bounded rate-limit retry.

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::config::TraktConfig;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Trakt API v2 client
///
/// All requests are GET, authenticated with the `trakt-api-key` header.
/// A 429 answer is retried after the server-supplied `Retry-After` wait,
/// at most `max_retries` times; any other failure is logged and reported
/// as an absent response so callers can skip the endpoint.
pub struct TraktClient {
    /// HTTP client
    client: Client,
    /// Base URL for the Trakt API
    base_url: String,
    /// Wait applied when a 429 carries no Retry-After header
    default_retry_after: Duration,
    /// Maximum attempts while the server keeps answering 429
    max_retries: u32,
}

impl TraktClient {
    /// Create a new Trakt client
    pub fn new(config: &TraktConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("trakt-api-version", HeaderValue::from_static("2"));
        headers.insert(
            "trakt-api-key",
            HeaderValue::from_str(&config.api_key).context("Invalid Trakt API key")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("trakt-sync/0.1.0")
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            default_retry_after: Duration::from_secs(config.retry_after_default_secs),
            max_retries: config.max_retries,
        })
    }

    /// Make a GET request, returning `None` when the endpoint is unavailable
    ///
    /// Only rate limiting is retried. A non-2xx status, a network error, or
    /// an unparseable body are logged and mapped to `Ok(None)`; exhausting
    /// the retry budget on 429s is the one definite error.
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, endpoint);

        for attempt in 0..=self.max_retries {
            debug!(url = %url, attempt = attempt + 1, "Making API request");

            let response = match self.client.get(&url).query(query).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(url = %url, error = %e, "Request error, skipping endpoint");
                    return Ok(None);
                }
            };

            let status = response.status();

            if status.is_success() {
                match response.json::<Value>().await {
                    Ok(data) => {
                        debug!(url = %url, "Request successful");
                        return Ok(Some(data));
                    }
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
                warn!(url = %url, status = %status, "Request failed, skipping endpoint");
                return Ok(None);
            }
        }

        Err(anyhow!(
            "Still rate limited after {} attempts: {}",
            self.max_retries + 1,
            url
        ))
    }

    /// Download a file (avatar image) to the given destination
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
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

        debug!(url = %url, dest = %dest.display(), bytes = bytes.len(), "File downloaded");
        Ok(())
    }
}

/// Read the wait duration from a 429 response
///
/// `Retry-After` is interpreted as whole seconds; a missing or malformed
/// header falls back to the configured default.
pub fn retry_after_delay(headers: &HeaderMap, default: Duration) -> Duration {
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

    #[test]
    fn test_retry_after_header_is_honored() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));

        let delay = retry_after_delay(&headers, Duration::from_secs(60));
        assert_eq!(delay, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_retry_after_uses_default() {
        let headers = HeaderMap::new();
        let delay = retry_after_delay(&headers, Duration::from_secs(60));
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn test_malformed_retry_after_uses_default() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

        let delay = retry_after_delay(&headers, Duration::from_secs(10));
        assert_eq!(delay, Duration::from_secs(10));
    }

    #[test]
    fn test_client_creation() {
        let config = TraktConfig {
            base_url: "https://api.trakt.tv".to_string(),
            api_key: "0123456789abcdef".to_string(),
            username: "lrs".to_string(),
            max_retries: 3,
            retry_after_default_secs: 60,
        };
        assert!(TraktClient::new(&config).is_ok());
    }
}
