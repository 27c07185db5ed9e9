//! Data models shared across the pipeline.
//!
//! Every persisted JSON document is wrapped with fetch metadata so
//! downstream consumers can tell when and for whom a snapshot was taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source tag recorded in every persisted document
pub const DOCUMENT_SOURCE: &str = "trakt_api_user_data";

/// Fetch metadata attached to every persisted document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchMetadata {
    /// When the snapshot was taken
    pub fetched_at: DateTime<Utc>,
    /// Data source tag
    pub source: String,
    /// Username the data belongs to
    pub username: String,
    /// Endpoint-relative path of the document
    pub endpoint: String,
    /// Item count: array length for sequences, 1 otherwise
    pub count: usize,
}

/// A persisted JSON document: raw API payload plus fetch metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub metadata: FetchMetadata,
    pub data: Value,
}

impl Document {
    /// Wrap a raw payload with fetch metadata
    ///
    /// `count` is the array length when the payload is a sequence, else 1.
    pub fn new(data: Value, username: &str, endpoint: &str) -> Self {
        let count = match &data {
            Value::Array(items) => items.len(),
            _ => 1,
        };

        Self {
            metadata: FetchMetadata {
                fetched_at: Utc::now(),
                source: DOCUMENT_SOURCE.to_string(),
                username: username.to_string(),
                endpoint: endpoint.to_string(),
                count,
            },
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_matches_array_length() {
        let doc = Document::new(json!([1, 2, 3]), "lrs", "user/history/movies.json");
        assert_eq!(doc.metadata.count, 3);
        assert_eq!(doc.metadata.source, DOCUMENT_SOURCE);
        assert_eq!(doc.metadata.username, "lrs");
    }

    #[test]
    fn test_count_is_one_for_objects() {
        let doc = Document::new(json!({"name": "lrs"}), "lrs", "user/profile/basic.json");
        assert_eq!(doc.metadata.count, 1);

        let doc = Document::new(json!(null), "lrs", "user/profile/basic.json");
        assert_eq!(doc.metadata.count, 1);
    }

    #[test]
    fn test_round_trips_through_json() {
        let doc = Document::new(json!([{"movie": {"title": "The Matrix"}}]), "lrs", "x.json");
        let text = serde_json::to_string_pretty(&doc).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back.metadata.count, 1);
        assert_eq!(back.data[0]["movie"]["title"], "The Matrix");
    }
}
