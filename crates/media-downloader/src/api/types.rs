//! TMDB API v3 response types.
//!
//! Only the fields the downloader actually consumes are modeled; every
//! field is defaulted so unexpected payloads degrade to "nothing to
//! download" instead of a parse failure.

use serde::{Deserialize, Serialize};

/// One image record from an images endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Response of `/movie/{id}/images` and `/tv/{id}/images`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageList {
    #[serde(default)]
    pub posters: Vec<ImageRecord>,
    #[serde(default)]
    pub backdrops: Vec<ImageRecord>,
}

/// Season descriptor from `/tv/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonRecord {
    #[serde(default)]
    pub season_number: Option<i64>,
}

/// Response of `/tv/{id}`, trimmed to season data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvDetails {
    #[serde(default)]
    pub seasons: Vec<SeasonRecord>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
}

/// Response of `/tv/{id}/season/{n}/images`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonImages {
    #[serde(default)]
    pub posters: Vec<ImageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_list_parses_tmdb_shape() {
        let list: ImageList = serde_json::from_value(json!({
            "id": 603,
            "posters": [{"file_path": "/abc.jpg", "width": 2000}],
            "backdrops": []
        }))
        .unwrap();

        assert_eq!(list.posters.len(), 1);
        assert_eq!(list.posters[0].file_path.as_deref(), Some("/abc.jpg"));
        assert!(list.backdrops.is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let list: ImageList = serde_json::from_value(json!({"id": 603})).unwrap();
        assert!(list.posters.is_empty());

        let details: TvDetails = serde_json::from_value(json!({"name": "Dark"})).unwrap();
        assert!(details.seasons.is_empty());
    }
}
