//! Classification of heterogeneous Trakt JSON items.
//!
//! The persisted documents mix three item shapes: wrapper objects
//! (`{"movie": {...}}` / `{"show": {...}}`), typed entries
//! (`{"type": "movie", ...}`), and bare id bundles (`{"ids": {...}}`)
//! whose kind is only known from the source filename. This module models
//! that as a tagged union with the detection rules evaluated in a fixed
//! priority order.

use serde_json::Value;
use std::path::Path;

/// Media kind of a classified item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Show,
}

/// Kind hint sniffed from the source filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHint {
    Movies,
    Shows,
    Unknown,
}

impl SourceHint {
    /// Sniff a hint from a source path ("movie"/"show" substring)
    pub fn from_path(path: &Path) -> Self {
        let name = path.to_string_lossy().to_lowercase();
        if name.contains("movie") {
            SourceHint::Movies
        } else if name.contains("show") {
            SourceHint::Shows
        } else {
            SourceHint::Unknown
        }
    }
}

/// A classified item ready for artwork download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub tmdb: u64,
}

/// Classify one JSON item, returning `None` when kind or id is unresolvable
///
/// Detection priority:
/// 1. `movie` / `show` wrapper key
/// 2. explicit `type` field
/// 3. bare `ids` bundle plus the filename hint
pub fn classify(item: &Value, hint: SourceHint) -> Option<MediaItem> {
    let kind = detect_kind(item, hint)?;

    let wrapper = match kind {
        MediaKind::Movie => "movie",
        MediaKind::Show => "show",
    };
    let tmdb = extract_tmdb(item, wrapper)?;

    Some(MediaItem { kind, tmdb })
}

fn detect_kind(item: &Value, hint: SourceHint) -> Option<MediaKind> {
    if item.get("movie").map_or(false, Value::is_object) {
        return Some(MediaKind::Movie);
    }
    if item.get("show").map_or(false, Value::is_object) {
        return Some(MediaKind::Show);
    }

    match item.get("type").and_then(Value::as_str) {
        Some("movie") => return Some(MediaKind::Movie),
        Some("show") => return Some(MediaKind::Show),
        _ => {}
    }

    if item.get("ids").is_some() {
        return match hint {
            SourceHint::Movies => Some(MediaKind::Movie),
            SourceHint::Shows => Some(MediaKind::Show),
            SourceHint::Unknown => None,
        };
    }

    None
}

/// Extract the numeric TMDB id from one of the three known nesting shapes
fn extract_tmdb(item: &Value, wrapper: &str) -> Option<u64> {
    if let Some(id) = item
        .get(wrapper)
        .and_then(|inner| inner.get("ids"))
        .and_then(|ids| ids.get("tmdb"))
        .and_then(Value::as_u64)
    {
        return Some(id);
    }

    if let Some(id) = item
        .get("ids")
        .and_then(|ids| ids.get("tmdb"))
        .and_then(Value::as_u64)
    {
        return Some(id);
    }

    item.get("tmdb").and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_wrapper_key_wins() {
        let item = json!({"movie": {"ids": {"tmdb": 603}}});
        assert_eq!(
            classify(&item, SourceHint::Unknown),
            Some(MediaItem {
                kind: MediaKind::Movie,
                tmdb: 603
            })
        );

        let item = json!({"show": {"ids": {"tmdb": 1396}}});
        assert_eq!(
            classify(&item, SourceHint::Movies).unwrap().kind,
            MediaKind::Show
        );
    }

    #[test]
    fn test_type_field() {
        let item = json!({"type": "show", "ids": {"tmdb": 1396}});
        assert_eq!(
            classify(&item, SourceHint::Unknown),
            Some(MediaItem {
                kind: MediaKind::Show,
                tmdb: 1396
            })
        );
    }

    #[test]
    fn test_bare_ids_need_a_hint() {
        let item = json!({"ids": {"tmdb": 603}});
        assert_eq!(
            classify(&item, SourceHint::Movies).unwrap().kind,
            MediaKind::Movie
        );
        assert_eq!(
            classify(&item, SourceHint::Shows).unwrap().kind,
            MediaKind::Show
        );
        assert_eq!(classify(&item, SourceHint::Unknown), None);
    }

    #[test]
    fn test_missing_tmdb_id_is_none() {
        let item = json!({"movie": {"ids": {"trakt": 481, "imdb": "tt0133093"}}});
        assert_eq!(classify(&item, SourceHint::Unknown), None);
    }

    #[test]
    fn test_flat_tmdb_fallback() {
        let item = json!({"type": "movie", "tmdb": 603});
        assert_eq!(classify(&item, SourceHint::Unknown).unwrap().tmdb, 603);
    }

    #[test]
    fn test_source_hint_from_path() {
        assert_eq!(
            SourceHint::from_path(&PathBuf::from("user/watched/movies.json")),
            SourceHint::Movies
        );
        assert_eq!(
            SourceHint::from_path(&PathBuf::from("user/history/shows.json")),
            SourceHint::Shows
        );
        assert_eq!(
            SourceHint::from_path(&PathBuf::from("user/watchlist/all.json")),
            SourceHint::Unknown
        );
    }
}
