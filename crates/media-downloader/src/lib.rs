//! Media downloader library.
//!
//! Reads the persisted Trakt JSON tree, resolves TMDB ids, downloads
//! poster/backdrop artwork (including per-season posters for shows), and
//! rebuilds a flat index of everything present on disk.

pub mod api;
pub mod downloader;
pub mod index;
pub mod items;

pub use api::TmdbClient;
pub use downloader::{DownloadStats, MediaDownloader};
pub use index::MediaIndex;
pub use items::{classify, MediaItem, MediaKind, SourceHint};
