//! Cover generator library.
//!
//! Selects the most recently watched movies and shows, lays their posters
//! out on a fixed 2x10 grid with an alternating type pattern, and renders
//! the composite cover image plus its JSON manifest.

pub mod compositor;
pub mod runner;
pub mod selection;

pub use compositor::{assign_cells, CellKind, Compositor, PATTERN};
pub use runner::CoverStats;
pub use selection::{select_movies, select_shows, CoverMovie, CoverSelection, CoverShow};
