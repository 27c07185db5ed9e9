//! Cover layout and rendering.
//!
//! The canvas is a 2x10 grid filled by a fixed repeating type pattern
//! (3 movies, 2 shows, 2 movies, 3 shows, twice over). Cell assignment is
//! greedy and order-preserving: next unused of the required kind, then
//! next unused of the other kind, then the first item of the required kind
//! again once both pools are spent.

use crate::selection::CoverSelection;
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use shared::config::CoverConfig;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Required kind of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Movie,
    Show,
}

/// The fixed 20-slot pattern: 3 movies, 2 shows, 2 movies, 3 shows, twice
pub const PATTERN: [CellKind; 20] = {
    use CellKind::{Movie as M, Show as S};
    [
        M, M, M, S, S, M, M, S, S, S, //
        M, M, M, S, S, M, M, S, S, S,
    ]
};

/// Assign a poster URL to each of the 20 cells
///
/// Consumption is at most once per item and kind, with no backtracking;
/// an exhausted kind falls back to the other pool, and when both are
/// spent the first item of the required kind is repeated. A cell is
/// `None` only when the required pool never had an item to repeat.
pub fn assign_cells<'a>(movies: &'a [String], shows: &'a [String]) -> Vec<Option<&'a str>> {
    let mut cells = Vec::with_capacity(PATTERN.len());
    let mut movie_index = 0;
    let mut show_index = 0;

    for kind in PATTERN {
        let url = match kind {
            CellKind::Movie => {
                if movie_index < movies.len() {
                    movie_index += 1;
                    Some(movies[movie_index - 1].as_str())
                } else if show_index < shows.len() {
                    show_index += 1;
                    Some(shows[show_index - 1].as_str())
                } else {
                    movies.first().map(String::as_str)
                }
            }
            CellKind::Show => {
                if show_index < shows.len() {
                    show_index += 1;
                    Some(shows[show_index - 1].as_str())
                } else if movie_index < movies.len() {
                    movie_index += 1;
                    Some(movies[movie_index - 1].as_str())
                } else {
                    shows.first().map(String::as_str)
                }
            }
        };
        cells.push(url);
    }

    cells
}

/// Cover renderer
pub struct Compositor {
    client: reqwest::Client,
    width: u32,
    height: u32,
    columns: u32,
    rows: u32,
    jpeg_quality: u8,
}

impl Compositor {
    /// Create a new compositor
    pub fn new(config: &CoverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .user_agent("trakt-sync/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            width: config.width,
            height: config.height,
            columns: config.columns,
            rows: config.rows,
            jpeg_quality: config.jpeg_quality,
        })
    }

    /// Cell dimensions, integer division of the canvas by the grid
    ///
    /// Right/bottom edge pixels left over by the division stay background.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.width / self.columns, self.height / self.rows)
    }

    /// Render the cover image and write it to `output`
    ///
    /// Returns the number of posters successfully composited. A failed
    /// download or decode leaves that cell as background; zero successes
    /// replace the whole canvas with a horizontal gradient placeholder.
    pub async fn render(&self, selection: &CoverSelection, output: &Path) -> Result<usize> {
        let movie_urls: Vec<String> = selection
            .movies
            .iter()
            .map(|m| m.poster_url.clone())
            .collect();
        let show_urls: Vec<String> = selection
            .shows
            .iter()
            .map(|s| s.poster_url.clone())
            .collect();

        let cells = assign_cells(&movie_urls, &show_urls);
        let (cell_width, cell_height) = self.cell_size();

        info!(
            movies = movie_urls.len(),
            shows = show_urls.len(),
            cell_width = cell_width,
            cell_height = cell_height,
            "Rendering cover"
        );

        let mut canvas = RgbImage::new(self.width, self.height);
        let mut successful = 0usize;

        for (i, cell) in cells.iter().enumerate() {
            let Some(url) = cell else {
                debug!(cell = i, "No poster available for cell");
                continue;
            };

            let x = (i as u32 % self.columns) * cell_width;
            let y = (i as u32 / self.columns) * cell_height;

            match self.fetch_poster(url).await {
                Ok(poster) => {
                    // Non-aspect-preserving stretch to the exact cell size
                    let tile = poster.resize_exact(cell_width, cell_height, FilterType::Lanczos3);
                    imageops::replace(&mut canvas, &tile.to_rgb8(), x as i64, y as i64);
                    successful += 1;
                    debug!(cell = i, x = x, y = y, url = %url, "Poster placed");
                }
                Err(e) => {
                    warn!(cell = i, url = %url, error = %e, "Poster unavailable, leaving background");
                }
            }
        }

        if successful == 0 {
            warn!("No posters downloaded, rendering gradient placeholder");
            fill_gradient(&mut canvas);
        }

        self.save_jpeg(&canvas, output)?;
        info!(output = %output.display(), posters = successful, "Cover image saved");

        Ok(successful)
    }

    /// Download and decode one poster
    async fn fetch_poster(&self, url: &str) -> Result<image::DynamicImage> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad status downloading {}", url))?
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        image::load_from_memory(&bytes).with_context(|| format!("Failed to decode {}", url))
    }

    /// Encode the canvas as JPEG at the configured quality
    fn save_jpeg(&self, canvas: &RgbImage, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let file = File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let writer = BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(writer, self.jpeg_quality);

        encoder
            .encode_image(canvas)
            .with_context(|| format!("Failed to encode {}", output.display()))?;

        Ok(())
    }
}

/// Fill the canvas with the placeholder gradient
///
/// Intensity grows with the x position only, so any row reads as a
/// left-to-right brightness ramp rather than a blank image.
pub fn fill_gradient(canvas: &mut RgbImage) {
    let width = canvas.width();
    for (x, _, pixel) in canvas.enumerate_pixels_mut() {
        let intensity = ((x as f32 / width as f32) * 50.0 + 20.0) as u8;
        *pixel = image::Rgb([intensity, intensity, intensity]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_pattern_shape() {
        assert_eq!(PATTERN.len(), 20);

        let movies = PATTERN.iter().filter(|k| **k == CellKind::Movie).count();
        let shows = PATTERN.iter().filter(|k| **k == CellKind::Show).count();
        assert_eq!(movies, 10);
        assert_eq!(shows, 10);

        // Block sizes 3,2,2,3 repeated twice
        use CellKind::{Movie as M, Show as S};
        assert_eq!(
            PATTERN[..10],
            [M, M, M, S, S, M, M, S, S, S],
            "first half"
        );
        assert_eq!(PATTERN[..10], PATTERN[10..], "second half repeats");
    }

    #[test]
    fn test_full_pools_place_each_item_once() {
        let movies = urls("m", 10);
        let shows = urls("s", 10);

        let cells = assign_cells(&movies, &shows);
        assert_eq!(cells.len(), 20);

        let mut seen: Vec<&str> = cells.iter().map(|c| c.unwrap()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20, "no item placed twice");

        // Pattern order is respected: first three cells are movies in order
        assert_eq!(cells[0], Some("m0"));
        assert_eq!(cells[1], Some("m1"));
        assert_eq!(cells[2], Some("m2"));
        assert_eq!(cells[3], Some("s0"));
    }

    #[test]
    fn test_exhausted_movies_fall_back_to_shows() {
        let movies = urls("m", 2);
        let shows = urls("s", 10);

        let cells = assign_cells(&movies, &shows);
        // Cells 0 and 1 take the two movies, cell 2 falls back to a show
        assert_eq!(cells[0], Some("m0"));
        assert_eq!(cells[1], Some("m1"));
        assert_eq!(cells[2], Some("s0"));
    }

    #[test]
    fn test_both_exhausted_repeats_first_of_required_kind() {
        let movies = urls("m", 1);
        let shows = urls("s", 1);

        let cells = assign_cells(&movies, &shows);
        // Pools spent after the first two movie cells; everything after
        // repeats the first item of the required kind
        assert_eq!(cells[0], Some("m0"));
        assert_eq!(cells[1], Some("s0"));
        for (i, cell) in cells.iter().enumerate().skip(2) {
            let expected = match PATTERN[i] {
                CellKind::Movie => "m0",
                CellKind::Show => "s0",
            };
            assert_eq!(*cell, Some(expected), "cell {}", i);
        }
    }

    #[test]
    fn test_empty_pools_leave_cells_unassigned() {
        let cells = assign_cells(&[], &[]);
        assert!(cells.iter().all(Option::is_none));
    }

    #[test]
    fn test_one_sided_pool() {
        let movies = urls("m", 10);
        let cells = assign_cells(&movies, &[]);

        // Show cells consume the movies in order until the pool is spent
        assert_eq!(cells[3], Some("m3"));
        assert_eq!(cells[9], Some("m9"));

        // After that, movie cells repeat m0 but show cells have nothing
        // of their required kind to repeat and stay background
        for (i, cell) in cells.iter().enumerate().skip(10) {
            match PATTERN[i] {
                CellKind::Movie => assert_eq!(*cell, Some("m0"), "cell {}", i),
                CellKind::Show => assert_eq!(*cell, None, "cell {}", i),
            }
        }
    }

    #[test]
    fn test_cell_size_integer_division() {
        let compositor = Compositor::new(&CoverConfig::default()).unwrap();
        assert_eq!(compositor.cell_size(), (89, 136));
    }

    #[test]
    fn test_gradient_is_non_decreasing() {
        let mut canvas = RgbImage::new(896, 272);
        fill_gradient(&mut canvas);

        let mut last = 0u8;
        for x in 0..896 {
            let intensity = canvas.get_pixel(x, 0)[0];
            assert!(intensity >= last, "intensity dips at x={}", x);
            last = intensity;
        }
        // Ramp actually rises from the base level
        assert_eq!(canvas.get_pixel(0, 0)[0], 20);
        assert!(canvas.get_pixel(895, 0)[0] > 60);
    }

    #[tokio::test]
    async fn test_empty_selection_renders_gradient_cover() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        let output = temp.path().join("cover.jpg");

        let compositor = Compositor::new(&CoverConfig::default())?;
        let successful = compositor.render(&CoverSelection::default(), &output).await?;

        assert_eq!(successful, 0);

        let cover = image::open(&output)?.to_rgb8();
        assert_eq!(cover.dimensions(), (896, 272));
        // Placeholder gradient, not a black frame
        assert!(cover.get_pixel(895, 0)[0] > cover.get_pixel(0, 0)[0]);
        Ok(())
    }
}
