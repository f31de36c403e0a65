// THEORY:
// The grid renderer is the display layer. It owns two concerns:
//
// 1.  **Layout** (`GridLayout`): given N images and a requested number of rows R,
//     the column count is the true ceiling of N / R. Images are then assigned
//     to cells in row-major order, index `i` landing at
//     `(i / cols, i % cols)`. Nothing about pixels lives here, so the layout
//     rules are testable on their own.
// 2.  **Composition** (`GridRenderer`): a white canvas sized from a figure size
//     in inches at a fixed DPI is split into equal cells. Each image is scaled
//     to fit its cell (aspect preserved, centred) with no axes or borders, and
//     an optional title is drawn in a band above it.
//
// Titles need a real font. The renderer never ships one; a caller that wants
// titles supplies a TrueType/OpenType file. Without it the titles are skipped
// and the images still render.

use crate::core_modules::utils::image_helper;
use crate::error::{Error, Result};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use std::path::Path;

/// Points per inch, used to convert a title font size to pixels.
const POINTS_PER_INCH: f32 = 72.0;
/// Title band height relative to the title's pixel size.
const TITLE_BAND_RATIO: f32 = 1.4;
/// Largest canvas side, in pixels. Keeps every coordinate within `i32`.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Row-major placement of `count` items into `rows` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    count: usize,
    rows: usize,
    cols: usize,
}

impl GridLayout {
    pub fn new(count: usize, rows: usize) -> Result<Self> {
        if rows == 0 {
            return Err(Error::invalid("rows", "must be at least 1"));
        }
        if count == 0 {
            return Err(Error::invalid("images", "nothing to lay out"));
        }
        Ok(Self {
            count,
            rows,
            cols: count.div_ceil(rows),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The `(row, col)` cell of the item at `index`, or `None` past the end.
    pub fn position(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.count).then(|| (index / self.cols, index % self.cols))
    }

    /// `(index, row, col)` for every item, in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize, usize)> + use<> {
        let cols = self.cols;
        (0..self.count).map(move |i| (i, i / cols, i % cols))
    }
}

/// Tunable behavior for the grid renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Figure size in inches as (width, height).
    pub figsize: (f32, f32),
    /// Pixels per inch of the output canvas.
    pub dpi: f32,
    /// Scale cells with a bilinear filter instead of nearest-neighbour.
    pub interpolate: bool,
    /// Title size in points.
    pub title_font_size: f32,
    /// Inner margin of each cell, in pixels.
    pub cell_padding: u32,
    pub background: Rgb<u8>,
    pub title_color: Rgb<u8>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            figsize: (12.0, 6.0),
            dpi: 100.0,
            interpolate: false,
            title_font_size: 16.0,
            cell_padding: 8,
            background: Rgb([255, 255, 255]),
            title_color: Rgb([0, 0, 0]),
        }
    }
}

impl RenderConfig {
    /// Canvas dimensions in pixels.
    pub fn canvas_size(&self) -> Result<(u32, u32)> {
        let (w_in, h_in) = self.figsize;
        let width = (w_in * self.dpi).round();
        let height = (h_in * self.dpi).round();
        let side = 1.0..=MAX_CANVAS_SIDE as f32;
        if !(side.contains(&width) && side.contains(&height)) {
            return Err(Error::invalid(
                "figsize",
                format!(
                    "{w_in}x{h_in} in at {} dpi is not a drawable canvas (1..={MAX_CANVAS_SIDE} px per side)",
                    self.dpi
                ),
            ));
        }
        Ok((width as u32, height as u32))
    }

    fn title_px(&self) -> f32 {
        self.title_font_size * self.dpi / POINTS_PER_INCH
    }

    fn filter(&self) -> FilterType {
        if self.interpolate {
            FilterType::Triangle
        } else {
            FilterType::Nearest
        }
    }
}

/// Composes images into a grid figure.
pub struct GridRenderer {
    config: RenderConfig,
    font: Option<FontVec>,
}

impl GridRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.canvas_size()?;
        Ok(Self { config, font: None })
    }

    /// Loads the font used for cell titles.
    pub fn with_font_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::FontLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| Error::InvalidFont {
            path: path.to_path_buf(),
        })?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Lays `images` out in `rows` rows and composes them onto one canvas.
    pub fn render(&self, images: &[RgbImage], titles: Option<&[String]>, rows: usize) -> Result<RgbImage> {
        let layout = GridLayout::new(images.len(), rows)?;
        if let Some(titles) = titles {
            if titles.len() != images.len() {
                return Err(Error::invalid(
                    "titles",
                    format!("{} titles for {} images", titles.len(), images.len()),
                ));
            }
        }

        let (canvas_w, canvas_h) = self.config.canvas_size()?;
        let cell_w = canvas_w / layout.cols() as u32;
        let cell_h = canvas_h / layout.rows() as u32;
        if cell_w == 0 || cell_h == 0 {
            return Err(Error::invalid(
                "figsize",
                format!("{canvas_w}x{canvas_h} px cannot hold a {}x{} grid", layout.rows(), layout.cols()),
            ));
        }

        let titled = match (titles, &self.font) {
            (Some(titles), Some(font)) => Some((titles, font)),
            (Some(_), None) => {
                tracing::warn!("titles requested but no font loaded, rendering without titles");
                None
            }
            (None, _) => None,
        };
        let title_px = self.config.title_px();
        let band = if titled.is_some() {
            (title_px * TITLE_BAND_RATIO).ceil() as u32
        } else {
            0
        };
        let pad = self.config.cell_padding;
        let avail_w = cell_w.saturating_sub(2 * pad);
        let avail_h = cell_h.saturating_sub(band + 2 * pad);

        let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, self.config.background);

        for (index, row, col) in layout.positions() {
            let x0 = col as u32 * cell_w;
            let y0 = row as u32 * cell_h;

            if let Some((titles, font)) = titled {
                let text = titles[index].as_str();
                let scale = PxScale::from(title_px);
                let text_w = text_width(font, scale, text).ceil() as u32;
                let x = x0 + cell_w.saturating_sub(text_w) / 2;
                let y = y0 + pad.min(cell_h) / 2;
                imageproc::drawing::draw_text_mut(
                    &mut canvas,
                    self.config.title_color,
                    x as i32,
                    y as i32,
                    scale,
                    font,
                    text,
                );
            }

            let image = &images[index];
            let (img_w, img_h) = image.dimensions();
            if avail_w == 0 || avail_h == 0 || img_w == 0 || img_h == 0 {
                continue;
            }
            let scale = (avail_w as f32 / img_w as f32).min(avail_h as f32 / img_h as f32);
            let target_w = ((img_w as f32 * scale).round() as u32).clamp(1, avail_w);
            let target_h = ((img_h as f32 * scale).round() as u32).clamp(1, avail_h);
            let resized = imageops::resize(image, target_w, target_h, self.config.filter());

            let x = x0 + pad + (avail_w - target_w) / 2;
            let y = y0 + band + pad + (avail_h - target_h) / 2;
            imageops::replace(&mut canvas, &resized, i64::from(x), i64::from(y));
        }

        Ok(canvas)
    }

    /// Renders the grid and writes it to `path`.
    pub fn render_to_file<P: AsRef<Path>>(
        &self,
        images: &[RgbImage],
        titles: Option<&[String]>,
        rows: usize,
        path: P,
    ) -> Result<()> {
        let figure = self.render(images, titles, rows)?;
        image_helper::save(path.as_ref(), &figure)?;
        tracing::info!(
            path = %path.as_ref().display(),
            width = figure.width(),
            height = figure.height(),
            images = images.len(),
            "wrote figure"
        );
        Ok(())
    }
}

fn text_width(font: &FontVec, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    text.chars().map(|c| scaled.h_advance(scaled.glyph_id(c))).sum()
}
