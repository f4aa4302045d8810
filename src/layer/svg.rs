//! SVG rasterization shared by the overlay and frame layers.
//!
//! Overlays are described as SVG markup in logical coordinates and
//! rasterized with resvg at the target pixel ratio.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};

use crate::error::{PaintError, PaintResult};

// ============================================================================
// SvgSource
// ============================================================================

/// A source for SVG data, used for badge glyphs and the logo.
///
/// - Raw SVG markup strings
/// - Emoji characters (when the `twemoji` feature is enabled)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SvgSource {
    /// Raw SVG markup string.
    Raw(String),

    /// An emoji character resolved via twemoji_assets at render time.
    Emoji(String),
}

impl SvgSource {
    /// Creates a source from raw SVG markup.
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self::Raw(svg.into())
    }

    /// Creates a source from an emoji character.
    ///
    /// Returns `None` if the emoji is not supported by twemoji_assets.
    #[cfg(feature = "twemoji")]
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        use twemoji_assets::svg::SvgTwemojiAsset;

        SvgTwemojiAsset::from_emoji(emoji)?;
        Some(Self::Emoji(emoji.to_string()))
    }

    /// Resolves this source to SVG markup.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            Self::Raw(svg) => Some(svg.as_str()),
            #[cfg(feature = "twemoji")]
            Self::Emoji(emoji) => {
                use twemoji_assets::svg::SvgTwemojiAsset;
                let asset = SvgTwemojiAsset::from_emoji(emoji)?;
                Some(asset.as_ref())
            }
            #[cfg(not(feature = "twemoji"))]
            Self::Emoji(_) => None,
        }
    }

    /// Emoji keep their own colors; raw glyphs are recolored.
    pub fn is_emoji(&self) -> bool {
        matches!(self, Self::Emoji(_))
    }
}

impl<S: Into<String>> From<S> for SvgSource {
    fn from(s: S) -> Self {
        Self::Raw(s.into())
    }
}

// ============================================================================
// SvgRasterizer
// ============================================================================

/// Parses and rasterizes SVG markup against a shared font database.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl SvgRasterizer {
    /// Creates a rasterizer, optionally loading the host's fonts.
    pub fn new(load_system_fonts: bool) -> Self {
        let mut db = fontdb::Database::new();
        if load_system_fonts {
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
        }
        Self {
            fontdb: Arc::new(db),
        }
    }

    fn options(&self) -> Options<'static> {
        let mut opts = Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);
        opts
    }

    /// Rasterizes a full SVG document, scaling its user units by `ratio`.
    ///
    /// The output is exactly `size` pixels regardless of the document's
    /// declared dimensions.
    pub fn rasterize(&self, svg: &str, width: u32, height: u32, ratio: u32) -> PaintResult<RgbaImage> {
        let tree = Tree::from_str(svg, &self.options()).map_err(|e| PaintError::Svg(e.to_string()))?;
        let mut pixmap = Pixmap::new(width, height).ok_or(PaintError::Allocation { width, height })?;
        let scale = ratio as f32;
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
        Ok(pixmap_to_rgba_image(&pixmap))
    }

    /// Renders a glyph so that it fits within `size x size` pixels,
    /// preserving aspect ratio. Raw glyphs are recolored with `fill`.
    ///
    /// Returns `None` if the source cannot be resolved or parsed; a broken
    /// glyph is skipped rather than failing the whole capture.
    pub fn render_glyph(&self, source: &SvgSource, size: u32, fill: Option<&str>) -> Option<RgbaImage> {
        let markup = source.resolve()?;
        let markup = match fill {
            Some(color) if !source.is_emoji() => replace_svg_colors(markup, color),
            _ => markup.to_string(),
        };

        let tree = Tree::from_str(&markup, &self.options()).ok()?;
        let svg_size = tree.size();
        let scale = size as f32 / svg_size.width().max(svg_size.height());
        let width = (svg_size.width() * scale).ceil() as u32;
        let height = (svg_size.height() * scale).ceil() as u32;

        let mut pixmap = Pixmap::new(width, height)?;
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
        Some(pixmap_to_rgba_image(&pixmap))
    }
}

/// Replaces fill and stroke colors in SVG markup, keeping `none` and
/// `transparent`.
fn replace_svg_colors(svg_data: &str, hex_color: &str) -> String {
    let recolored = replace_color_attr(svg_data, "fill", hex_color);
    replace_color_attr(&recolored, "stroke", hex_color)
}

fn replace_color_attr(svg: &str, attr: &str, new_color: &str) -> String {
    let mut result = String::with_capacity(svg.len());
    let pattern = format!("{attr}=\"");
    let mut remaining = svg;

    while let Some(start) = remaining.find(&pattern) {
        // Skip matches inside longer names such as `fill-opacity="`.
        let preceded_by_name = remaining[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-');
        result.push_str(&remaining[..start + pattern.len()]);
        remaining = &remaining[start + pattern.len()..];

        let Some(end) = remaining.find('"') else {
            break;
        };
        let value = &remaining[..end];
        if preceded_by_name || value == "none" || value == "transparent" {
            result.push_str(value);
        } else {
            result.push_str(new_color);
        }
        remaining = &remaining[end..];
    }

    result.push_str(remaining);
    result
}

/// Converts a premultiplied tiny_skia pixmap into straight-alpha RGBA.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Composites `src` onto `dest` at `(x, y)` with source-over blending.
/// Pixels falling outside `dest` are dropped.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    image::imageops::overlay(dest, src, x, y);
}

/// Escapes text for use inside SVG markup.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================
