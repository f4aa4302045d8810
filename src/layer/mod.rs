//! Painting a [`RenderedLayout`] into a bitmap.
//!
//! # Architecture
//!
//! Each paint tier implements [`PaintLayer`]. The [`Painter`] walks the
//! layout's fixed paint order and lets every tier draw into a shared
//! [`PaintContext`]:
//!
//! ```text
//! ┌────────────┐
//! │ Background │ ◄── image (cover-fit) or placeholder
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │  Overlay   │ ◄── logo, title, badge pills and glyphs
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │   Frame    │ ◄── decorative border, always on top
//! └────────────┘
//! ```
//!
//! Background bitmaps come from a [`BackgroundDecoder`]. The live preview
//! uses [`CoverCache`], which reuses the bitmap decoded at upload time and
//! keeps scaled results; exports use [`FreshDecode`], which decodes the
//! original bytes on every capture.

pub mod background;
pub mod frame;
pub mod overlay;
pub mod svg;

pub use svg::{SvgRasterizer, SvgSource};

use std::collections::HashMap;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::config::MAX_EXPORT_EDGE;
use crate::error::{PaintError, PaintResult};
use crate::geometry::{CoverCrop, SizePx};
use crate::layout::{LayerKind, RenderedLayout};
use crate::upload::UploadedImage;

use background::BackgroundLayer;
use frame::FrameLayer;
use overlay::OverlayLayer;

// ============================================================================
// Paint Context
// ============================================================================

/// Mutable state handed from tier to tier while painting one layout.
pub struct PaintContext<'a> {
    /// The target bitmap, `canvas * ratio` pixels.
    pub canvas: RgbaImage,
    /// Physical pixels per logical pixel.
    pub ratio: u32,
    decoder: &'a mut dyn BackgroundDecoder,
}

impl<'a> PaintContext<'a> {
    pub fn new(size: SizePx, ratio: u32, decoder: &'a mut dyn BackgroundDecoder) -> Self {
        Self {
            canvas: RgbaImage::new(size.width, size.height),
            ratio,
            decoder,
        }
    }

    pub fn decoder(&mut self) -> &mut (dyn BackgroundDecoder + 'a) {
        &mut *self.decoder
    }
}

// ============================================================================
// Layer Traits
// ============================================================================

/// One paint tier.
pub trait PaintLayer {
    fn kind(&self) -> LayerKind;

    /// Draws this tier of `layout` on top of whatever is already in the
    /// context.
    fn paint(&self, layout: &RenderedLayout, ctx: &mut PaintContext<'_>) -> PaintResult<()>;
}

/// Supplies background bitmaps already cropped and scaled to cover a panel.
pub trait BackgroundDecoder: Send {
    fn cover_bitmap(
        &mut self,
        image: &UploadedImage,
        crop: CoverCrop,
        target: SizePx,
    ) -> PaintResult<Arc<RgbaImage>>;
}

/// Decodes the original bytes on every request. Nothing is cached.
#[derive(Debug, Default)]
pub struct FreshDecode;

impl BackgroundDecoder for FreshDecode {
    fn cover_bitmap(
        &mut self,
        image: &UploadedImage,
        crop: CoverCrop,
        target: SizePx,
    ) -> PaintResult<Arc<RgbaImage>> {
        let decoded = image
            .redecode()
            .map_err(|e| PaintError::ImageDecode(e.to_string()))?;
        Ok(Arc::new(scale_cover(&decoded, crop, target)?))
    }
}

// ============================================================================
// CacheKey
// ============================================================================

/// Key for cached cover bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    image_id: u64,
    crop: CoverCrop,
    target: SizePx,
}

/// Cover bitmaps for the live preview, built from the ingestion bitmap.
#[derive(Debug, Default)]
pub struct CoverCache {
    entries: HashMap<CacheKey, Arc<RgbaImage>>,
}

impl CoverCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries for every image except `keep`.
    pub fn retain_image(&mut self, keep: Option<u64>) {
        self.entries.retain(|key, _| Some(key.image_id) == keep);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl BackgroundDecoder for CoverCache {
    fn cover_bitmap(
        &mut self,
        image: &UploadedImage,
        crop: CoverCrop,
        target: SizePx,
    ) -> PaintResult<Arc<RgbaImage>> {
        let key = CacheKey {
            image_id: image.id(),
            crop,
            target,
        };
        if let Some(hit) = self.entries.get(&key) {
            tracing::debug!(image = image.id(), "cover cache hit");
            return Ok(Arc::clone(hit));
        }
        let scaled = Arc::new(scale_cover(image.decoded(), crop, target)?);
        self.entries.insert(key, Arc::clone(&scaled));
        Ok(scaled)
    }
}

/// Crops `source` to `crop` and resizes the result to exactly `target`.
pub fn scale_cover(source: &RgbaImage, crop: CoverCrop, target: SizePx) -> PaintResult<RgbaImage> {
    let fits = u64::from(crop.x) + u64::from(crop.width) <= u64::from(source.width())
        && u64::from(crop.y) + u64::from(crop.height) <= u64::from(source.height());
    if !fits || crop.width == 0 || crop.height == 0 {
        return Err(PaintError::ImageDecode(format!(
            "crop {}x{}+{}+{} outside {}x{} bitmap",
            crop.width,
            crop.height,
            crop.x,
            crop.y,
            source.width(),
            source.height()
        )));
    }
    let cropped = imageops::crop_imm(source, crop.x, crop.y, crop.width, crop.height).to_image();
    Ok(imageops::resize(&cropped, target.width, target.height, FilterType::Triangle))
}

// ============================================================================
// Painter
// ============================================================================

/// Paints layouts tier by tier.
#[derive(Debug, Clone)]
pub struct Painter {
    svg: SvgRasterizer,
}

impl Painter {
    pub fn new(svg: SvgRasterizer) -> Self {
        Self { svg }
    }

    /// Paints `layout` at `ratio` physical pixels per logical pixel.
    ///
    /// Every call allocates its own bitmap.
    pub fn paint(
        &self,
        layout: &RenderedLayout,
        ratio: u32,
        decoder: &mut dyn BackgroundDecoder,
    ) -> PaintResult<RgbaImage> {
        let size = layout.canvas.scaled(ratio);
        if size.is_empty() || size.width.max(size.height) > MAX_EXPORT_EDGE {
            return Err(PaintError::Allocation {
                width: size.width,
                height: size.height,
            });
        }

        let background = BackgroundLayer;
        let overlay = OverlayLayer::new(&self.svg);
        let frame = FrameLayer::new(&self.svg);

        let mut ctx = PaintContext::new(size, ratio, decoder);
        for kind in layout.paint_order() {
            let layer: &dyn PaintLayer = match kind {
                LayerKind::Background => &background,
                LayerKind::Overlay => &overlay,
                LayerKind::Frame => &frame,
            };
            debug_assert_eq!(layer.kind(), kind);
            layer.paint(layout, &mut ctx)?;
        }
        tracing::debug!(width = size.width, height = size.height, ratio, "layout painted");
        Ok(ctx.canvas)
    }
}

/// `#rrggbb` for an opaque pixel color.
pub(crate) fn hex(color: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::BadgeCatalog;
    use crate::color::AccentColor;
    use crate::config::ThumbnailConfig;
    use crate::layout::LayoutRenderer;
    use crate::state::{CompositionState, Message};
    use crate::upload::UploadFormat;

    fn painter() -> Painter {
        Painter::new(SvgRasterizer::new(false))
    }

    fn renderer() -> LayoutRenderer {
        LayoutRenderer::new(&ThumbnailConfig::default()).unwrap()
    }

    fn solid_image(id: u64, width: u32, height: u32, color: [u8; 4]) -> UploadedImage {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        UploadedImage::from_parts(id, UploadFormat::Png, buf.into_inner(), img)
    }

    #[test]
    fn placeholder_fills_canvas_at_ratio() {
        let layout = renderer().render(&CompositionState::new());
        let bitmap = painter().paint(&layout, 3, &mut FreshDecode).unwrap();
        assert_eq!(bitmap.dimensions(), (1440, 768));
        assert_eq!(bitmap.get_pixel(720, 384).0, [243, 244, 246, 255]);
    }

    #[test]
    fn frame_is_painted_over_background() {
        let state = CompositionState::new().apply(Message::SetBackground(solid_image(
            1,
            64,
            32,
            [255, 0, 0, 255],
        )));
        let layout = renderer().render(&state);
        let bitmap = painter().paint(&layout, 2, &mut FreshDecode).unwrap();
        // Middle of the top edge lies under the frame stroke.
        let edge = bitmap.get_pixel(480, 0);
        assert_ne!(edge.0, [255, 0, 0, 255]);
        assert_eq!(bitmap.get_pixel(480, 256).0, [255, 0, 0, 255]);
    }

    #[test]
    fn badge_pills_use_contrasting_fill() {
        let catalog = BadgeCatalog::builtin();
        let state = CompositionState::new()
            .apply(Message::ToggleBadge(catalog.get("Go").unwrap().clone()))
            .apply(Message::SetAccent(AccentColor::Black));
        let layout = renderer().render(&state);
        let row = layout.badge_row.clone().unwrap();
        let bitmap = painter().paint(&layout, 2, &mut FreshDecode).unwrap();

        // No fonts are loaded, so the label area shows bare pill fill.
        let slot = &row.slots[0];
        let x = (slot.label_x + 2) as u32 * 2;
        let y = (slot.rect.y + slot.rect.height as i32 / 2) as u32 * 2;
        assert_eq!(bitmap.get_pixel(x, y).0, row.fill.0);
    }

    #[test]
    fn corrupt_background_fails_capture_with_fresh_decode() {
        let good = solid_image(7, 16, 16, [0, 0, 255, 255]);
        let broken = UploadedImage::from_parts(
            7,
            UploadFormat::Png,
            good.encoded_bytes()[..20].to_vec(),
            good.decoded().as_ref().clone(),
        );
        let layout = renderer().render(&CompositionState::new().apply(Message::SetBackground(broken)));

        // The cached path trusts the ingestion bitmap...
        assert!(painter().paint(&layout, 1, &mut CoverCache::default()).is_ok());
        // ...the export path decodes again and notices.
        let err = painter().paint(&layout, 3, &mut FreshDecode).unwrap_err();
        assert!(matches!(err, PaintError::ImageDecode(_)));
    }

    #[test]
    fn oversized_target_is_refused_before_allocating() {
        let layout = renderer().render(&CompositionState::new());
        let err = painter().paint(&layout, u32::MAX, &mut FreshDecode).unwrap_err();
        assert!(matches!(
            err,
            PaintError::Allocation { width: u32::MAX, height: u32::MAX }
        ));
    }

    #[test]
    fn cover_cache_reuses_scaled_bitmaps() {
        let image = solid_image(3, 32, 32, [0, 255, 0, 255]);
        let crop = CoverCrop::compute(image.dimensions(), SizePx::new(64, 32));
        let mut cache = CoverCache::default();
        let first = cache.cover_bitmap(&image, crop, SizePx::new(64, 32)).unwrap();
        let second = cache.cover_bitmap(&image, crop, SizePx::new(64, 32)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.retain_image(Some(99));
        assert!(cache.is_empty());
    }

    #[test]
    fn scale_cover_rejects_out_of_bounds_crop() {
        let source = RgbaImage::new(10, 10);
        let crop = CoverCrop {
            x: 5,
            y: 0,
            width: 10,
            height: 10,
        };
        assert!(scale_cover(&source, crop, SizePx::new(4, 4)).is_err());
    }

    #[test]
    fn hex_formats_rgb() {
        assert_eq!(hex(Rgba([255, 16, 0, 255])), "#ff1000");
    }
}
