//! The live preview surface.
//!
//! Holds the most recently presented layout and a lazily painted 1x bitmap
//! of it. Background bitmaps are served from a [`CoverCache`] built on the
//! image decoded at upload time, so retyping the title does not rescale
//! the background.

use std::sync::Arc;

use image::RgbaImage;

use crate::error::PaintResult;
use crate::layer::{CoverCache, Painter};
use crate::layout::{BackgroundFill, RenderedLayout};

/// Where the composer presents layouts and where exports capture from.
#[derive(Debug)]
pub struct PreviewSurface {
    painter: Painter,
    current: Option<Arc<RenderedLayout>>,
    bitmap: Option<RgbaImage>,
    cache: CoverCache,
}

impl PreviewSurface {
    pub fn new(painter: Painter) -> Self {
        Self {
            painter,
            current: None,
            bitmap: None,
            cache: CoverCache::default(),
        }
    }

    /// Replaces the presented layout. The bitmap is repainted on next use.
    ///
    /// Accepts an owned layout or one already shared behind an [`Arc`].
    pub fn present(&mut self, layout: impl Into<Arc<RenderedLayout>>) {
        let layout = layout.into();
        let keep = match &layout.background.fill {
            BackgroundFill::Image { image, .. } => Some(image.id()),
            BackgroundFill::Placeholder(_) => None,
        };
        self.cache.retain_image(keep);
        self.current = Some(layout);
        self.bitmap = None;
    }

    /// A snapshot of the presented layout, if any.
    ///
    /// Later calls to [`present`](Self::present) do not affect the
    /// returned snapshot.
    pub fn current(&self) -> Option<Arc<RenderedLayout>> {
        self.current.clone()
    }

    pub fn has_layout(&self) -> bool {
        self.current.is_some()
    }

    pub fn painter(&self) -> &Painter {
        &self.painter
    }

    /// The presented layout painted at 1x, or `None` before the first
    /// [`present`](Self::present).
    pub fn bitmap(&mut self) -> PaintResult<Option<&RgbaImage>> {
        let Some(layout) = self.current.clone() else {
            return Ok(None);
        };
        if self.bitmap.is_none() {
            let painted = self.painter.paint(&layout, 1, &mut self.cache)?;
            self.bitmap = Some(painted);
        } else {
            tracing::trace!("preview bitmap reused");
        }
        Ok(self.bitmap.as_ref())
    }

    /// Number of cached background bitmaps.
    pub fn cached_backgrounds(&self) -> usize {
        self.cache.len()
    }
}
