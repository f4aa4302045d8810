//! Pixel geometry shared by the layout and the painters.
//!
//! Layout coordinates are logical pixels. Painters multiply them by an
//! integer pixel ratio, so scaled rectangles stay exact.

/// A rectangle in logical pixel coordinates.
///
/// The origin may be negative: a badge row wider than the canvas is
/// centered and then clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RectPx {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl RectPx {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle starting at origin (0, 0) with the given dimensions.
    pub fn from_size(size: SizePx) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }

    /// Multiplies position and size by an integer pixel ratio, saturating
    /// at the numeric bounds.
    pub fn scaled(&self, ratio: u32) -> Self {
        let signed = i32::try_from(ratio).unwrap_or(i32::MAX);
        Self {
            x: self.x.saturating_mul(signed),
            y: self.y.saturating_mul(signed),
            width: self.width.saturating_mul(ratio),
            height: self.height.saturating_mul(ratio),
        }
    }

    /// Returns the overlapping region, or `None` when the rectangles are disjoint.
    pub fn intersect(&self, other: &RectPx) -> Option<RectPx> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(RectPx::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Saturates instead of wrapping.
    pub fn scaled(&self, ratio: u32) -> Self {
        Self::new(
            self.width.saturating_mul(ratio),
            self.height.saturating_mul(ratio),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A source-space crop (in image pixels) that covers a panel without
/// distortion, like CSS `object-fit: cover`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoverCrop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CoverCrop {
    /// Computes the centered crop of an `image`-sized source whose aspect
    /// ratio matches `panel`.
    pub fn compute(image: SizePx, panel: SizePx) -> Self {
        if image.is_empty() || panel.is_empty() {
            return Self::default();
        }
        let (iw, ih) = (u64::from(image.width), u64::from(image.height));
        let (pw, ph) = (u64::from(panel.width), u64::from(panel.height));

        // Compare iw/ih with pw/ph using integer cross products.
        let (width, height) = if iw * ph > pw * ih {
            // Source is wider than the panel: keep full height.
            (((ih * pw + ph / 2) / ph).clamp(1, iw), ih)
        } else {
            (iw, ((iw * ph + pw / 2) / pw).clamp(1, ih))
        };

        Self {
            x: ((iw - width) / 2) as u32,
            y: ((ih - height) / 2) as u32,
            width: width as u32,
            height: height as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_px_edges() {
        let rect = RectPx::new(10, 20, 100, 200);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 220);
        assert_eq!(rect.scaled(3), RectPx::new(30, 60, 300, 600));
    }

    #[test]
    fn scaling_saturates_instead_of_wrapping() {
        let rect = RectPx::new(-70_000, 70_000, 70_000, 1).scaled(70_000);
        assert_eq!(rect, RectPx::new(i32::MIN, i32::MAX, u32::MAX, 70_000));
        assert_eq!(SizePx::new(u32::MAX, 2).scaled(3), SizePx::new(u32::MAX, 6));
    }

    #[test]
    fn intersect_clips_negative_origin() {
        let canvas = RectPx::new(0, 0, 100, 50);
        let row = RectPx::new(-20, 10, 140, 20);
        assert_eq!(row.intersect(&canvas), Some(RectPx::new(0, 10, 100, 20)));
        assert_eq!(RectPx::new(200, 0, 10, 10).intersect(&canvas), None);
    }

    #[test]
    fn cover_crop_wide_image_trims_sides() {
        let crop = CoverCrop::compute(SizePx::new(1000, 250), SizePx::new(480, 240));
        assert_eq!(crop.height, 250);
        assert_eq!(crop.width, 500);
        assert_eq!(crop.x, 250);
        assert_eq!(crop.y, 0);
    }

    #[test]
    fn cover_crop_tall_image_trims_top_and_bottom() {
        let crop = CoverCrop::compute(SizePx::new(300, 900), SizePx::new(480, 240));
        assert_eq!(crop.width, 300);
        assert_eq!(crop.height, 150);
        assert_eq!(crop.y, 375);
    }

    #[test]
    fn cover_crop_same_aspect_keeps_everything() {
        let crop = CoverCrop::compute(SizePx::new(960, 512), SizePx::new(480, 256));
        assert_eq!(crop, CoverCrop { x: 0, y: 0, width: 960, height: 512 });
    }
}
