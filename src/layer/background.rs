//! Bottom tier: the uploaded image or the neutral placeholder.

use image::imageops;

use super::{PaintContext, PaintLayer};
use crate::error::PaintResult;
use crate::layout::{BackgroundFill, LayerKind, RenderedLayout};

/// Fills the background panel.
///
/// Images are cropped to the panel's aspect ratio and scaled to cover it,
/// so there is never letterboxing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundLayer;

impl PaintLayer for BackgroundLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Background
    }

    fn paint(&self, layout: &RenderedLayout, ctx: &mut PaintContext<'_>) -> PaintResult<()> {
        let panel = &layout.background;
        let target = panel.rect.scaled(ctx.ratio);

        match &panel.fill {
            BackgroundFill::Placeholder(color) => {
                let (x0, y0) = (target.x.max(0) as u32, target.y.max(0) as u32);
                let x1 = (target.right().max(0) as u32).min(ctx.canvas.width());
                let y1 = (target.bottom().max(0) as u32).min(ctx.canvas.height());
                for y in y0..y1 {
                    for x in x0..x1 {
                        ctx.canvas.put_pixel(x, y, *color);
                    }
                }
            }
            BackgroundFill::Image { image, crop } => {
                let bitmap = ctx.decoder().cover_bitmap(image, *crop, target.size())?;
                imageops::replace(
                    &mut ctx.canvas,
                    bitmap.as_ref(),
                    i64::from(target.x),
                    i64::from(target.y),
                );
            }
        }
        Ok(())
    }
}
