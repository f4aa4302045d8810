//! Top tier: the static decorative frame.

use std::fmt::Write as _;

use super::{PaintContext, PaintLayer, SvgRasterizer, hex, svg::composite_over};
use crate::error::PaintResult;
use crate::layout::{FrameOverlay, LayerKind, RenderedLayout};

/// Strokes the frame rectangle on top of everything else.
#[derive(Debug)]
pub struct FrameLayer<'a> {
    svg: &'a SvgRasterizer,
}

impl<'a> FrameLayer<'a> {
    pub fn new(svg: &'a SvgRasterizer) -> Self {
        Self { svg }
    }
}

impl PaintLayer for FrameLayer<'_> {
    fn kind(&self) -> LayerKind {
        LayerKind::Frame
    }

    fn paint(&self, layout: &RenderedLayout, ctx: &mut PaintContext<'_>) -> PaintResult<()> {
        let Some(frame) = &layout.frame else {
            return Ok(());
        };
        let markup = frame_svg(layout, frame);
        let stroke = self.svg.rasterize(
            &markup,
            ctx.canvas.width(),
            ctx.canvas.height(),
            ctx.ratio,
        )?;
        composite_over(&mut ctx.canvas, &stroke, 0, 0);
        Ok(())
    }
}

/// The stroke sits fully inside the frame rectangle.
fn frame_svg(layout: &RenderedLayout, frame: &FrameOverlay) -> String {
    let (w, h) = (layout.canvas.width, layout.canvas.height);
    let inset = frame.stroke_width as f32 / 2.0;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        out,
        r#"<rect x="{x}" y="{y}" width="{rw}" height="{rh}" rx="{r}" fill="none" stroke="{stroke}" stroke-width="{sw}"/>"#,
        x = frame.rect.x as f32 + inset,
        y = frame.rect.y as f32 + inset,
        rw = (frame.rect.width as f32 - frame.stroke_width as f32).max(0.0),
        rh = (frame.rect.height as f32 - frame.stroke_width as f32).max(0.0),
        r = frame.corner_radius,
        stroke = hex(frame.stroke),
        sw = frame.stroke_width,
    );
    out.push_str("</svg>");
    out
}
