//! Middle tier: logo, title and badge row.

use std::fmt::Write as _;

use image::RgbaImage;

use super::svg::{composite_over, escape_xml};
use super::{PaintContext, PaintLayer, SvgRasterizer, hex};
use crate::error::PaintResult;
use crate::geometry::RectPx;
use crate::layout::{BadgeRow, LayerKind, RenderedLayout, TitleBlock};

/// Draws text and pills as one SVG document, then places glyph bitmaps on
/// top of it.
#[derive(Debug)]
pub struct OverlayLayer<'a> {
    svg: &'a SvgRasterizer,
}

impl<'a> OverlayLayer<'a> {
    pub fn new(svg: &'a SvgRasterizer) -> Self {
        Self { svg }
    }

    /// Renders `source` into `rect` (logical units), centered when the
    /// glyph's aspect ratio leaves slack.
    fn place_glyph(
        &self,
        canvas: &mut RgbaImage,
        source: &super::SvgSource,
        rect: RectPx,
        ratio: u32,
        fill: Option<&str>,
    ) {
        let target = rect.scaled(ratio);
        let Some(glyph) = self.svg.render_glyph(source, target.width.min(target.height), fill) else {
            tracing::warn!(emoji = source.is_emoji(), "glyph could not be rendered, skipping");
            return;
        };
        let x = i64::from(target.x) + i64::from(target.width.saturating_sub(glyph.width()) / 2);
        let y = i64::from(target.y) + i64::from(target.height.saturating_sub(glyph.height()) / 2);
        composite_over(canvas, &glyph, x, y);
    }
}

impl PaintLayer for OverlayLayer<'_> {
    fn kind(&self) -> LayerKind {
        LayerKind::Overlay
    }

    fn paint(&self, layout: &RenderedLayout, ctx: &mut PaintContext<'_>) -> PaintResult<()> {
        let markup = overlay_svg(layout);
        let overlay = self.svg.rasterize(
            &markup,
            ctx.canvas.width(),
            ctx.canvas.height(),
            ctx.ratio,
        )?;
        composite_over(&mut ctx.canvas, &overlay, 0, 0);

        if let Some(logo) = &layout.logo {
            self.place_glyph(&mut ctx.canvas, &logo.source, logo.rect, ctx.ratio, None);
        }
        if let Some(row) = &layout.badge_row {
            let ink = hex(row.ink);
            for slot in &row.slots {
                self.place_glyph(
                    &mut ctx.canvas,
                    &slot.glyph,
                    slot.glyph_rect,
                    ctx.ratio,
                    Some(&ink),
                );
            }
        }
        Ok(())
    }
}

/// SVG for the title and badge pills, in logical units.
pub fn overlay_svg(layout: &RenderedLayout) -> String {
    let (w, h) = (layout.canvas.width, layout.canvas.height);
    let family = escape_xml(&layout.font_family);
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    write_title(&mut out, &layout.title, &family);
    if let Some(row) = &layout.badge_row {
        write_badges(&mut out, row, &family);
    }
    out.push_str("</svg>");
    out
}

fn write_title(out: &mut String, title: &TitleBlock, family: &str) {
    if title.text.is_empty() {
        return;
    }
    let (cx, cy) = title.anchor();
    let _ = write!(
        out,
        r#"<text x="{cx}" y="{cy}" font-family="{family}" font-size="{size}" font-weight="bold" fill="{fill}" text-anchor="middle" dominant-baseline="central">{text}</text>"#,
        size = title.font_size,
        fill = hex(title.color),
        text = escape_xml(&title.text),
    );
}

fn write_badges(out: &mut String, row: &BadgeRow, family: &str) {
    let fill = hex(row.fill);
    let ink = hex(row.ink);
    for slot in &row.slots {
        let rect = slot.rect;
        let _ = write!(
            out,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" fill="{fill}"/>"#,
            x = rect.x,
            y = rect.y,
            w = rect.width,
            h = rect.height,
            r = rect.height as f32 / 2.0,
        );
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-weight="600" fill="{ink}" dominant-baseline="central">{label}</text>"#,
            x = slot.label_x,
            y = rect.y + rect.height as i32 / 2,
            size = row.font_size,
            label = escape_xml(&slot.label),
        );
    }
}
