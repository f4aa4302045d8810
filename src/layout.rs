//! Fixed-geometry layout of a composition snapshot.
//!
//! [`LayoutRenderer::render`] is a pure function of the snapshot: it only
//! computes rectangles and colors. Painting happens in [`crate::layer`].
//!
//! ```text
//! ┌──────────────────────────────────────────┐ ◄── frame (top)
//! │ logo                                     │
//! │                 Title                    │ ◄── overlay
//! │        [◎ React] [◎ Go]                  │
//! │                                          │
//! └──────────────────────────────────────────┘ ◄── background panel (bottom)
//! ```

use image::Rgba;
use palette::Srgb;

use crate::color::parse_hex;
use crate::config::ThumbnailConfig;
use crate::error::ConfigError;
use crate::geometry::{CoverCrop, RectPx, SizePx};
use crate::layer::SvgSource;
use crate::state::CompositionState;
use crate::upload::UploadedImage;

const BADGE_HEIGHT: u32 = 28;
const BADGE_PADDING: u32 = 10;
const BADGE_GLYPH: u32 = 16;
const BADGE_GLYPH_GAP: u32 = 6;
const BADGE_SPACING: u32 = 8;
const TITLE_BADGE_GAP: u32 = 8;
const LOGO_SIZE: u32 = 24;
const LOGO_MARGIN: i32 = 12;

// ============================================================================
// Layout types
// ============================================================================

/// Paint tiers, bottom to top. The order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Background image or placeholder.
    Background,
    /// Logo, title and badge row.
    Overlay,
    /// Static decorative frame.
    Frame,
}

impl LayerKind {
    pub const PAINT_ORDER: [LayerKind; 3] = [LayerKind::Background, LayerKind::Overlay, LayerKind::Frame];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundFill {
    /// Neutral panel shown before any upload.
    Placeholder(Rgba<u8>),
    /// The uploaded image, cropped to cover the panel.
    Image { image: UploadedImage, crop: CoverCrop },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundPanel {
    pub rect: RectPx,
    pub fill: BackgroundFill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoMark {
    pub rect: RectPx,
    pub source: SvgSource,
}

/// The title line. Present even when the text is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBlock {
    pub text: String,
    pub rect: RectPx,
    pub font_size: u32,
    pub color: Rgba<u8>,
}

impl TitleBlock {
    /// Horizontal center and vertical middle of the line.
    pub fn anchor(&self) -> (i32, i32) {
        (
            self.rect.x + self.rect.width as i32 / 2,
            self.rect.y + self.rect.height as i32 / 2,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSlot {
    pub id: String,
    pub label: String,
    pub glyph: SvgSource,
    /// The pill.
    pub rect: RectPx,
    pub glyph_rect: RectPx,
    /// Left edge of the label; the label is vertically centered in the pill.
    pub label_x: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRow {
    pub rect: RectPx,
    pub slots: Vec<BadgeSlot>,
    pub font_size: u32,
    /// Pill background.
    pub fill: Rgba<u8>,
    /// Label and glyph color.
    pub ink: Rgba<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOverlay {
    pub rect: RectPx,
    pub stroke: Rgba<u8>,
    pub stroke_width: u32,
    pub corner_radius: u32,
}

/// Absolute geometry derived from one [`CompositionState`].
///
/// Read-only: a new layout is produced for every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLayout {
    pub canvas: SizePx,
    /// Everything outside this rectangle is discarded.
    pub clip: RectPx,
    pub background: BackgroundPanel,
    pub logo: Option<LogoMark>,
    pub title: TitleBlock,
    /// Absent when no badge is selected.
    pub badge_row: Option<BadgeRow>,
    /// Absent when the frame stroke width is zero.
    pub frame: Option<FrameOverlay>,
    pub font_family: String,
}

impl RenderedLayout {
    /// Paint tiers, bottom to top.
    pub fn paint_order(&self) -> [LayerKind; 3] {
        LayerKind::PAINT_ORDER
    }
}

// ============================================================================
// LayoutRenderer
// ============================================================================

/// Maps composition snapshots to [`RenderedLayout`]s.
#[derive(Debug, Clone)]
pub struct LayoutRenderer {
    canvas: SizePx,
    placeholder: Rgba<u8>,
    title_font_size: u32,
    badge_font_size: u32,
    font_family: String,
    frame: Option<FrameOverlay>,
    logo: Option<SvgSource>,
}

impl LayoutRenderer {
    /// Builds a renderer, validating the config.
    pub fn new(config: &ThumbnailConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let canvas = SizePx::new(config.canvas_width, config.canvas_height);
        let frame = (config.frame.stroke_width > 0)
            .then(|| -> Result<FrameOverlay, ConfigError> {
                Ok(FrameOverlay {
                    rect: RectPx::from_size(canvas),
                    stroke: rgba(parse_hex(&config.frame.stroke)?),
                    stroke_width: config.frame.stroke_width,
                    corner_radius: config.frame.corner_radius,
                })
            })
            .transpose()?;

        Ok(Self {
            canvas,
            placeholder: rgba(parse_hex(&config.placeholder_color)?),
            title_font_size: config.title_font_size,
            badge_font_size: config.badge_font_size,
            font_family: config.font_family.clone(),
            frame,
            logo: config.logo_svg.clone().map(SvgSource::Raw),
        })
    }

    pub fn canvas(&self) -> SizePx {
        self.canvas
    }

    /// Computes the layout for `state`. Identical states yield identical
    /// layouts.
    pub fn render(&self, state: &CompositionState) -> RenderedLayout {
        let canvas_rect = RectPx::from_size(self.canvas);
        let ink = state.accent.rgba();

        let title_height = if state.title.is_empty() {
            0
        } else {
            (self.title_font_size * 5).div_ceil(4)
        };
        let row_height = if state.badges.is_empty() { 0 } else { BADGE_HEIGHT };
        let gap = if title_height > 0 && row_height > 0 {
            TITLE_BADGE_GAP
        } else {
            0
        };

        // The title and badge row form one vertically centered stack.
        let stack_height = title_height + gap + row_height;
        let top = (self.canvas.height as i32 - stack_height as i32) / 2;

        let title = TitleBlock {
            text: state.title.clone(),
            rect: RectPx::new(0, top, self.canvas.width, title_height),
            font_size: self.title_font_size,
            color: ink,
        };

        let badge_row = (!state.badges.is_empty()).then(|| {
            self.layout_badges(state, top + (title_height + gap) as i32)
        });

        RenderedLayout {
            canvas: self.canvas,
            clip: canvas_rect,
            background: BackgroundPanel {
                rect: canvas_rect,
                fill: self.background_fill(state.background.as_ref()),
            },
            logo: self.logo.clone().map(|source| LogoMark {
                rect: RectPx::new(LOGO_MARGIN, LOGO_MARGIN, LOGO_SIZE, LOGO_SIZE),
                source,
            }),
            title,
            badge_row,
            frame: self.frame.clone(),
            font_family: self.font_family.clone(),
        }
    }

    fn background_fill(&self, background: Option<&UploadedImage>) -> BackgroundFill {
        match background {
            Some(image) => BackgroundFill::Image {
                image: image.clone(),
                crop: CoverCrop::compute(image.dimensions(), self.canvas),
            },
            None => BackgroundFill::Placeholder(self.placeholder),
        }
    }

    fn layout_badges(&self, state: &CompositionState, y: i32) -> BadgeRow {
        let accent = state.accent;
        let widths: Vec<u32> = state
            .badges
            .iter()
            .map(|badge| self.badge_width(badge.label()))
            .collect();
        let row_width =
            widths.iter().sum::<u32>() + BADGE_SPACING * (widths.len() as u32).saturating_sub(1);
        let mut x = (self.canvas.width as i32 - row_width as i32) / 2;
        let row_x = x;

        let slots = state
            .badges
            .iter()
            .zip(&widths)
            .map(|(badge, &width)| {
                let rect = RectPx::new(x, y, width, BADGE_HEIGHT);
                let glyph_rect = RectPx::new(
                    x + BADGE_PADDING as i32,
                    y + ((BADGE_HEIGHT - BADGE_GLYPH) / 2) as i32,
                    BADGE_GLYPH,
                    BADGE_GLYPH,
                );
                x += (width + BADGE_SPACING) as i32;
                BadgeSlot {
                    id: badge.id().to_string(),
                    label: badge.label().to_string(),
                    glyph: badge.glyph().clone(),
                    rect,
                    label_x: glyph_rect.right() + BADGE_GLYPH_GAP as i32,
                    glyph_rect,
                }
            })
            .collect();

        BadgeRow {
            rect: RectPx::new(row_x, y, row_width, BADGE_HEIGHT),
            slots,
            font_size: self.badge_font_size,
            fill: rgba(accent.badge_fill()),
            ink: accent.rgba(),
        }
    }

    /// Estimated pill width: glyph, label at 0.6 em per character, padding.
    fn badge_width(&self, label: &str) -> u32 {
        let chars = label.chars().count() as u32;
        let label_width = (chars * self.badge_font_size * 3).div_ceil(5);
        BADGE_PADDING * 2 + BADGE_GLYPH + BADGE_GLYPH_GAP + label_width
    }
}

fn rgba(color: Srgb<u8>) -> Rgba<u8> {
    Rgba([color.red, color.green, color.blue, 255])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::{Badge, BadgeCatalog};
    use crate::color::AccentColor;
    use crate::state::Message;

    fn renderer() -> LayoutRenderer {
        LayoutRenderer::new(&ThumbnailConfig::default()).unwrap()
    }

    fn badge(catalog: &BadgeCatalog, id: &str) -> Badge {
        catalog.get(id).unwrap().clone()
    }

    #[test]
    fn empty_state_renders_placeholder_without_badges() {
        let layout = renderer().render(&CompositionState::new());
        assert_eq!(layout.canvas, SizePx::new(480, 256));
        assert!(matches!(
            layout.background.fill,
            BackgroundFill::Placeholder(Rgba([243, 244, 246, 255]))
        ));
        assert!(layout.title.text.is_empty());
        assert!(layout.badge_row.is_none());
        assert!(layout.logo.is_none());
        assert!(layout.frame.is_some());
    }

    #[test]
    fn render_is_pure() {
        let catalog = BadgeCatalog::builtin();
        let state = CompositionState::new()
            .apply(Message::SetTitle("Hello".into()))
            .apply(Message::ToggleBadge(badge(&catalog, "React")))
            .apply(Message::ToggleBadge(badge(&catalog, "Go")));
        let renderer = renderer();
        assert_eq!(renderer.render(&state), renderer.render(&state.clone()));
    }

    #[test]
    fn badges_keep_selection_order_left_to_right() {
        let catalog = BadgeCatalog::builtin();
        let state = CompositionState::new()
            .apply(Message::ToggleBadge(badge(&catalog, "Go")))
            .apply(Message::ToggleBadge(badge(&catalog, "React")));
        let row = renderer().render(&state).badge_row.unwrap();
        let ids: Vec<_> = row.slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["Go", "React"]);
        assert!(row.slots[0].rect.right() < row.slots[1].rect.x);
    }

    #[test]
    fn badge_row_is_centered() {
        let catalog = BadgeCatalog::builtin();
        let state = CompositionState::new().apply(Message::ToggleBadge(badge(&catalog, "Redux")));
        let row = renderer().render(&state).badge_row.unwrap();
        let left = row.rect.x;
        let right = 480 - row.rect.right();
        assert!((left - right).abs() <= 1);
    }

    #[test]
    fn title_and_row_stack_is_vertically_centered() {
        let catalog = BadgeCatalog::builtin();
        let state = CompositionState::new()
            .apply(Message::SetTitle("Hello".into()))
            .apply(Message::ToggleBadge(badge(&catalog, "Go")));
        let layout = renderer().render(&state);
        let row = layout.badge_row.unwrap();
        assert_eq!(row.rect.y, layout.title.rect.bottom() + TITLE_BADGE_GAP as i32);
        let above = layout.title.rect.y;
        let below = 256 - row.rect.bottom();
        assert!((above - below).abs() <= 1);
    }

    #[test]
    fn accent_colors_title_and_badges() {
        let catalog = BadgeCatalog::builtin();
        let state = CompositionState::new()
            .apply(Message::SetTitle("Hello".into()))
            .apply(Message::ToggleBadge(badge(&catalog, "Go")))
            .apply(Message::SetAccent(AccentColor::Black));
        let layout = renderer().render(&state);
        assert_eq!(layout.title.color, Rgba([0, 0, 0, 255]));
        assert_eq!(layout.badge_row.unwrap().ink, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn wide_row_overflows_and_is_clipped() {
        let config = ThumbnailConfig::default().with_canvas(120, 80);
        let renderer = LayoutRenderer::new(&config).unwrap();
        let state: CompositionState = BadgeCatalog::builtin()
            .iter()
            .cloned()
            .fold(CompositionState::new(), |s, b| s.apply(Message::ToggleBadge(b)));
        let layout = renderer.render(&state);
        let row = layout.badge_row.unwrap();
        assert!(row.rect.x < 0);
        assert_eq!(row.rect.intersect(&layout.clip).unwrap().width, 120);
    }

    #[test]
    fn zero_width_frame_is_omitted() {
        let mut config = ThumbnailConfig::default();
        config.frame.stroke_width = 0;
        let layout = LayoutRenderer::new(&config).unwrap().render(&CompositionState::new());
        assert!(layout.frame.is_none());
    }

    #[test]
    fn paint_order_puts_frame_on_top() {
        let layout = renderer().render(&CompositionState::new());
        assert_eq!(
            layout.paint_order(),
            [LayerKind::Background, LayerKind::Overlay, LayerKind::Frame]
        );
    }

    #[test]
    fn logo_region_when_configured() {
        let mut config = ThumbnailConfig::default();
        config.logo_svg = Some("<svg/>".into());
        let layout = LayoutRenderer::new(&config).unwrap().render(&CompositionState::new());
        assert_eq!(layout.logo.unwrap().rect, RectPx::new(12, 12, 24, 24));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ThumbnailConfig::default().with_pixel_ratio(1);
        assert!(LayoutRenderer::new(&config).is_err());
    }
}
