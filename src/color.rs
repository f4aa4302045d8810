//! Accent palette and color helpers.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use palette::color_difference::Wcag21RelativeContrast;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The enumerated accent palette.
///
/// Exactly one accent is selected at a time. The title, badge labels and
/// badge glyphs are drawn in the accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    #[default]
    White,
    Black,
    Slate,
    Red,
    Orange,
    Amber,
    Green,
    Blue,
    Violet,
    Pink,
}

impl AccentColor {
    /// All palette entries in swatch order. The first entry is the default.
    pub const PALETTE: [AccentColor; 10] = [
        AccentColor::White,
        AccentColor::Black,
        AccentColor::Slate,
        AccentColor::Red,
        AccentColor::Orange,
        AccentColor::Amber,
        AccentColor::Green,
        AccentColor::Blue,
        AccentColor::Violet,
        AccentColor::Pink,
    ];

    /// Lowercase swatch name.
    pub fn name(self) -> &'static str {
        match self {
            AccentColor::White => "white",
            AccentColor::Black => "black",
            AccentColor::Slate => "slate",
            AccentColor::Red => "red",
            AccentColor::Orange => "orange",
            AccentColor::Amber => "amber",
            AccentColor::Green => "green",
            AccentColor::Blue => "blue",
            AccentColor::Violet => "violet",
            AccentColor::Pink => "pink",
        }
    }

    pub fn srgb(self) -> Srgb<u8> {
        match self {
            AccentColor::White => Srgb::new(255, 255, 255),
            AccentColor::Black => Srgb::new(0, 0, 0),
            AccentColor::Slate => Srgb::new(71, 85, 105),
            AccentColor::Red => Srgb::new(239, 68, 68),
            AccentColor::Orange => Srgb::new(249, 115, 22),
            AccentColor::Amber => Srgb::new(245, 158, 11),
            AccentColor::Green => Srgb::new(34, 197, 94),
            AccentColor::Blue => Srgb::new(59, 130, 246),
            AccentColor::Violet => Srgb::new(139, 92, 246),
            AccentColor::Pink => Srgb::new(236, 72, 153),
        }
    }

    pub fn rgba(self) -> Rgba<u8> {
        let c = self.srgb();
        Rgba([c.red, c.green, c.blue, 255])
    }

    /// Fill used behind badge labels so they stay readable on any accent.
    pub fn badge_fill(self) -> Srgb<u8> {
        contrasting_tone(self.srgb())
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccentColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AccentColor::PALETTE
            .into_iter()
            .find(|accent| accent.name() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// Returns a muted dark or pale tone of `color`, whichever has the higher
/// WCAG 2.1 contrast ratio against it.
///
/// Saturated mid-lightness accents such as amber and green are luminous
/// enough that they read best on the dark tone.
pub fn contrasting_tone(color: Srgb<u8>) -> Srgb<u8> {
    let rgb: Srgb = color.into_format();
    let mut hsl: Hsl = rgb.into_color();
    hsl.saturation *= 0.3;
    let tone_at = |lightness: f32| -> Srgb {
        Hsl::new(hsl.hue, hsl.saturation, lightness).into_color()
    };
    let (dark, pale) = (tone_at(0.17), tone_at(0.92));
    let tone = if rgb.relative_contrast(dark) >= rgb.relative_contrast(pale) {
        dark
    } else {
        pale
    };
    tone.into_format()
}

/// Formats a color as `#rrggbb` for SVG attributes.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Parses `#rrggbb` (or `#rgb`) into a color.
pub fn parse_hex(value: &str) -> Result<Srgb<u8>, ConfigError> {
    Srgb::<u8>::from_str(value.trim()).map_err(|_| ConfigError::Color(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_palette_entry() {
        assert_eq!(AccentColor::default(), AccentColor::PALETTE[0]);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Black".parse::<AccentColor>(), Ok(AccentColor::Black));
        assert_eq!(" blue ".parse::<AccentColor>(), Ok(AccentColor::Blue));
        assert!("teal".parse::<AccentColor>().is_err());
    }

    #[test]
    fn every_palette_entry_round_trips_through_name() {
        for accent in AccentColor::PALETTE {
            assert_eq!(accent.name().parse::<AccentColor>(), Ok(accent));
        }
    }

    #[test]
    fn badge_fill_contrasts_with_accent() {
        let on_white = AccentColor::White.badge_fill();
        let on_black = AccentColor::Black.badge_fill();
        assert!(on_white.red < 80, "light accent should get a dark fill");
        assert!(on_black.red > 200, "dark accent should get a pale fill");
    }

    #[test]
    fn luminous_accents_get_a_dark_fill() {
        for accent in [AccentColor::Amber, AccentColor::Green, AccentColor::Orange] {
            let fill = accent.badge_fill();
            assert!(fill.red < 80 && fill.green < 80, "{accent:?} got {fill:?}");
        }
        assert!(AccentColor::Slate.badge_fill().red > 200);
    }

    #[test]
    fn every_accent_reads_on_its_fill() {
        for accent in AccentColor::PALETTE {
            let ink: Srgb = accent.srgb().into_format();
            let fill: Srgb = accent.badge_fill().into_format();
            let ratio = ink.relative_contrast(fill);
            assert!(ratio >= 3.0, "{accent:?} contrast {ratio}");
        }
    }

    #[test]
    fn hex_formatting_and_parsing() {
        assert_eq!(to_hex(Srgb::new(243, 244, 246)), "#f3f4f6");
        assert_eq!(parse_hex("#f3f4f6").unwrap(), Srgb::new(243, 244, 246));
        assert!(matches!(parse_hex("nope"), Err(ConfigError::Color(_))));
    }
}
