//! Canvas geometry, export and upload settings.
//!
//! The canvas size and oversampling factor are plain configuration: the
//! defaults reproduce the original preview card (a 256 px tall panel) and
//! its 3x export.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::parse_hex;
use crate::error::ConfigError;

/// Default upload limit: 5 MB, measured in binary megabytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * BYTES_PER_MB;

/// Bytes per megabyte as used for upload limits and error messages.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Largest export edge in physical pixels.
pub const MAX_EXPORT_EDGE: u32 = 16_384;

/// Frame art drawn above everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct FrameStyle {
    /// Stroke color as `#rrggbb`.
    pub stroke: String,
    /// Stroke width in logical pixels. Zero disables the frame.
    pub stroke_width: u32,
    pub corner_radius: u32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            stroke: "#e5e7eb".to_string(),
            stroke_width: 1,
            corner_radius: 6,
        }
    }
}

/// Settings for the thumbnail pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ThumbnailConfig {
    /// Logical preview width in pixels.
    pub canvas_width: u32,
    /// Logical preview height in pixels.
    pub canvas_height: u32,
    /// Export oversampling factor. Exported files are
    /// `canvas * pixel_ratio` pixels.
    pub pixel_ratio: u32,
    /// Largest accepted upload, inclusive.
    pub max_upload_bytes: u64,
    /// Suggested filename for exported artifacts.
    pub export_filename: String,
    /// Fill of the background panel when no image is set.
    pub placeholder_color: String,
    pub title_font_size: u32,
    pub badge_font_size: u32,
    pub font_family: String,
    /// Load the host's fonts for title and badge labels. Without fonts,
    /// text is laid out but not drawn.
    pub load_system_fonts: bool,
    pub frame: FrameStyle,
    /// Optional logo drawn in the top-left corner of the overlay.
    pub logo_svg: Option<String>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            canvas_width: 480,
            canvas_height: 256,
            pixel_ratio: 3,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            export_filename: "thumbnail.png".to_string(),
            placeholder_color: "#f3f4f6".to_string(),
            title_font_size: 30,
            badge_font_size: 14,
            font_family: "sans-serif".to_string(),
            load_system_fonts: true,
            frame: FrameStyle::default(),
            logo_svg: None,
        }
    }
}

impl ThumbnailConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: u32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_system_fonts(mut self, load: bool) -> Self {
        self.load_system_fonts = load;
        self
    }

    /// Upload limit in megabytes, for messages.
    pub fn max_upload_mb(&self) -> f64 {
        self.max_upload_bytes as f64 / BYTES_PER_MB as f64
    }

    /// Exported bitmap size in physical pixels, `None` if it overflows.
    pub fn export_dimensions(&self) -> Option<(u32, u32)> {
        Some((
            self.canvas_width.checked_mul(self.pixel_ratio)?,
            self.canvas_height.checked_mul(self.pixel_ratio)?,
        ))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if self.pixel_ratio < 2 {
            return Err(ConfigError::PixelRatio(self.pixel_ratio));
        }
        let width = u64::from(self.canvas_width) * u64::from(self.pixel_ratio);
        let height = u64::from(self.canvas_height) * u64::from(self.pixel_ratio);
        if width.max(height) > u64::from(MAX_EXPORT_EDGE) {
            return Err(ConfigError::ExportTooLarge {
                width,
                height,
                max: MAX_EXPORT_EDGE,
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::UploadLimit);
        }
        if self.export_filename.trim().is_empty() {
            return Err(ConfigError::Filename);
        }
        parse_hex(&self.placeholder_color)?;
        parse_hex(&self.frame.stroke)?;
        Ok(())
    }
}
