//! Error types for ingestion, painting and export.

use thiserror::Error;

/// Result type for upload ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for painting a layout into a bitmap.
pub type PaintResult<T> = Result<T, PaintError>;

/// Errors raised while validating or decoding an uploaded file.
///
/// None of these touch the composition: the caller keeps its previous
/// background and may retry immediately.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The drop contained no file.
    #[error("No file was provided")]
    NoFile,

    /// The file exceeds the configured upload limit.
    #[error("File size exceeds {limit_mb} MB limit ({actual_mb:.2} MB)")]
    FileTooLarge { limit_mb: f64, actual_mb: f64 },

    /// The file is not a PNG or JPEG image.
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// The file claimed a supported type but could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The file at a path could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A newer upload started before this one finished.
    #[error("Upload was superseded by a newer one")]
    Superseded,
}

/// Errors raised by [`Rasterizer`](crate::Rasterizer) exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing has been rendered into the preview yet.
    #[error("No rendered preview is available to export")]
    PreviewNotFound,

    /// Painting or encoding the captured layout failed.
    #[error("Failed to capture rendered layout: {0}")]
    RenderCapture(String),

    /// The file-save collaborator could not store the artifact.
    #[error("Failed to save exported file: {0}")]
    Save(#[from] std::io::Error),
}

/// Errors raised while painting a layout.
#[derive(Debug, Error)]
pub enum PaintError {
    /// A sub-image (the background) could not be decoded.
    #[error("Image resource failed to decode: {0}")]
    ImageDecode(String),

    /// The target bitmap could not be allocated.
    #[error("Cannot allocate a {width}x{height} bitmap")]
    Allocation { width: u32, height: u32 },

    /// SVG markup generated for an overlay was rejected by the parser.
    #[error("SVG rendering failed: {0}")]
    Svg(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<PaintError> for ExportError {
    fn from(err: PaintError) -> Self {
        ExportError::RenderCapture(err.to_string())
    }
}

/// Invalid [`ThumbnailConfig`](crate::ThumbnailConfig) values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Canvas dimensions must be non-zero (got {width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("Pixel ratio must be at least 2 so exports exceed preview resolution (got {0})")]
    PixelRatio(u32),

    #[error("Export of {width}x{height} exceeds the {max}px edge limit")]
    ExportTooLarge { width: u64, height: u64, max: u32 },

    #[error("Upload limit must be non-zero")]
    UploadLimit,

    #[error("Export filename must not be empty")]
    Filename,

    #[error("Invalid color {0:?}, expected #rrggbb")]
    Color(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when applying a [`ThumbnailProfile`](crate::ThumbnailProfile).
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to parse profile: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown accent color: {0}")]
    UnknownAccent(String),

    #[error("Unknown badge: {0}")]
    UnknownBadge(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_message_names_limit() {
        let err = IngestError::FileTooLarge {
            limit_mb: 5.0,
            actual_mb: 6.5,
        };
        assert_eq!(err.to_string(), "File size exceeds 5 MB limit (6.50 MB)");
    }

    #[test]
    fn read_error_keeps_its_cause() {
        let err = IngestError::Read {
            path: "bg.png".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("Failed to read bg.png"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn paint_error_becomes_render_capture() {
        let err: ExportError = PaintError::ImageDecode("truncated".into()).into();
        assert!(matches!(err, ExportError::RenderCapture(ref cause) if cause.contains("truncated")));
    }
}
