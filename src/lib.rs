//! thumbnail-composer: promotional project thumbnails from a background
//! photo, a title and technology badges.
//!
//! A [`Composer`] owns the composition. Every change produces a new
//! immutable [`CompositionState`], which is laid out on a fixed-size canvas
//! and presented on a [`PreviewSurface`]. Exports repaint the presented
//! layout at `pixel_ratio` times its logical size and encode it as PNG.
//!
//! # Example
//!
//! ```
//! use thumbnail_composer::{AccentColor, Composer, MemorySaver, ThumbnailConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ThumbnailConfig::default().with_system_fonts(false);
//! let mut composer = Composer::new(&config)?;
//!
//! composer.set_title("Hello");
//! composer.toggle_badge("React")?;
//! composer.toggle_badge("Go")?;
//! composer.set_accent(AccentColor::Black);
//!
//! let saver = MemorySaver::new();
//! composer.export(&saver).await?;
//!
//! let artifact = &saver.artifacts()[0];
//! assert_eq!(artifact.filename, "thumbnail.png");
//! assert_eq!((artifact.width, artifact.height), (1440, 768));
//! # Ok(())
//! # }
//! ```
//!
//! # Serializable Profiles
//!
//! The non-image part of a composition can be stored as a
//! [`ThumbnailProfile`] through the [`Configurable`] trait:
//!
//! ```
//! use thumbnail_composer::{Composer, Configurable, ThumbnailConfig, ThumbnailProfile};
//!
//! let mut composer = Composer::new(&ThumbnailConfig::default().with_system_fonts(false)).unwrap();
//! let profile = ThumbnailProfile::from_json(r#"{"title":"Hi","accent":"blue","badges":["Redux"]}"#).unwrap();
//! composer.apply_profile(&profile).unwrap();
//!
//! let json = composer.export_profile().to_json().unwrap();
//! assert!(json.contains("\"blue\""));
//! ```

mod badge;
mod color;
mod composer;
mod config;
mod error;
mod export;
mod geometry;
mod layer;
mod layout;
mod preview;
mod profile;
mod selection;
mod state;
mod upload;

pub use badge::{Badge, BadgeCatalog};
pub use color::{AccentColor, contrasting_tone, parse_hex, to_hex};
pub use composer::{
    Composer, Configurable, LayoutListener, PendingUpload, UploadOutcome, UploadTicket,
};
pub use config::{
    BYTES_PER_MB, DEFAULT_MAX_UPLOAD_BYTES, FrameStyle, MAX_EXPORT_EDGE, ThumbnailConfig,
};
pub use error::{
    ConfigError, ExportError, ExportResult, IngestError, IngestResult, PaintError, PaintResult,
    ProfileError,
};
pub use export::{DirectorySaver, ExportArtifact, FileSaver, MemorySaver, Rasterizer};
pub use geometry::{CoverCrop, RectPx, SizePx};
pub use layer::{
    BackgroundDecoder, CacheKey, CoverCache, FreshDecode, PaintContext, PaintLayer, Painter,
    SvgRasterizer, SvgSource,
};
pub use layout::{
    BackgroundFill, BackgroundPanel, BadgeRow, BadgeSlot, FrameOverlay, LayerKind, LayoutRenderer,
    LogoMark, RenderedLayout, TitleBlock,
};
pub use preview::PreviewSurface;
pub use profile::ThumbnailProfile;
pub use selection::SelectionSet;
pub use state::{CompositionState, Message, reduce};
pub use upload::{ImageIngestor, UploadFormat, UploadedFile, UploadedImage};
