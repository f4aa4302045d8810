//! High-resolution PNG export of the presented layout.
//!
//! ```no_run
//! # async fn demo(preview: &thumbnail_composer::PreviewSurface) -> Result<(), Box<dyn std::error::Error>> {
//! use thumbnail_composer::{DirectorySaver, Rasterizer, ThumbnailConfig};
//!
//! let rasterizer = Rasterizer::from_config(&ThumbnailConfig::default())?;
//! let saver = DirectorySaver::new("out");
//! let path = rasterizer.export(preview, &saver).await?;
//! println!("saved {}", path.display());
//! # Ok(())
//! # }
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use tempfile::NamedTempFile;

use crate::config::ThumbnailConfig;
use crate::error::{ConfigError, ExportError, ExportResult, PaintError};
use crate::layer::{FreshDecode, Painter, SvgRasterizer};
use crate::preview::PreviewSurface;

// ============================================================================
// ExportArtifact
// ============================================================================

/// An encoded export, ready to hand to a [`FileSaver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// FileSaver
// ============================================================================

/// Stores export artifacts.
///
/// Saving may block on I/O. [`Rasterizer::export`] runs it on the blocking
/// pool, so savers are cloned into the worker and must be `Send + 'static`.
pub trait FileSaver {
    /// Stores `artifact` and returns where it went.
    fn save(&self, artifact: &ExportArtifact) -> io::Result<PathBuf>;
}

/// Saves artifacts into a directory under their suggested filename.
///
/// Each write goes to its own uniquely named temporary file in the same
/// directory and is renamed into place, so concurrent saves never share a
/// partial file and a failed save leaves no truncated PNG behind.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, artifact: &ExportArtifact) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(&artifact.filename);
        let mut partial = NamedTempFile::new_in(&self.dir)?;
        partial.write_all(&artifact.bytes)?;
        partial.as_file().sync_all()?;
        // Dropping the temp file on any error above removes it.
        partial.persist(&target).map_err(|err| err.error)?;
        Ok(target)
    }
}

/// Keeps artifacts in memory. Handy for embedding and tests.
///
/// Clones share the same store.
#[derive(Debug, Default, Clone)]
pub struct MemorySaver {
    saved: Arc<Mutex<Vec<ExportArtifact>>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first.
    pub fn artifacts(&self) -> Vec<ExportArtifact> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FileSaver for MemorySaver {
    fn save(&self, artifact: &ExportArtifact) -> io::Result<PathBuf> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(artifact.clone());
        Ok(PathBuf::from(&artifact.filename))
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Captures the presented layout at `pixel_ratio` times its logical size.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    ratio: u32,
    filename: String,
    painter: Painter,
}

impl Rasterizer {
    pub fn from_config(config: &ThumbnailConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(
            config.pixel_ratio,
            config.export_filename.clone(),
            Painter::new(SvgRasterizer::new(config.load_system_fonts)),
        )
    }

    /// Fails when `ratio` would not oversample the preview.
    pub fn new(
        ratio: u32,
        filename: impl Into<String>,
        painter: Painter,
    ) -> Result<Self, ConfigError> {
        if ratio < 2 {
            return Err(ConfigError::PixelRatio(ratio));
        }
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(ConfigError::Filename);
        }
        Ok(Self {
            ratio,
            filename,
            painter,
        })
    }

    pub fn pixel_ratio(&self) -> u32 {
        self.ratio
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Paints and encodes the layout currently presented on `preview`.
    ///
    /// The layout is snapshotted when this is called; later presents do
    /// not affect a capture in flight. The background is decoded again
    /// from its original bytes rather than taken from the preview cache.
    pub async fn export_current_layout(
        &self,
        preview: &PreviewSurface,
    ) -> ExportResult<ExportArtifact> {
        let Some(layout) = preview.current() else {
            tracing::warn!("export requested before anything was rendered");
            return Err(ExportError::PreviewNotFound);
        };

        let painter = self.painter.clone();
        let ratio = self.ratio;
        let captured = tokio::task::spawn_blocking(move || -> Result<_, PaintError> {
            let bitmap = painter.paint(&layout, ratio, &mut FreshDecode)?;
            let (width, height) = bitmap.dimensions();
            let mut bytes = Vec::new();
            PngEncoder::new(&mut bytes)
                .write_image(bitmap.as_raw(), width, height, image::ExtendedColorType::Rgba8)
                .map_err(|e| PaintError::Encode(e.to_string()))?;
            Ok((bytes, width, height))
        })
        .await
        .map_err(|e| ExportError::RenderCapture(format!("capture worker failed: {e}")))?
        .map_err(ExportError::from)
        .inspect_err(|err| tracing::warn!(error = %err, "export failed"))?;

        let (bytes, width, height) = captured;
        tracing::info!(
            filename = %self.filename,
            width,
            height,
            bytes = bytes.len(),
            "layout captured"
        );
        Ok(ExportArtifact {
            bytes,
            filename: self.filename.clone(),
            width,
            height,
        })
    }

    /// Captures the presented layout and hands it to `saver` on the
    /// blocking pool.
    pub async fn export<S>(&self, preview: &PreviewSurface, saver: &S) -> ExportResult<PathBuf>
    where
        S: FileSaver + Clone + Send + 'static,
    {
        let artifact = self.export_current_layout(preview).await?;
        let saver = saver.clone();
        let filename = artifact.filename.clone();
        let path = tokio::task::spawn_blocking(move || saver.save(&artifact))
            .await
            .map_err(|e| io::Error::other(format!("save worker failed: {e}")))
            .and_then(|saved| saved)
            .inspect_err(|err| {
                tracing::warn!(filename = %filename, error = %err, "saving export failed");
            })?;
        tracing::info!(path = %path.display(), "export saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutRenderer;
    use crate::state::{CompositionState, Message};
    use crate::upload::{UploadFormat, UploadedImage};

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn config() -> ThumbnailConfig {
        ThumbnailConfig::default().with_system_fonts(false)
    }

    fn presented() -> PreviewSurface {
        let config = config();
        let mut preview = PreviewSurface::new(Painter::new(SvgRasterizer::new(false)));
        preview.present(LayoutRenderer::new(&config).unwrap().render(&CompositionState::new()));
        preview
    }

    fn rasterizer(config: &ThumbnailConfig) -> Rasterizer {
        Rasterizer::from_config(config).unwrap()
    }

    fn artifact(name: &str) -> ExportArtifact {
        ExportArtifact {
            bytes: vec![1, 2, 3],
            filename: name.into(),
            width: 1,
            height: 1,
        }
    }

    #[tokio::test]
    async fn export_is_oversampled_png() {
        let artifact = rasterizer(&config())
            .export_current_layout(&presented())
            .await
            .unwrap();
        assert_eq!(&artifact.bytes[..8], &PNG_MAGIC);
        assert_eq!((artifact.width, artifact.height), (1440, 768));
        assert_eq!(artifact.filename, "thumbnail.png");

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1440, 768));
    }

    #[tokio::test]
    async fn nothing_presented_is_an_error() {
        let preview = PreviewSurface::new(Painter::new(SvgRasterizer::new(false)));
        let saver = MemorySaver::new();
        let err = rasterizer(&config())
            .export(&preview, &saver)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::PreviewNotFound));
        assert!(saver.artifacts().is_empty());
    }

    #[tokio::test]
    async fn configured_ratio_and_filename_are_used() {
        let mut config = config().with_pixel_ratio(2);
        config.export_filename = "cover.png".into();
        let artifact = rasterizer(&config)
            .export_current_layout(&presented())
            .await
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (960, 512));
        assert_eq!(artifact.filename, "cover.png");
    }

    #[test]
    fn ratio_that_does_not_oversample_is_refused() {
        let painter = || Painter::new(SvgRasterizer::new(false));
        assert!(matches!(
            Rasterizer::new(1, "thumbnail.png", painter()),
            Err(ConfigError::PixelRatio(1))
        ));
        assert!(matches!(
            Rasterizer::new(0, "thumbnail.png", painter()),
            Err(ConfigError::PixelRatio(0))
        ));
        assert!(matches!(
            Rasterizer::from_config(&config().with_pixel_ratio(1)),
            Err(ConfigError::PixelRatio(1))
        ));
        assert_eq!(Rasterizer::new(2, "a.png", painter()).unwrap().pixel_ratio(), 2);
    }

    #[tokio::test]
    async fn corrupt_background_saves_nothing_and_keeps_preview() {
        let config = config();
        let decoded = image::RgbaImage::from_pixel(32, 16, image::Rgba([0, 128, 0, 255]));
        // The upload-time bitmap is fine but the original bytes are truncated.
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let image = UploadedImage::from_parts(7, UploadFormat::Png, bytes, decoded);
        let state = CompositionState::new().apply(Message::SetBackground(image));

        let mut preview = PreviewSurface::new(Painter::new(SvgRasterizer::new(false)));
        preview.present(LayoutRenderer::new(&config).unwrap().render(&state));
        let before = preview.current().unwrap();

        let saver = MemorySaver::new();
        let err = rasterizer(&config).export(&preview, &saver).await.unwrap_err();
        assert!(matches!(err, ExportError::RenderCapture(_)));
        assert!(saver.artifacts().is_empty());
        assert!(Arc::ptr_eq(&before, &preview.current().unwrap()));
    }

    #[tokio::test]
    async fn export_saves_through_directory_saver() {
        let dir = tempfile::tempdir().unwrap();
        let path = rasterizer(&config())
            .export(&presented(), &DirectorySaver::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("thumbnail.png"));
        assert_eq!(&std::fs::read(&path).unwrap()[..8], &PNG_MAGIC);
    }

    #[test]
    fn directory_saver_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path());
        let path = saver.save(&artifact("thumbnail.png")).unwrap();
        assert_eq!(path, dir.path().join("thumbnail.png"));
        assert_eq!(std::fs::read(&path).unwrap(), [1, 2, 3]);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["thumbnail.png"]);
    }

    #[test]
    fn directory_saver_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // A regular file cannot act as the output directory.
        let saver = DirectorySaver::new(blocker.join("nested"));
        assert!(saver.save(&artifact("thumbnail.png")).is_err());
    }

    #[test]
    fn concurrent_directory_saves_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path());
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u8)
                .map(|n| {
                    let saver = saver.clone();
                    scope.spawn(move || {
                        for _ in 0..16 {
                            let mut item = artifact("thumbnail.png");
                            item.bytes = vec![n; 4096];
                            saver.save(&item).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["thumbnail.png"]);
        let written = std::fs::read(dir.path().join("thumbnail.png")).unwrap();
        assert_eq!(written.len(), 4096);
        assert!(written.iter().all(|&b| b == written[0]));
    }

    #[test]
    fn memory_saver_survives_a_poisoned_lock() {
        let saver = MemorySaver::new();
        saver.save(&artifact("a.png")).unwrap();
        let shared = saver.clone();
        let _ = std::thread::spawn(move || {
            let guard = shared.saved.lock().unwrap();
            // Fails while the guard is held, poisoning the mutex.
            assert!(guard.is_empty(), "store already has an artifact");
        })
        .join();
        assert!(saver.saved.is_poisoned());

        saver.save(&artifact("b.png")).unwrap();
        let names: Vec<_> = saver.artifacts().into_iter().map(|a| a.filename).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn memory_saver_keeps_order() {
        let saver = MemorySaver::new();
        saver.save(&artifact("a.png")).unwrap();
        saver.save(&artifact("b.png")).unwrap();
        let names: Vec<_> = saver.artifacts().into_iter().map(|a| a.filename).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }
}
