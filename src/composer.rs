//! Composition engine: state, preview and uploads in one place.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::{AbortHandle, JoinHandle};

use crate::badge::{Badge, BadgeCatalog};
use crate::color::AccentColor;
use crate::config::ThumbnailConfig;
use crate::error::{ConfigError, ExportResult, IngestError, IngestResult, ProfileError};
use crate::export::{ExportArtifact, FileSaver, Rasterizer};
use crate::layer::{Painter, SvgRasterizer};
use crate::layout::{LayoutRenderer, RenderedLayout};
use crate::preview::PreviewSurface;
use crate::profile::ThumbnailProfile;
use crate::state::{CompositionState, Message};
use crate::upload::{ImageIngestor, UploadedFile, UploadedImage};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Types that can be configured from a [`ThumbnailProfile`].
pub trait Configurable {
    /// Applies a profile's settings. On error nothing is changed.
    fn apply_profile(&mut self, profile: &ThumbnailProfile) -> Result<(), ProfileError>;

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> ThumbnailProfile;
}

// ============================================================================
// Uploads
// ============================================================================

/// Identifies one upload attempt. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadTicket(u64);

/// An upload decoding in the background.
#[derive(Debug)]
pub struct PendingUpload {
    ticket: UploadTicket,
    handle: JoinHandle<IngestResult<UploadedImage>>,
}

impl PendingUpload {
    pub fn ticket(&self) -> UploadTicket {
        self.ticket
    }

    /// Waits for the decode to finish. An upload cancelled by a newer one
    /// resolves to [`IngestError::Superseded`].
    pub async fn wait(self) -> (UploadTicket, IngestResult<UploadedImage>) {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(IngestError::Superseded),
            Err(err) => Err(IngestError::Decode(format!("decode worker failed: {err}"))),
        };
        (self.ticket, result)
    }
}

/// What [`Composer::finish_upload`] did with a completed upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The image became the background.
    Applied,
    /// A newer upload was started in the meantime; the result was dropped.
    Stale,
}

// ============================================================================
// Composer
// ============================================================================

/// Callback invoked with every newly presented layout.
pub type LayoutListener = Box<dyn FnMut(&RenderedLayout) + Send>;

/// Owns the composition state and keeps the preview in sync with it.
///
/// Every change goes through [`dispatch`](Self::dispatch): the reducer
/// produces a new snapshot, the layout is rendered and presented, and
/// subscribers are notified.
///
/// # Example
///
/// ```
/// use thumbnail_composer::{AccentColor, Composer, ThumbnailConfig};
///
/// let config = ThumbnailConfig::default().with_system_fonts(false);
/// let mut composer = Composer::new(&config).unwrap();
/// composer.set_title("Hello");
/// composer.toggle_badge("React").unwrap();
/// composer.set_accent(AccentColor::Black);
///
/// assert_eq!(composer.state().badges.identifiers(), ["React"]);
/// ```
pub struct Composer {
    state: CompositionState,
    renderer: LayoutRenderer,
    preview: PreviewSurface,
    rasterizer: Rasterizer,
    ingestor: ImageIngestor,
    catalog: BadgeCatalog,
    listeners: Vec<LayoutListener>,
    upload_generation: u64,
    inflight: Option<AbortHandle>,
    upload_error: Option<String>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("upload_generation", &self.upload_generation)
            .field("upload_error", &self.upload_error)
            .finish_non_exhaustive()
    }
}

impl Composer {
    /// Creates a composer with the built-in badge catalog and presents the
    /// empty composition.
    pub fn new(config: &ThumbnailConfig) -> Result<Self, ConfigError> {
        Self::with_catalog(config, BadgeCatalog::builtin())
    }

    pub fn with_catalog(config: &ThumbnailConfig, catalog: BadgeCatalog) -> Result<Self, ConfigError> {
        let renderer = LayoutRenderer::new(config)?;
        let painter = Painter::new(SvgRasterizer::new(config.load_system_fonts));
        let mut composer = Self {
            state: CompositionState::new(),
            renderer,
            preview: PreviewSurface::new(painter.clone()),
            rasterizer: Rasterizer::new(
                config.pixel_ratio,
                config.export_filename.clone(),
                painter,
            )?,
            ingestor: ImageIngestor::from_config(config),
            catalog,
            listeners: Vec::new(),
            upload_generation: 0,
            inflight: None,
            upload_error: None,
        };
        composer.refresh();
        Ok(composer)
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewSurface {
        &mut self.preview
    }

    pub fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Message from the last rejected upload, cleared by the next
    /// successful one.
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// Registers a callback for every presented layout.
    pub fn subscribe(&mut self, listener: impl FnMut(&RenderedLayout) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Applies `message`, re-renders and notifies subscribers.
    pub fn dispatch(&mut self, message: Message) -> Arc<RenderedLayout> {
        let kind = message.kind();
        self.state = self.state.apply(message);
        tracing::debug!(message = kind, "composition updated");
        self.refresh()
    }

    fn refresh(&mut self) -> Arc<RenderedLayout> {
        let layout = Arc::new(self.renderer.render(&self.state));
        self.preview.present(Arc::clone(&layout));
        for listener in &mut self.listeners {
            listener(&layout);
        }
        layout
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.dispatch(Message::SetTitle(title.into()));
    }

    pub fn set_accent(&mut self, accent: AccentColor) {
        self.dispatch(Message::SetAccent(accent));
    }

    pub fn toggle(&mut self, badge: &Badge) {
        self.dispatch(Message::ToggleBadge(badge.clone()));
    }

    /// Toggles a catalog badge by identifier.
    pub fn toggle_badge(&mut self, id: &str) -> Result<(), ProfileError> {
        let badge = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| ProfileError::UnknownBadge(id.to_string()))?;
        self.dispatch(Message::ToggleBadge(badge));
        Ok(())
    }

    pub fn clear_background(&mut self) {
        self.dispatch(Message::ClearBackground);
    }

    // ------------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------------

    /// Starts decoding `file` in the background, cancelling any upload
    /// still in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn begin_upload(&mut self, file: UploadedFile) -> PendingUpload {
        let ingestor = self.ingestor.clone();
        self.start_upload(async move { ingestor.ingest(file).await })
    }

    /// Like [`begin_upload`](Self::begin_upload), reading the file from disk.
    pub fn begin_upload_path(&mut self, path: impl Into<PathBuf>) -> PendingUpload {
        let ingestor = self.ingestor.clone();
        let path = path.into();
        self.start_upload(async move { ingestor.ingest_path(path).await })
    }

    fn start_upload<F>(&mut self, work: F) -> PendingUpload
    where
        F: Future<Output = IngestResult<UploadedImage>> + Send + 'static,
    {
        if let Some(previous) = self.inflight.take() {
            previous.abort();
            tracing::debug!(generation = self.upload_generation, "previous upload cancelled");
        }
        self.upload_generation += 1;
        let handle = tokio::spawn(work);
        self.inflight = Some(handle.abort_handle());
        PendingUpload {
            ticket: UploadTicket(self.upload_generation),
            handle,
        }
    }

    /// Applies a completed upload unless a newer one has been started.
    ///
    /// Errors from the current upload are recorded for
    /// [`upload_error`](Self::upload_error); the background is untouched.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: IngestResult<UploadedImage>,
    ) -> IngestResult<UploadOutcome> {
        if ticket.0 != self.upload_generation {
            tracing::info!(
                ticket = ticket.0,
                latest = self.upload_generation,
                "stale upload ignored"
            );
            return Ok(UploadOutcome::Stale);
        }
        self.inflight = None;
        match result {
            Ok(image) => {
                self.upload_error = None;
                self.dispatch(Message::SetBackground(image));
                Ok(UploadOutcome::Applied)
            }
            Err(err) => {
                self.upload_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Uploads `file` and waits for the result.
    pub async fn upload(&mut self, file: UploadedFile) -> IngestResult<UploadOutcome> {
        let (ticket, result) = self.begin_upload(file).wait().await;
        self.finish_upload(ticket, result)
    }

    /// Uploads a file from disk and waits for the result.
    pub async fn upload_path(&mut self, path: impl Into<PathBuf>) -> IngestResult<UploadOutcome> {
        let (ticket, result) = self.begin_upload_path(path).wait().await;
        self.finish_upload(ticket, result)
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    /// Captures the presented layout without saving it.
    pub async fn export_artifact(&self) -> ExportResult<ExportArtifact> {
        self.rasterizer.export_current_layout(&self.preview).await
    }

    /// Captures the presented layout and hands it to `saver`.
    pub async fn export<S>(&self, saver: &S) -> ExportResult<PathBuf>
    where
        S: FileSaver + Clone + Send + 'static,
    {
        self.rasterizer.export(&self.preview, saver).await
    }
}

impl Configurable for Composer {
    fn apply_profile(&mut self, profile: &ThumbnailProfile) -> Result<(), ProfileError> {
        let badges = profile.selection(&self.catalog)?;
        if self.state.title != profile.title {
            self.dispatch(Message::SetTitle(profile.title.clone()));
        }
        if self.state.accent != profile.accent {
            self.dispatch(Message::SetAccent(profile.accent));
        }
        if self.state.badges != badges {
            self.dispatch(Message::SetBadges(badges));
        }
        Ok(())
    }

    fn export_profile(&self) -> ThumbnailProfile {
        ThumbnailProfile::new()
            .with_title(self.state.title.clone())
            .with_accent(self.state.accent)
            .with_badges(self.state.badges.identifiers())
    }
}

// ============================================================================
// Tests
// ============================================================================
