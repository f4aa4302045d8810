//! Upload validation and decoding.
//!
//! The ingestor checks size before anything else, then the declared type,
//! then sniffs the content and decodes it on a blocking worker so the
//! interactive thread never waits on I/O-bound work.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{ImageFormat, RgbaImage};

use crate::config::{BYTES_PER_MB, ThumbnailConfig};
use crate::error::{IngestError, IngestResult};
use crate::geometry::SizePx;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// UploadedFile
// ============================================================================

/// A user-provided file, as handed over by the file picker.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Declared MIME type. May be empty when the picker could not tell.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type guessed from the file extension, for pickers that
    /// report none.
    pub fn mime_from_extension(name: &str) -> Option<&'static str> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            _ => None,
        }
    }
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadFormat {
    Png,
    Jpeg,
}

impl UploadFormat {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

// ============================================================================
// UploadedImage
// ============================================================================

/// A validated, decoded background image.
///
/// Keeps the original encoded bytes so exports can decode afresh instead
/// of trusting a cached bitmap. Clones share the underlying buffers.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    id: u64,
    format: UploadFormat,
    bytes: Arc<[u8]>,
    decoded: Arc<RgbaImage>,
}

impl UploadedImage {
    /// Unique per successful ingestion.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn format(&self) -> UploadFormat {
        self.format
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Size of the encoded file in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.decoded.width(), self.decoded.height())
    }

    /// The bitmap decoded at ingestion time.
    pub fn decoded(&self) -> &Arc<RgbaImage> {
        &self.decoded
    }

    pub fn encoded_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the original bytes again, bypassing the ingestion bitmap.
    pub fn redecode(&self) -> Result<RgbaImage, image::ImageError> {
        decode(&self.bytes, self.format)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(id: u64, format: UploadFormat, bytes: Vec<u8>, decoded: RgbaImage) -> Self {
        Self {
            id,
            format,
            bytes: Arc::from(bytes),
            decoded: Arc::new(decoded),
        }
    }
}

impl PartialEq for UploadedImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.format == other.format && self.bytes == other.bytes
    }
}

impl Eq for UploadedImage {}

fn decode(bytes: &[u8], format: UploadFormat) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory_with_format(bytes, format.image_format())?.to_rgba8())
}

// ============================================================================
// ImageIngestor
// ============================================================================

/// Validates and decodes uploaded background images.
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    max_bytes: u64,
}

impl ImageIngestor {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self::new(config.max_upload_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks size and type without decoding.
    pub fn validate(&self, file: &UploadedFile) -> IngestResult<UploadFormat> {
        if file.size() > self.max_bytes {
            return Err(IngestError::FileTooLarge {
                limit_mb: self.max_bytes as f64 / BYTES_PER_MB as f64,
                actual_mb: file.size() as f64 / BYTES_PER_MB as f64,
            });
        }

        let declared = if file.mime.trim().is_empty() {
            UploadedFile::mime_from_extension(&file.name).unwrap_or_default()
        } else {
            file.mime.as_str()
        };
        let format = UploadFormat::from_mime(declared)
            .ok_or_else(|| IngestError::UnsupportedType(display_type(declared, &file.name)))?;

        // The picker only filters on extension, so check the content too.
        match image::guess_format(&file.bytes) {
            Ok(ImageFormat::Png) => Ok(UploadFormat::Png),
            Ok(ImageFormat::Jpeg) => Ok(UploadFormat::Jpeg),
            Ok(other) => Err(IngestError::UnsupportedType(format!(
                "{} content in {}",
                other.to_mime_type(),
                format.mime()
            ))),
            Err(_) => Err(IngestError::UnsupportedType(format!(
                "unrecognized content in {}",
                format.mime()
            ))),
        }
    }

    /// Validates and decodes a file.
    ///
    /// Decoding runs on a blocking worker. Failures leave no trace beyond
    /// the returned error and a log line.
    pub async fn ingest(&self, file: UploadedFile) -> IngestResult<UploadedImage> {
        let format = self.validate(&file).inspect_err(|err| {
            tracing::warn!(file = %file.name, error = %err, "upload rejected");
        })?;

        let name = file.name;
        let bytes: Arc<[u8]> = Arc::from(file.bytes);
        let worker_bytes = Arc::clone(&bytes);
        let decoded = tokio::task::spawn_blocking(move || decode(&worker_bytes, format))
            .await
            .map_err(|e| IngestError::Decode(format!("decode worker failed: {e}")))?
            .map_err(|e| IngestError::Decode(e.to_string()))
            .inspect_err(|err| tracing::warn!(file = %name, error = %err, "upload rejected"))?;

        let image = UploadedImage {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            format,
            bytes,
            decoded: Arc::new(decoded),
        };
        tracing::info!(
            file = %name,
            id = image.id,
            bytes = image.size(),
            width = image.dimensions().width,
            height = image.dimensions().height,
            "background image ingested"
        );
        Ok(image)
    }

    /// Ingests the first file of a drop. The drop zone accepts a single file.
    pub async fn ingest_first(
        &self,
        files: impl IntoIterator<Item = UploadedFile>,
    ) -> IngestResult<UploadedImage> {
        let file = files.into_iter().next().ok_or(IngestError::NoFile)?;
        self.ingest(file).await
    }

    /// Reads a file from disk, inferring its type from the extension.
    pub async fn ingest_path(&self, path: impl AsRef<Path>) -> IngestResult<UploadedImage> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let read_error = |source: std::io::Error| {
            let err = IngestError::Read {
                path: path.display().to_string(),
                source,
            };
            tracing::warn!(error = %err, "upload rejected");
            err
        };

        // Check size from metadata before reading the whole file.
        let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
        if !metadata.is_file() {
            return Err(read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        if metadata.len() > self.max_bytes {
            let err = IngestError::FileTooLarge {
                limit_mb: self.max_bytes as f64 / BYTES_PER_MB as f64,
                actual_mb: metadata.len() as f64 / BYTES_PER_MB as f64,
            };
            tracing::warn!(file = %name, error = %err, "upload rejected");
            return Err(err);
        }

        let bytes = tokio::fs::read(path).await.map_err(read_error)?;
        let mime = UploadedFile::mime_from_extension(&name).unwrap_or_default();
        self.ingest(UploadedFile::new(name, mime, bytes)).await
    }
}

impl Default for ImageIngestor {
    fn default() -> Self {
        Self::from_config(&ThumbnailConfig::default())
    }
}

fn display_type(mime: &str, name: &str) -> String {
    if mime.is_empty() {
        format!("unknown type for {name:?}")
    } else {
        mime.to_string()
    }
}
