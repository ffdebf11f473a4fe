//! Upload payloads and local pre-flight validation.
//!
//! Validation runs before any network call; a rejected upload never reaches
//! the inference service.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Maximum accepted upload size (50 MiB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];
const VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/quicktime",
    "video/x-msvideo",
];

/// Local rejection of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File is empty")]
    Empty,

    #[error("File too large: {size} bytes (maximum {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Expected {expected} file, got {actual}")]
    WrongKind { expected: MediaKind, actual: MediaKind },
}

/// Media family of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if IMAGE_TYPES.contains(&essence.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_TYPES.contains(&essence.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A binary payload destined for the inference service.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Upload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for_path(path).unwrap_or("application/octet-stream");

        Ok(Self::new(filename, content_type, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::from_content_type(&self.content_type)
    }

    /// Check size and type. Returns the media kind on success.
    pub fn validate(&self) -> Result<MediaKind, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::Empty);
        }
        if self.len() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::TooLarge {
                size: self.len(),
                max: MAX_UPLOAD_BYTES,
            });
        }
        self.media_kind()
            .ok_or_else(|| ValidationError::UnsupportedType(self.content_type.clone()))
    }

    /// Validate and additionally require a specific media kind.
    pub fn validate_as(&self, expected: MediaKind) -> Result<(), ValidationError> {
        let actual = self.validate()?;
        if actual != expected {
            return Err(ValidationError::WrongKind { expected, actual });
        }
        Ok(())
    }
}

/// MIME type for a file path, by extension.
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "mp4" => Some("video/mp4"),
        "avi" => Some("video/x-msvideo"),
        "mov" => Some("video/quicktime"),
        _ => None,
    }
}
