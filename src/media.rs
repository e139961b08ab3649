//! Core data types: media objects, content fingerprints, conversion statistics.
//!
//! A [`MediaObject`] is the unit of work handed to the pipeline by the
//! document-traversal layer: the raw embedded bytes plus whatever metadata
//! the container format declared for them. It is immutable once constructed —
//! every downstream transformation (transcoding, frame compositing) produces
//! new bytes rather than mutating the source object.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::info;

/// One embedded binary media object discovered during document traversal.
#[derive(Debug, Clone)]
pub struct MediaObject {
    /// Raw bytes exactly as stored in the source document.
    pub bytes: Vec<u8>,
    /// Declared MIME content type, e.g. `image/png` or `image/x-wmf`.
    pub content_type: String,
    /// Original filename inside the container, when the format records one.
    pub filename: Option<String>,
    /// Author-supplied alternative text / description, when present.
    pub description: Option<String>,
}

impl MediaObject {
    /// Create a media object from raw bytes and a declared content type.
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            filename: None,
            description: None,
        }
    }

    /// Attach the filename recorded in the source container.
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    /// Attach the author-supplied description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Byte length of the raw media data.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the media object carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-case file extension, inferred from the filename when present,
    /// otherwise from the declared content type. Defaults to `png` when
    /// neither source yields anything usable.
    pub fn extension(&self) -> String {
        if let Some(ref name) = self.filename {
            if let Some(ext) = Path::new(name).extension() {
                return ext.to_string_lossy().to_ascii_lowercase();
            }
        }
        match self.content_type.to_ascii_lowercase().as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/x-wmf" | "image/wmf" => "wmf",
            "image/x-emf" | "image/emf" => "emf",
            "image/bmp" => "bmp",
            "image/tiff" => "tif",
            "image/svg+xml" => "svg",
            _ => "png",
        }
        .to_string()
    }
}

/// A SHA-256 digest of media bytes, used only as a recognition-cache key.
///
/// Fingerprints are computed over the asset *actually sent for recognition*
/// (post-transcoding / post-compositing), not over the source-document bytes,
/// so two WMF embeds that rasterise identically share one recognition call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    /// Fingerprint the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Full lower-case hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First eight hex chars are plenty to identify a fingerprint in logs.
        write!(f, "ContentFingerprint({}…)", &self.to_hex()[..8])
    }
}

/// Counters accumulated over one document conversion.
///
/// Purely observational — nothing in the pipeline branches on these values.
/// Reported once at the end of the document via [`MediaStats::log_summary`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaStats {
    /// Media objects seen, regardless of classification.
    pub total_media: usize,
    /// Objects classified `likely-formula`.
    pub formula_detected: usize,
    /// Objects classified `likely-animation`.
    pub animation_detected: usize,
    /// Formula recognitions that returned usable LaTeX.
    pub ocr_success: usize,
    /// Formula recognitions that failed (any [`crate::error::RecognitionFailure`]).
    pub ocr_failed: usize,
    /// Formula recognitions satisfied from the fingerprint cache.
    pub ocr_cached: usize,
    /// Animation captions successfully generated.
    pub caption_success: usize,
    /// Animation caption attempts that failed.
    pub caption_failed: usize,
}

impl MediaStats {
    /// Log a one-shot summary of the document's media processing.
    pub fn log_summary(&self) {
        info!(
            "media processed: {} total, {} formulas ({} recognised, {} cached, {} failed), \
             {} animations ({} captioned, {} failed)",
            self.total_media,
            self.formula_detected,
            self.ocr_success,
            self.ocr_cached,
            self.ocr_failed,
            self.animation_detected,
            self.caption_success,
            self.caption_failed,
        );
    }
}
