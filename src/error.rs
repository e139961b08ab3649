//! Error types for the office2md media pipeline.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Office2MdError`] — **Fatal**: the document conversion cannot proceed
//!   at all (media directory cannot be created, a required capability is
//!   missing, invalid configuration). Returned as `Err(Office2MdError)` from
//!   the writer's entry points.
//!
//! * [`RecognitionFailure`] — **Non-fatal**: recognition of a single media
//!   object failed (no client configured, transform broke, service error).
//!   The object degrades to plain-image handling, the failure is counted in
//!   [`crate::media::MediaStats`], and the rest of the document continues.
//!
//! Nothing in the media pipeline is retried automatically; every per-object
//! failure falls back to the next-safest representation rather than aborting
//! the document.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the office2md library.
///
/// Per-media-object recognition failures use [`RecognitionFailure`] and are
/// absorbed by the writer rather than propagated here.
#[derive(Debug, Error)]
pub enum Office2MdError {
    // ── Capability errors ─────────────────────────────────────────────────
    /// A capability the conversion depends on is absent (e.g. the caller's
    /// document-parsing layer). Fatal for the whole document.
    #[error("Required capability '{feature}' is unavailable.\n{hint}")]
    MissingDependency { feature: String, hint: String },

    /// No recognition client could be constructed from the environment.
    #[error("No recognition client is configured.\n{hint}")]
    RecognizerNotConfigured { hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The media output directory could not be created.
    #[error("Failed to create media directory '{}': {source}", path.display())]
    MediaDirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A media file could not be written to its assigned path.
    #[error("Failed to write media file '{}': {source}", path.display())]
    MediaWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal recognition failure for a single media object.
///
/// Each variant is terminal for that one recognition call — the writer falls
/// back to saving or inlining the asset as a plain image and the document
/// conversion continues.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum RecognitionFailure {
    /// No recognition client was supplied in the configuration.
    #[error("no recognition client configured")]
    NoClientConfigured,

    /// Transcoding or frame compositing failed before the service was called.
    #[error("media transform failed: {0}")]
    TransformFailed(String),

    /// The recognition service itself returned an error.
    #[error("recognition service error: {0}")]
    ServiceError(String),

    /// The service answered, but with an empty payload.
    #[error("recognition service returned an empty response")]
    EmptyResponse,
}
