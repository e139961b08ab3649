//! Content classification: decide what kind of asset a media object is.
//!
//! The classifier is a pure function over declared metadata — content type,
//! inferred extension, byte length. It never inspects pixel data, so it is
//! cheap enough to run on every object and fully deterministic.
//!
//! It is a heuristic, not a guarantee: a false negative degrades gracefully
//! to plain-image handling, a false positive costs one discarded recognition
//! call. Both outcomes are acceptable; an exception here would not be.

use crate::media::MediaObject;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Media objects above this size are never treated as formula candidates —
/// equation embeds are consistently small, photos and screenshots are not.
pub const FORMULA_SIZE_CUTOFF: usize = 100 * 1024;

/// The classifier's verdict for one media object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationVerdict {
    /// Legacy vector format (WMF/EMF) — almost always an equation or
    /// diagram object embed. Candidate for LaTeX recognition.
    LikelyFormula,
    /// Animated raster (GIF) — candidate for key-frame compositing and
    /// motion captioning.
    LikelyAnimation,
    /// Everything else: save or inline as-is.
    RegularImage,
}

/// Classify a media object from its metadata. First matching rule wins:
///
/// 1. WMF/EMF extension or content type ⇒ [`ClassificationVerdict::LikelyFormula`]
/// 2. GIF extension or content type ⇒ [`ClassificationVerdict::LikelyAnimation`]
/// 3. Larger than [`FORMULA_SIZE_CUTOFF`] ⇒ [`ClassificationVerdict::RegularImage`]
/// 4. Default ⇒ [`ClassificationVerdict::RegularImage`]
pub fn classify(object: &MediaObject) -> ClassificationVerdict {
    let content_type = object.content_type.to_ascii_lowercase();
    let ext = object.extension();

    if is_legacy_vector(&ext) || content_type.contains("wmf") || content_type.contains("emf") {
        return ClassificationVerdict::LikelyFormula;
    }

    if ext == "gif" || content_type.contains("gif") {
        return ClassificationVerdict::LikelyAnimation;
    }

    if object.len() > FORMULA_SIZE_CUTOFF {
        debug!(
            "media is {} bytes (> {} cutoff), treating as regular image",
            object.len(),
            FORMULA_SIZE_CUTOFF
        );
        return ClassificationVerdict::RegularImage;
    }

    ClassificationVerdict::RegularImage
}

/// Whether a file extension names a legacy vector format that needs
/// transcoding before display or recognition.
pub fn is_legacy_vector(ext: &str) -> bool {
    matches!(ext.to_ascii_lowercase().as_str(), "wmf" | "emf")
}
