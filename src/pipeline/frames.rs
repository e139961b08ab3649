//! Key-frame extraction: animated GIF → one static three-frame composite.
//!
//! A vision model cannot watch an animation, but it can read three
//! temporally ordered snapshots laid out side by side. The extractor picks
//! the first, temporal-middle, and last frames and composites them
//! horizontally into a single PNG — deterministic for a given input, so
//! repeated conversions of the same document produce identical assets.

use image::codecs::gif::GifDecoder;
use image::{imageops, AnimationDecoder, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Why a composite could not be produced. Callers fall back to the
/// animation's first static representation (the GIF itself).
#[derive(Debug, Error)]
pub enum FrameError {
    /// The bytes could not be decoded as an animated GIF.
    #[error("GIF decode failed: {0}")]
    DecodeFailed(#[from] image::ImageError),

    /// The file decoded but contains no frames.
    #[error("animation has no frames")]
    NoFrames,
}

/// Indices of the three key frames for an `n`-frame animation:
/// first, temporal middle, last.
///
/// The middle index is `n/2 - 1` for even `n` and `n/2` for odd `n`
/// (integer division) — for an even count the earlier of the two central
/// frames is chosen.
pub fn key_frame_indices(n: usize) -> Option<[usize; 3]> {
    if n == 0 {
        return None;
    }
    let middle = if n % 2 == 0 { n / 2 - 1 } else { n / 2 };
    Some([0, middle, n - 1])
}

/// Decode an animated GIF and composite its three key frames side by side
/// into one PNG.
///
/// The output raster is `3 × frame-width` wide and `frame-height` tall,
/// RGBA, with the frames pasted left to right in temporal order.
pub fn composite_key_frames(gif_bytes: &[u8]) -> Result<Vec<u8>, FrameError> {
    let decoder = GifDecoder::new(Cursor::new(gif_bytes))?;
    let frames = decoder.into_frames().collect_frames()?;

    let indices = key_frame_indices(frames.len()).ok_or(FrameError::NoFrames)?;
    let (width, height) = frames[indices[0]].buffer().dimensions();
    debug!(
        "compositing frames {:?} of {} ({}x{} each)",
        indices,
        frames.len(),
        width,
        height
    );

    let mut canvas = RgbaImage::new(width * 3, height);
    for (slot, &idx) in indices.iter().enumerate() {
        imageops::replace(
            &mut canvas,
            frames[idx].buffer(),
            slot as i64 * i64::from(width),
            0,
        );
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
