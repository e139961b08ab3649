//! Transport encoding: raw media bytes → base64 `ImageData`.
//!
//! VLM APIs (OpenAI, Anthropic, Gemini) accept images as base64 data-URIs
//! embedded in the JSON request body. The pipeline always recognises PNG
//! assets (post-transcode or post-composite) because lossless compression
//! preserves glyph crispness — JPEG artefacts on rendered equations degrade
//! recognition accuracy noticeably.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Wrap raw image bytes as base64 `ImageData` ready for the recognition API.
///
/// `detail: "high"` instructs GPT-4-class models to use the full image tile
/// budget; without it, small formula glyphs in a 600-DPI render are lost to
/// the single overview tile.
pub fn encode_media(bytes: &[u8], mime: &str) -> ImageData {
    let b64 = STANDARD.encode(bytes);
    debug!("encoded {} media bytes → {} bytes base64", bytes.len(), b64.len());
    ImageData::new(b64, mime).with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips() {
        let data = encode_media(&[1, 2, 3, 4, 5], "image/png");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(decoded, vec![1, 2, 3, 4, 5]);
    }
}
