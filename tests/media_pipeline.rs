//! End-to-end tests for the embedded-media pipeline.
//!
//! These run fully offline: a mock recognizer stands in for the VLM, and
//! the conversion command is pointed at a name that does not exist so the
//! fail-safe path is exercised deterministically.
//!
//! Run with:
//!   cargo test --test media_pipeline -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use edgequake_llm::ImageData;
use office2md::{
    resolve_placeholders, MediaConfig, MediaObject, MediaWriter, Recognizer,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Recognizer that answers from canned text and counts its calls.
struct MockRecognizer {
    calls: AtomicUsize,
}

impl MockRecognizer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, _image: ImageData, instruction: &str) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if instruction.contains("LaTeX") {
            Ok("$E = mc^2$".to_string())
        } else {
            Ok("A red square fades to blue.".to_string())
        }
    }
}

fn config_with_mock(
    media_dir: std::path::PathBuf,
    recognizer: Arc<MockRecognizer>,
) -> MediaConfig {
    MediaConfig::builder()
        .media_dir(media_dir)
        .recognizer(recognizer)
        .transcode_command("office2md-missing-converter-for-tests")
        .build()
        .unwrap()
}

/// Minimal WMF header bytes; enough for extension-based classification.
fn wmf_object() -> MediaObject {
    MediaObject::new(vec![0xD7, 0xCD, 0xC6, 0x9A, 0x00, 0x00], "image/x-wmf")
        .with_filename("equation1.wmf")
}

fn six_frame_gif() -> Vec<u8> {
    use image::codecs::gif::GifEncoder;
    use image::{Frame, Rgba, RgbaImage};

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        for step in 0u8..6 {
            let shade = step * 40;
            let img = RgbaImage::from_pixel(8, 8, Rgba([255 - shade, 0, shade, 255]));
            encoder.encode_frame(Frame::new(img)).unwrap();
        }
    }
    bytes
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mixed_document_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = MockRecognizer::new();
    let config = config_with_mock(tmp.path().join("media"), recognizer.clone());
    let mut writer = MediaWriter::new(config).unwrap();

    let formula_sub = writer.write_media(&wmf_object()).await.unwrap();
    let photo_sub = writer
        .write_media(&MediaObject::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg"))
        .await
        .unwrap();
    let animation_sub = writer
        .write_media(&MediaObject::new(six_frame_gif(), "image/gif"))
        .await
        .unwrap();

    assert_eq!(formula_sub, "![](LATEX_FORMULA:$E = mc^2$)");
    assert_eq!(photo_sub, "![](media/media_002.jpg)");
    assert!(
        animation_sub.contains("media/media_004.png"),
        "animation substitution should reference the composite: {animation_sub}"
    );
    assert!(
        animation_sub.contains("A red square fades to blue."),
        "animation substitution should carry the caption: {animation_sub}"
    );

    // The GIF keeps its own sequential name, the composite the next one.
    assert!(tmp.path().join("media/media_003.gif").exists());
    assert!(tmp.path().join("media/media_004.png").exists());

    // Markers disappear in the final pass, literal LaTeX remains.
    let document = format!("{formula_sub}\n\n{photo_sub}\n\n{animation_sub}\n");
    let resolved = resolve_placeholders(&document);
    assert!(!resolved.contains("LATEX_FORMULA"));
    assert!(resolved.contains("$E = mc^2$"));

    // One formula call plus one caption call.
    assert_eq!(recognizer.calls(), 2);

    let stats = writer.finish();
    assert_eq!(stats.total_media, 3);
    assert_eq!(stats.formula_detected, 1);
    assert_eq!(stats.animation_detected, 1);
    assert_eq!(stats.ocr_success, 1);
    assert_eq!(stats.caption_success, 1);
    assert_eq!(stats.ocr_failed, 0);
}

#[tokio::test]
async fn test_repeated_formula_hits_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let recognizer = MockRecognizer::new();
    let config = config_with_mock(tmp.path().join("media"), recognizer.clone());
    let mut writer = MediaWriter::new(config).unwrap();

    let first = writer.write_media(&wmf_object()).await.unwrap();
    let second = writer.write_media(&wmf_object()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(recognizer.calls(), 1, "second formula must come from cache");

    let stats = writer.finish();
    assert_eq!(stats.ocr_success, 1);
    assert_eq!(stats.ocr_cached, 1);
}

#[tokio::test]
async fn test_inline_mode_keeps_filesystem_clean() {
    let recognizer = MockRecognizer::new();
    let config = MediaConfig::builder()
        .recognizer(recognizer.clone())
        .transcode_command("office2md-missing-converter-for-tests")
        .build()
        .unwrap();
    let mut writer = MediaWriter::new(config).unwrap();

    let photo_sub = writer
        .write_media(&MediaObject::new(vec![1, 2, 3, 4], "image/png"))
        .await
        .unwrap();
    let formula_sub = writer.write_media(&wmf_object()).await.unwrap();

    assert!(photo_sub.starts_with("![](data:image/png;base64,"));
    // Formulas still resolve to LaTeX markers in inline mode.
    assert_eq!(formula_sub, "![](LATEX_FORMULA:$E = mc^2$)");
    assert!(writer.saved_media().is_empty());
}

#[tokio::test]
async fn test_no_recognizer_degrades_gracefully() {
    let tmp = tempfile::tempdir().unwrap();
    let config = MediaConfig::builder()
        .media_dir(tmp.path().join("media"))
        .transcode_command("office2md-missing-converter-for-tests")
        .build()
        .unwrap();
    let mut writer = MediaWriter::new(config).unwrap();

    let formula_sub = writer.write_media(&wmf_object()).await.unwrap();
    let animation_sub = writer
        .write_media(&MediaObject::new(six_frame_gif(), "image/gif"))
        .await
        .unwrap();

    // Both fall back to plain references; conversion never aborts.
    assert_eq!(formula_sub, "![](media/media_001.wmf)");
    assert!(animation_sub.contains("media/media_003.png"));

    let stats = writer.finish();
    assert_eq!(stats.ocr_failed, 1);
    assert_eq!(stats.caption_failed, 1);
}

#[tokio::test]
async fn test_caption_language_and_hint_reach_instruction() {
    struct InstructionCapture(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl Recognizer for InstructionCapture {
        async fn recognize(
            &self,
            _image: ImageData,
            instruction: &str,
        ) -> Result<String, String> {
            self.0.lock().unwrap().push(instruction.to_string());
            Ok("Une balle rebondit.".to_string())
        }
    }

    let capture = Arc::new(InstructionCapture(std::sync::Mutex::new(Vec::new())));
    let tmp = tempfile::tempdir().unwrap();
    let config = MediaConfig::builder()
        .media_dir(tmp.path().join("media"))
        .recognizer(capture.clone())
        .caption_language("French")
        .caption_hint("The deck is about physics.")
        .build()
        .unwrap();
    let mut writer = MediaWriter::new(config).unwrap();

    writer
        .write_media(&MediaObject::new(six_frame_gif(), "image/gif"))
        .await
        .unwrap();

    let instructions = capture.0.lock().unwrap();
    assert_eq!(instructions.len(), 1);
    assert!(instructions[0].contains("French"));
    assert!(instructions[0].contains("The deck is about physics."));
}
