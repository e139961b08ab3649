//! Per-document media writer.
//!
//! [`MediaWriter`] owns all per-document state (name counter, recognition
//! cache, statistics, scratch space) and drives one embedded object at a
//! time through the pipeline stages: classify, transcode, composite,
//! recognize. Each [`write_media`](MediaWriter::write_media) call returns
//! the Markdown substitution for that object.
//!
//! File-system failures are fatal and propagate as [`Office2MdError`];
//! recognition failures are not, and degrade to a plain image reference
//! so conversion always produces a complete document.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::error::{Office2MdError, RecognitionFailure};
use crate::media::{ContentFingerprint, MediaObject, MediaStats};
use crate::pipeline::classify::{self, ClassificationVerdict};
use crate::pipeline::frames;
use crate::pipeline::recognize::recognize_image;
use crate::pipeline::transcode::{Transcoder, TranscodeError};
use crate::prompts::{animation_caption_instruction, FORMULA_INSTRUCTION};
use crate::resolver::formula_marker;

/// An asset persisted for the current document.
///
/// `file_name` is `Some` only when the asset lives in the configured
/// media directory; inline-mode assets stay in scratch space and are
/// referenced by `data:` URI instead.
struct StoredAsset {
    file_name: Option<String>,
    path: PathBuf,
    bytes: Vec<u8>,
    mime: String,
}

/// Mutable state accumulated over one document.
#[derive(Default)]
struct WriterState {
    counter: usize,
    names: HashMap<String, PathBuf>,
    cache: HashMap<ContentFingerprint, String>,
    stats: MediaStats,
    scratch: Option<TempDir>,
}

/// Writes embedded media objects and produces their Markdown
/// substitutions.
pub struct MediaWriter {
    config: MediaConfig,
    dir_label: String,
    transcoder: Transcoder,
    state: WriterState,
}

impl MediaWriter {
    /// Create a writer for one document, creating the media directory
    /// if one is configured.
    pub fn new(config: MediaConfig) -> Result<Self, Office2MdError> {
        if let Some(dir) = &config.media_dir {
            std::fs::create_dir_all(dir).map_err(|source| {
                Office2MdError::MediaDirCreateFailed {
                    path: dir.clone(),
                    source,
                }
            })?;
        }
        let dir_label = config
            .media_dir
            .as_ref()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        let transcoder = Transcoder::new(
            config.transcode_command.clone(),
            Duration::from_secs(config.transcode_timeout_secs),
        );
        Ok(Self {
            config,
            dir_label,
            transcoder,
            state: WriterState::default(),
        })
    }

    /// Process one embedded object and return its Markdown substitution.
    ///
    /// The substitution is either a formula marker (resolved later by
    /// [`crate::resolver::resolve_placeholders`]) or a finished image
    /// reference.
    pub async fn write_media(
        &mut self,
        object: &MediaObject,
    ) -> Result<String, Office2MdError> {
        self.state.stats.total_media += 1;
        let verdict = classify::classify(object);
        debug!(?verdict, size = object.len(), "processing embedded media");

        match verdict {
            ClassificationVerdict::LikelyFormula if self.config.ocr_formulas => {
                self.state.stats.formula_detected += 1;
                self.write_formula(object).await
            }
            ClassificationVerdict::LikelyFormula => {
                self.state.stats.formula_detected += 1;
                debug!("formula recognition disabled, storing as regular image");
                self.write_regular(object).await
            }
            ClassificationVerdict::LikelyAnimation => {
                self.state.stats.animation_detected += 1;
                self.write_animation(object).await
            }
            ClassificationVerdict::RegularImage => self.write_regular(object).await,
        }
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &MediaStats {
        &self.state.stats
    }

    /// Files written to the media directory, keyed by assigned name.
    /// Empty in inline mode.
    pub fn saved_media(&self) -> &HashMap<String, PathBuf> {
        &self.state.names
    }

    /// Log a summary, release scratch space and return the final
    /// statistics.
    pub fn finish(self) -> MediaStats {
        self.state.stats.log_summary();
        self.state.stats
    }

    async fn write_formula(
        &mut self,
        object: &MediaObject,
    ) -> Result<String, Office2MdError> {
        let name = self.next_name();
        let ext = object.extension();
        let mut asset = self
            .store(
                format!("{name}.{ext}"),
                object.bytes.clone(),
                object.content_type.clone(),
            )
            .await?;

        if classify::is_legacy_vector(&ext) {
            match self.transcode_stored(&name, &asset).await {
                Ok(png) => {
                    self.discard(&asset).await;
                    asset = png;
                }
                // Recognition still gets a chance with the original
                // bytes; a failed conversion only costs image fidelity.
                Err(e) => warn!("conversion of {name}.{ext} to PNG failed: {e}"),
            }
        }

        let fingerprint = ContentFingerprint::of(&asset.bytes);
        if let Some(latex) = self.state.cache.get(&fingerprint) {
            debug!(?fingerprint, "formula recognition cache hit");
            self.state.stats.ocr_cached += 1;
            return Ok(formula_marker(latex));
        }

        match recognize_image(
            self.config.recognizer.as_ref(),
            &asset.bytes,
            &asset.mime,
            FORMULA_INSTRUCTION,
        )
        .await
        {
            Ok(latex) => {
                self.state.cache.insert(fingerprint, latex.clone());
                self.state.stats.ocr_success += 1;
                Ok(formula_marker(&latex))
            }
            Err(failure) => {
                self.state.stats.ocr_failed += 1;
                warn!("formula recognition failed: {failure}");
                Ok(self.asset_reference(&asset, ""))
            }
        }
    }

    async fn write_animation(
        &mut self,
        object: &MediaObject,
    ) -> Result<String, Office2MdError> {
        let gif_name = self.next_name();
        let original = self
            .store(
                format!("{gif_name}.gif"),
                object.bytes.clone(),
                "image/gif".to_string(),
            )
            .await?;

        let composite = match frames::composite_key_frames(&object.bytes) {
            Ok(png) => {
                let png_name = self.next_name();
                Some(
                    self.store(format!("{png_name}.png"), png, "image/png".to_string())
                        .await?,
                )
            }
            Err(e) => {
                warn!("key-frame compositing failed for {gif_name}.gif: {e}");
                None
            }
        };

        let outcome = match &composite {
            Some(asset) => {
                let instruction = animation_caption_instruction(
                    &self.config.caption_language,
                    self.config.caption_hint.as_deref(),
                );
                recognize_image(
                    self.config.recognizer.as_ref(),
                    &asset.bytes,
                    &asset.mime,
                    &instruction,
                )
                .await
            }
            None => Err(RecognitionFailure::TransformFailed(
                "key-frame composite unavailable".to_string(),
            )),
        };

        let caption = match outcome {
            Ok(text) => {
                self.state.stats.caption_success += 1;
                Some(text)
            }
            Err(failure) => {
                self.state.stats.caption_failed += 1;
                warn!("animation captioning failed: {failure}");
                None
            }
        };

        let alt = combined_alt(caption.as_deref(), object.description.as_deref());
        let display = composite.as_ref().unwrap_or(&original);
        Ok(self.asset_reference(display, &alt))
    }

    async fn write_regular(
        &mut self,
        object: &MediaObject,
    ) -> Result<String, Office2MdError> {
        let name = self.next_name();
        let ext = object.extension();
        let asset = self
            .store(
                format!("{name}.{ext}"),
                object.bytes.clone(),
                object.content_type.clone(),
            )
            .await?;
        let alt = sanitize_alt(object.description.as_deref().unwrap_or(""));
        Ok(self.asset_reference(&asset, &alt))
    }

    /// Next sequential asset name: `media_001`, `media_002`, ...
    fn next_name(&mut self) -> String {
        self.state.counter += 1;
        format!("media_{:03}", self.state.counter)
    }

    /// Directory receiving asset files: the configured media directory,
    /// or a lazily created scratch directory in inline mode.
    fn target_dir(&mut self) -> Result<PathBuf, Office2MdError> {
        if let Some(dir) = &self.config.media_dir {
            return Ok(dir.clone());
        }
        if self.state.scratch.is_none() {
            let dir = TempDir::new().map_err(|source| {
                Office2MdError::MediaDirCreateFailed {
                    path: std::env::temp_dir(),
                    source,
                }
            })?;
            self.state.scratch = Some(dir);
        }
        self.state
            .scratch
            .as_ref()
            .map(|dir| dir.path().to_path_buf())
            .ok_or_else(|| Office2MdError::Internal("scratch directory unavailable".to_string()))
    }

    async fn store(
        &mut self,
        file_name: String,
        bytes: Vec<u8>,
        mime: String,
    ) -> Result<StoredAsset, Office2MdError> {
        let dir = self.target_dir()?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await.map_err(|source| {
            Office2MdError::MediaWriteFailed {
                path: path.clone(),
                source,
            }
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "stored media asset");

        let named = self.config.media_dir.is_some();
        if named {
            self.state.names.insert(file_name.clone(), path.clone());
        }
        Ok(StoredAsset {
            file_name: named.then_some(file_name),
            path,
            bytes,
            mime,
        })
    }

    /// Convert a stored legacy-vector asset to PNG next to it, keeping
    /// the same sequential name.
    async fn transcode_stored(
        &mut self,
        name: &str,
        input: &StoredAsset,
    ) -> Result<StoredAsset, TranscodeError> {
        let png_name = format!("{name}.png");
        let output = input.path.with_file_name(&png_name);
        self.transcoder.to_png(&input.path, &output).await?;
        let bytes = tokio::fs::read(&output).await.map_err(TranscodeError::Io)?;

        let named = self.config.media_dir.is_some();
        if named {
            self.state.names.insert(png_name.clone(), output.clone());
        }
        Ok(StoredAsset {
            file_name: named.then_some(png_name),
            path: output,
            bytes,
            mime: "image/png".to_string(),
        })
    }

    /// Remove an asset that was superseded by its transcoded form.
    async fn discard(&mut self, asset: &StoredAsset) {
        if let Some(file_name) = &asset.file_name {
            self.state.names.remove(file_name);
        }
        if let Err(e) = tokio::fs::remove_file(&asset.path).await {
            debug!("could not remove superseded asset {}: {e}", asset.path.display());
        }
    }

    fn asset_reference(&self, asset: &StoredAsset, alt: &str) -> String {
        match &asset.file_name {
            Some(file_name) => format!("![{alt}]({}/{file_name})", self.dir_label),
            None => format!(
                "![{alt}](data:{};base64,{})",
                asset.mime,
                STANDARD.encode(&asset.bytes)
            ),
        }
    }
}

/// Make text safe for a Markdown alt slot: drop line breaks and square
/// brackets, collapse whitespace runs.
fn sanitize_alt(text: &str) -> String {
    text.replace(['\r', '\n', '[', ']'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join a recognized caption with any authored description, skipping
/// blank parts.
fn combined_alt(caption: Option<&str>, description: Option<&str>) -> String {
    let parts: Vec<&str> = [caption, description]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();
    sanitize_alt(&parts.join(" "))
}
