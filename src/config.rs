//! Configuration for the media pipeline.
//!
//! [`MediaConfig`] collects every knob in one immutable value that is
//! handed to [`crate::writer::MediaWriter`]. Build it with
//! [`MediaConfig::builder()`]; `build()` validates the combination once
//! so the writer never has to re-check.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use edgequake_llm::LLMProvider;

use crate::error::Office2MdError;
use crate::pipeline::recognize::{LlmRecognizer, Recognizer};
use crate::pipeline::transcode::{DEFAULT_TRANSCODE_COMMAND, DEFAULT_TRANSCODE_TIMEOUT};

/// Default sampling temperature for recognition calls.
///
/// Low by design: formula transcription and motion captioning want
/// deterministic output, not creative variation.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default completion budget per recognition call.
pub const DEFAULT_MAX_TOKENS: usize = 500;

/// Settings controlling how embedded media is written and recognized.
#[derive(Clone)]
pub struct MediaConfig {
    /// Directory that receives extracted media files. `None` switches the
    /// writer to inline mode: assets are embedded as `data:` URIs and
    /// nothing touches the filesystem outside scratch space.
    pub media_dir: Option<PathBuf>,
    /// Whether likely-formula images are sent for LaTeX recognition.
    /// When `false` they are written as regular image references.
    pub ocr_formulas: bool,
    /// Natural language for animation captions, e.g. `"English"`.
    pub caption_language: String,
    /// Optional extra guidance appended to the caption instruction.
    pub caption_hint: Option<String>,
    /// Recognition backend. `None` means every recognition attempt
    /// degrades to a plain image reference.
    pub recognizer: Option<Arc<dyn Recognizer>>,
    /// Sampling temperature passed to the recognition backend.
    pub temperature: f32,
    /// Completion token budget passed to the recognition backend.
    pub max_tokens: usize,
    /// External command used to convert legacy vector formats to PNG.
    pub transcode_command: String,
    /// Upper bound on a single conversion run, in seconds.
    pub transcode_timeout_secs: u64,
}

impl fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaConfig")
            .field("media_dir", &self.media_dir)
            .field("ocr_formulas", &self.ocr_formulas)
            .field("caption_language", &self.caption_language)
            .field("caption_hint", &self.caption_hint)
            .field("recognizer", &self.recognizer.as_ref().map(|_| "<recognizer>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("transcode_command", &self.transcode_command)
            .field("transcode_timeout_secs", &self.transcode_timeout_secs)
            .finish()
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            media_dir: None,
            ocr_formulas: true,
            caption_language: "English".to_string(),
            caption_hint: None,
            recognizer: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            transcode_command: DEFAULT_TRANSCODE_COMMAND.to_string(),
            transcode_timeout_secs: DEFAULT_TRANSCODE_TIMEOUT.as_secs(),
        }
    }
}

impl MediaConfig {
    /// Start building a configuration.
    pub fn builder() -> MediaConfigBuilder {
        MediaConfigBuilder::default()
    }
}

/// Builder for [`MediaConfig`].
///
/// ```no_run
/// use office2md::MediaConfig;
///
/// let config = MediaConfig::builder()
///     .media_dir("out/media")
///     .caption_language("French")
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct MediaConfigBuilder {
    media_dir: Option<PathBuf>,
    ocr_formulas: Option<bool>,
    caption_language: Option<String>,
    caption_hint: Option<String>,
    recognizer: Option<Arc<dyn Recognizer>>,
    provider: Option<Arc<dyn LLMProvider>>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    transcode_command: Option<String>,
    transcode_timeout_secs: Option<u64>,
}

impl MediaConfigBuilder {
    /// Directory that receives extracted media files. Omitting this
    /// selects inline mode.
    pub fn media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = Some(dir.into());
        self
    }

    /// Toggle LaTeX recognition for likely-formula images.
    pub fn ocr_formulas(mut self, enabled: bool) -> Self {
        self.ocr_formulas = Some(enabled);
        self
    }

    /// Target language for animation captions.
    pub fn caption_language(mut self, language: impl Into<String>) -> Self {
        self.caption_language = Some(language.into());
        self
    }

    /// Extra guidance appended to the caption instruction.
    pub fn caption_hint(mut self, hint: impl Into<String>) -> Self {
        self.caption_hint = Some(hint.into());
        self
    }

    /// Use a custom recognition backend. Takes precedence over
    /// [`provider`](Self::provider).
    pub fn recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Use an already-constructed LLM provider as the recognition
    /// backend. `build()` wraps it in an [`LlmRecognizer`] with the
    /// final temperature and token budget.
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sampling temperature, clamped to `0.0..=2.0`.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    /// Completion token budget per recognition call.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Override the external conversion command (default `magick`).
    pub fn transcode_command(mut self, command: impl Into<String>) -> Self {
        self.transcode_command = Some(command.into());
        self
    }

    /// Upper bound on a single conversion run, in seconds.
    pub fn transcode_timeout_secs(mut self, secs: u64) -> Self {
        self.transcode_timeout_secs = Some(secs);
        self
    }

    /// Validate and produce the final configuration.
    pub fn build(self) -> Result<MediaConfig, Office2MdError> {
        let defaults = MediaConfig::default();

        let max_tokens = self.max_tokens.unwrap_or(defaults.max_tokens);
        if max_tokens == 0 {
            return Err(Office2MdError::InvalidConfig(
                "max_tokens must be at least 1".to_string(),
            ));
        }

        let transcode_timeout_secs = self
            .transcode_timeout_secs
            .unwrap_or(defaults.transcode_timeout_secs);
        if transcode_timeout_secs == 0 {
            return Err(Office2MdError::InvalidConfig(
                "transcode_timeout_secs must be at least 1".to_string(),
            ));
        }

        let temperature = self.temperature.unwrap_or(defaults.temperature);

        let recognizer = match (self.recognizer, self.provider) {
            (Some(recognizer), _) => Some(recognizer),
            (None, Some(provider)) => Some(Arc::new(LlmRecognizer::new(
                provider,
                temperature,
                max_tokens,
            )) as Arc<dyn Recognizer>),
            (None, None) => None,
        };

        Ok(MediaConfig {
            media_dir: self.media_dir,
            ocr_formulas: self.ocr_formulas.unwrap_or(defaults.ocr_formulas),
            caption_language: self
                .caption_language
                .unwrap_or(defaults.caption_language),
            caption_hint: self.caption_hint,
            recognizer,
            temperature,
            max_tokens,
            transcode_command: self
                .transcode_command
                .unwrap_or(defaults.transcode_command),
            transcode_timeout_secs,
        })
    }
}
