//! Recognition client: one multimodal request per media object.
//!
//! This module is intentionally thin — instruction text lives in
//! [`crate::prompts`], transport encoding in [`crate::pipeline::encode`],
//! so service plumbing can change without touching either.
//!
//! The [`Recognizer`] trait is the seam between the pipeline and the
//! external service: production code wraps an [`edgequake_llm::LLMProvider`],
//! tests substitute a mock. Every call is single-turn and stateless;
//! nothing is retried — a failed recognition degrades the one media object
//! it belongs to and the document moves on.

use crate::error::{Office2MdError, RecognitionFailure};
use crate::pipeline::encode::encode_media;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, warn};

/// A recognition backend: one image plus one instruction in, text out.
///
/// `Err` carries the service's diagnostic text; classification of the
/// failure (and the empty-response check) happens in [`recognize_image`].
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: ImageData, instruction: &str) -> Result<String, String>;
}

/// Production [`Recognizer`] backed by an `edgequake-llm` provider.
pub struct LlmRecognizer {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl LlmRecognizer {
    /// Wrap a pre-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Auto-detect a provider from the environment (`OPENAI_API_KEY`,
    /// `ANTHROPIC_API_KEY`, …) via [`ProviderFactory::from_env`].
    pub fn from_env(temperature: f32, max_tokens: usize) -> Result<Self, Office2MdError> {
        let (provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| Office2MdError::RecognizerNotConfigured {
                hint: format!(
                    "No recognition provider could be auto-detected from environment.\n\
                     Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass a provider explicitly.\n\
                     Error: {e}"
                ),
            })?;
        Ok(Self::new(provider, temperature, max_tokens))
    }

    /// Instantiate a named provider (`"openai"`, `"anthropic"`, …) with a
    /// specific model.
    pub fn with_provider_name(
        name: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<Self, Office2MdError> {
        let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            Office2MdError::RecognizerNotConfigured {
                hint: format!("Provider '{name}' could not be created: {e}"),
            }
        })?;
        Ok(Self::new(provider, temperature, max_tokens))
    }
}

#[async_trait]
impl Recognizer for LlmRecognizer {
    async fn recognize(&self, image: ImageData, instruction: &str) -> Result<String, String> {
        // One user turn carrying both the instruction and the image; the
        // service holds no state between calls.
        let messages = vec![ChatMessage::user_with_images(instruction, vec![image])];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        match self.provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                debug!(
                    "recognition call: {} input tokens, {} output tokens",
                    response.prompt_tokens, response.completion_tokens
                );
                Ok(response.content)
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Run one recognition call over raw asset bytes.
///
/// Returns the trimmed response text on success. The payload is used
/// verbatim downstream — no LaTeX or caption well-formedness validation is
/// performed, so callers must tolerate malformed recognised content.
pub async fn recognize_image(
    recognizer: Option<&Arc<dyn Recognizer>>,
    bytes: &[u8],
    mime: &str,
    instruction: &str,
) -> Result<String, RecognitionFailure> {
    let Some(recognizer) = recognizer else {
        return Err(RecognitionFailure::NoClientConfigured);
    };

    let image = encode_media(bytes, mime);
    match recognizer.recognize(image, instruction).await {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                warn!("recognition service returned an empty response");
                Err(RecognitionFailure::EmptyResponse)
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(detail) => {
            warn!("recognition service error: {detail}");
            Err(RecognitionFailure::ServiceError(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRecognizer(Result<String, String>);

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn recognize(&self, _image: ImageData, _instruction: &str) -> Result<String, String> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn no_client_is_a_distinct_failure() {
        let err = recognize_image(None, &[1, 2, 3], "image/png", "convert")
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionFailure::NoClientConfigured));
    }

    #[tokio::test]
    async fn response_is_trimmed() {
        let rec: Arc<dyn Recognizer> =
            Arc::new(FixedRecognizer(Ok("  $x^2$\n".to_string())));
        let latex = recognize_image(Some(&rec), &[1], "image/png", "convert")
            .await
            .unwrap();
        assert_eq!(latex, "$x^2$");
    }

    #[tokio::test]
    async fn whitespace_only_response_is_empty() {
        let rec: Arc<dyn Recognizer> = Arc::new(FixedRecognizer(Ok("   \n ".to_string())));
        let err = recognize_image(Some(&rec), &[1], "image/png", "convert")
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionFailure::EmptyResponse));
    }

    #[tokio::test]
    async fn service_error_carries_detail() {
        let rec: Arc<dyn Recognizer> =
            Arc::new(FixedRecognizer(Err("HTTP 503".to_string())));
        let err = recognize_image(Some(&rec), &[1], "image/png", "convert")
            .await
            .unwrap_err();
        match err {
            RecognitionFailure::ServiceError(detail) => assert!(detail.contains("503")),
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }
}
