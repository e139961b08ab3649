//! # office2md
//!
//! Resolve embedded media while converting office documents (DOCX, PPTX)
//! to Markdown, using a Vision Language Model (VLM) for the parts plain
//! extraction gets wrong.
//!
//! ## Why this crate?
//!
//! Office documents embed media that naive extraction mangles: equations
//! stored as WMF/EMF metafiles come out as opaque binary blobs, animated
//! GIFs lose their motion, and every image ends up as a dead reference.
//! Instead this crate classifies each embedded object, converts legacy
//! vector formats to PNG, composites animation key frames, and lets a VLM
//! read the result — producing LaTeX for formulas and motion captions for
//! animations, with plain image references as the always-available
//! fallback.
//!
//! ## Pipeline Overview
//!
//! ```text
//! embedded object
//!  │
//!  ├─ 1. Classify   likely-formula / likely-animation / regular image
//!  ├─ 2. Transcode  WMF/EMF → PNG via ImageMagick (30 s cap, fail-safe)
//!  ├─ 3. Composite  GIF → three key frames side by side
//!  ├─ 4. Recognize  single VLM call → LaTeX or motion caption (cached)
//!  ├─ 5. Write      sequential media_NNN files or inline data: URIs
//!  └─ 6. Resolve    placeholder markers → literal text, one final pass
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use office2md::{MediaConfig, MediaObject, MediaWriter, resolve_placeholders};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MediaConfig::builder()
//!         .media_dir("out/media")
//!         .build()?;
//!     let mut writer = MediaWriter::new(config)?;
//!
//!     // One call per embedded object, in document order.
//!     let object = MediaObject::new(std::fs::read("equation.wmf")?, "image/x-wmf");
//!     let substitution = writer.write_media(&object).await?;
//!
//!     // Splice substitutions into the document text, then resolve
//!     // markers exactly once on the assembled result.
//!     let markdown = resolve_placeholders(&substitution);
//!     println!("{markdown}");
//!
//!     let stats = writer.finish();
//!     eprintln!("media: {} total, {} formulas", stats.total_media, stats.formula_detected);
//!     Ok(())
//! }
//! ```
//!
//! ## Recognition backends
//!
//! By default no recognizer is configured and every recognition attempt
//! degrades to a plain image reference. Wire one up with
//! [`MediaConfigBuilder::provider`](config::MediaConfigBuilder::provider)
//! (any `edgequake_llm` provider), with
//! [`LlmRecognizer::from_env`](pipeline::recognize::LlmRecognizer::from_env)
//! for auto-detection from `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` /
//! `GEMINI_API_KEY`, or implement the [`Recognizer`] trait yourself.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod prompts;
pub mod resolver;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MediaConfig, MediaConfigBuilder};
pub use error::{Office2MdError, RecognitionFailure};
pub use media::{ContentFingerprint, MediaObject, MediaStats};
pub use pipeline::classify::ClassificationVerdict;
pub use pipeline::recognize::{LlmRecognizer, Recognizer};
pub use resolver::{equation_marker, formula_marker, resolve_placeholders};
pub use writer::MediaWriter;
