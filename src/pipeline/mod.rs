//! Pipeline stages for embedded-media resolution.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different conversion backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ transcode ──▶ frames ──▶ encode ──▶ recognize
//! (verdict)    (WMF→PNG)     (GIF→3up)  (base64)   (VLM call)
//! ```
//!
//! 1. [`classify`]  — verdict from content-type, extension, byte length
//! 2. [`transcode`] — legacy vector → PNG via external process, bounded
//!    timeout, best-effort fallback
//! 3. [`frames`]    — animated GIF → deterministic three-frame composite
//! 4. [`encode`]    — base64-wrap asset bytes for the multimodal request body
//! 5. [`recognize`] — drive the recognition call; the only stage with
//!    network I/O
//!
//! The [`crate::writer`] orchestrates these stages per media object; the
//! [`crate::resolver`] later turns the markers it emits back into literal
//! text.

pub mod classify;
pub mod encode;
pub mod frames;
pub mod recognize;
pub mod transcode;
