//! Format transcoding: WMF/EMF → PNG via an external ImageMagick process.
//!
//! No pure-Rust decoder for the Windows Metafile family exists, so the
//! pipeline shells out to `magick` with fixed high-quality parameters:
//! 600 DPI (the default 72 renders equation glyphs illegibly small), an
//! opaque white background with the alpha channel removed (metafiles are
//! frequently transparent and vision models misread dark-on-transparent
//! glyphs), RGB colorspace, and maximum PNG quality.
//!
//! Transcoding is strictly best-effort: a missing binary, a non-zero exit,
//! or a timeout downgrades to the original asset with a warning. Callers
//! must treat "transcoding failed" as "proceed with the pre-transcode
//! asset", never as a hard error.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default conversion binary name; resolvable via `PATH`.
pub const DEFAULT_TRANSCODE_COMMAND: &str = "magick";

/// Default bound on one external conversion run.
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(30);

/// Why one external conversion run failed. Internal to the pipeline —
/// callers only ever see the fallback path, plus a logged warning.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The conversion binary is not installed or not on `PATH`.
    #[error("conversion command '{0}' not found in PATH")]
    CommandNotFound(String),

    /// The process ran but did not produce the output file.
    #[error("conversion exited with {status}: {stderr}")]
    ConversionFailed { status: String, stderr: String },

    /// The process exceeded the configured timeout and was abandoned.
    #[error("conversion timed out after {0:?}")]
    Timeout(Duration),

    /// Spawning or reaping the process failed for another reason.
    #[error("conversion process error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wraps the external raster-conversion process with fixed parameters
/// and a bounded timeout.
#[derive(Debug, Clone)]
pub struct Transcoder {
    command: String,
    timeout: Duration,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self {
            command: DEFAULT_TRANSCODE_COMMAND.to_string(),
            timeout: DEFAULT_TRANSCODE_TIMEOUT,
        }
    }
}

impl Transcoder {
    /// Create a transcoder with an explicit command name and timeout.
    /// Tests point `command` at a nonexistent binary to exercise fallback.
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Convert `input` (WMF/EMF) to a PNG at `output`.
    ///
    /// Contract with the external process: exit code 0 *and* output-file
    /// existence imply success; anything else is a failure with the
    /// process's diagnostic text preserved for the log.
    pub async fn to_png(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        debug!(
            "transcoding {} → {} via '{}'",
            input.display(),
            output.display(),
            self.command
        );

        let run = Command::new(&self.command)
            .arg("-density")
            .arg("600")
            .arg(input)
            .arg("-background")
            .arg("white")
            .arg("-alpha")
            .arg("remove")
            .arg("-colorspace")
            .arg("RGB")
            .arg("-quality")
            .arg("100")
            .arg(output)
            .kill_on_drop(true)
            .output();

        let result = match tokio::time::timeout(self.timeout, run).await {
            Ok(r) => r,
            Err(_) => return Err(TranscodeError::Timeout(self.timeout)),
        };

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscodeError::CommandNotFound(self.command.clone()));
            }
            Err(e) => return Err(TranscodeError::Io(e)),
        };

        if out.status.success() && output.exists() {
            Ok(())
        } else {
            Err(TranscodeError::ConversionFailed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }

    /// Best-effort conversion: returns `output` on success, or the original
    /// `input` path (logging a warning) on any failure.
    pub async fn to_png_or_keep(&self, input: &Path, output: &Path) -> PathBuf {
        match self.to_png(input, output).await {
            Ok(()) => output.to_path_buf(),
            Err(e) => {
                warn!("transcoding failed for {}, keeping original: {e}", input.display());
                input.to_path_buf()
            }
        }
    }
}
