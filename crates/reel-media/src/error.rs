//! Error types and render failure classification.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Render output missing: {0}")]
    OutputMissing(PathBuf),

    #[error("Render output truncated: {path} is {size} bytes")]
    OutputTooSmall { path: PathBuf, size: u64 },

    #[error("FFmpeg timed out after {0} seconds")]
    Timeout(u64),

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Captured stderr, when the failure carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            MediaError::FfmpegFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// Classify this failure for the job record.
    pub fn render_kind(&self) -> RenderErrorKind {
        match self {
            MediaError::FfmpegFailed { stderr, .. } => {
                classify_stderr(stderr.as_deref().unwrap_or(""))
            }
            MediaError::OutputMissing(_) | MediaError::OutputTooSmall { .. } => {
                RenderErrorKind::AssetMissing
            }
            MediaError::Timeout(_) => RenderErrorKind::ResourceExhaustion,
            _ => RenderErrorKind::Unknown,
        }
    }
}

/// Stable classification of render failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    AssetMissing,
    TimingMismatch,
    CodecFailure,
    ResourceExhaustion,
    Unknown,
}

impl RenderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderErrorKind::AssetMissing => "asset_missing",
            RenderErrorKind::TimingMismatch => "timing_mismatch",
            RenderErrorKind::CodecFailure => "codec_failure",
            RenderErrorKind::ResourceExhaustion => "resource_exhaustion",
            RenderErrorKind::Unknown => "unknown_error",
        }
    }
}

impl std::fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Match captured stderr against known failure signatures.
pub fn classify_stderr(stderr: &str) -> RenderErrorKind {
    let lowered = stderr.to_lowercase();

    const ASSET_MARKERS: [&str; 4] = [
        "no such file",
        "does not exist",
        "permission denied",
        "invalid data found when processing input",
    ];
    const TIMING_MARKERS: [&str; 3] = [
        "non monotonically increasing dts",
        "invalid duration",
        "timestamps are unset",
    ];
    const CODEC_MARKERS: [&str; 3] = [
        "unknown encoder",
        "error while opening encoder",
        "incorrect codec parameters",
    ];
    const RESOURCE_MARKERS: [&str; 3] = [
        "cannot allocate memory",
        "no space left on device",
        "too many open files",
    ];

    if ASSET_MARKERS.iter().any(|m| lowered.contains(m)) {
        RenderErrorKind::AssetMissing
    } else if TIMING_MARKERS.iter().any(|m| lowered.contains(m)) {
        RenderErrorKind::TimingMismatch
    } else if CODEC_MARKERS.iter().any(|m| lowered.contains(m)) {
        RenderErrorKind::CodecFailure
    } else if RESOURCE_MARKERS.iter().any(|m| lowered.contains(m)) {
        RenderErrorKind::ResourceExhaustion
    } else {
        RenderErrorKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            classify_stderr("clip.mp4: No such file or directory"),
            RenderErrorKind::AssetMissing
        );
        assert_eq!(
            classify_stderr("Application provided invalid, non monotonically increasing dts"),
            RenderErrorKind::TimingMismatch
        );
        assert_eq!(
            classify_stderr("Unknown encoder 'libx264'"),
            RenderErrorKind::CodecFailure
        );
        assert_eq!(
            classify_stderr("Cannot allocate memory"),
            RenderErrorKind::ResourceExhaustion
        );
        assert_eq!(
            classify_stderr("something exotic happened"),
            RenderErrorKind::Unknown
        );
    }

    #[test]
    fn test_output_errors_classify_as_asset() {
        let err = MediaError::OutputMissing(PathBuf::from("/tmp/out.mp4"));
        assert_eq!(err.render_kind(), RenderErrorKind::AssetMissing);
    }
}
