//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during audio extraction.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// FFmpeg or FFprobe binary is missing.
    #[error("{tool} is not installed or not in PATH (looked for {path})")]
    ToolUnavailable { tool: String, path: PathBuf },

    /// Installed FFmpeg is older than the supported minimum.
    #[error("FFmpeg version {found} is too old, minimum required version is {required}")]
    UnsupportedVersion { found: String, required: String },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The container has no audio stream to extract.
    #[error("No audio stream found in file: {path}")]
    NoAudioStream { path: PathBuf },

    /// FFmpeg ran but did not produce usable output.
    #[error("Audio extraction failed: {reason}")]
    ExtractionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Extraction timed out.
    #[error("Audio extraction timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// I/O error during extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Creates an extraction failed error with optional stderr output.
    pub fn extraction_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExtractionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a tool unavailable error.
    pub fn tool_unavailable(tool: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_audio_stream_message_names_stream() {
        let err = ExtractorError::NoAudioStream {
            path: PathBuf::from("/media/silent.mp4"),
        };
        let msg = err.to_string();
        assert!(msg.contains("No audio stream"));
        assert!(msg.contains("silent.mp4"));
    }

    #[test]
    fn test_tool_unavailable_message() {
        let err = ExtractorError::tool_unavailable("ffmpeg", "/usr/bin/ffmpeg");
        assert!(err.to_string().starts_with("ffmpeg is not installed"));
    }
}
