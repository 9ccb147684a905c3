//! Persisting formatted transcripts.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::OutputError;
use super::format::{format_transcript, OutputFormat};
use crate::transcription::TranscriptionResult;

/// Saves transcripts somewhere.
#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Serializes `result` as `format` and stores it at `path`.
    ///
    /// Returns the path actually written.
    async fn save(
        &self,
        result: &TranscriptionResult,
        path: &Path,
        format: OutputFormat,
    ) -> Result<PathBuf, OutputError>;
}

/// Writes transcripts to the local filesystem, creating parent directories.
#[derive(Debug, Clone, Default)]
pub struct FsOutputWriter;

impl FsOutputWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputWriter for FsOutputWriter {
    async fn save(
        &self,
        result: &TranscriptionResult,
        path: &Path,
        format: OutputFormat,
    ) -> Result<PathBuf, OutputError> {
        let content = format_transcript(result, format)?;

        let write_failed = |source| OutputError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }
        tokio::fs::write(path, content).await.map_err(write_failed)?;

        Ok(path.to_path_buf())
    }
}
