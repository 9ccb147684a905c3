//! Trait definitions for the transcription module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscriptionError;
use super::types::TranscriptionResult;

/// A speech-to-text backend.
///
/// Implementations perform exactly one request per call; retrying is the
/// job of [`super::RetryingTranscriptionClient`].
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Returns the name of this provider implementation.
    fn name(&self) -> &str;

    /// Transcribes the audio file at `audio_path`.
    ///
    /// `language` is an ISO-639-1 hint; `None` lets the provider detect it.
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError>;
}
