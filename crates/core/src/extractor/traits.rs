//! Trait definitions for the extractor module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ExtractorError;
use super::types::{AudioFormat, ExtractionResult, MediaInfo};

/// Something that can pull an audio track out of a media file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Probes a media file for its streams and duration.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ExtractorError>;

    /// Extracts the audio of `input` into `output` using `format`.
    ///
    /// Fails with `NoAudioStream` when the input carries no audio.
    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<ExtractionResult, ExtractorError>;

    /// Validates that the extractor's tooling is installed and usable.
    async fn validate(&self) -> Result<(), ExtractorError>;
}
