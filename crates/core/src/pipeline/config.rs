//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extractor::{AudioFormat, ExtractorConfig};
use crate::output::OutputFormat;
use crate::transcription::{ProviderConfig, DEFAULT_MAX_UPLOAD_BYTES};

use super::types::RunConfig;

/// Batch settings from the `[batch]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum jobs running at once (1..=20).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Output representation.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Language code, or "auto".
    #[serde(default = "default_language")]
    pub language: String,

    /// Output directory. Transcripts go next to their inputs when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Whether directory scans descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,

    /// Skip inputs whose transcript already exists.
    #[serde(default)]
    pub skip_existing: bool,
}

fn default_concurrency() -> usize {
    5
}

fn default_language() -> String {
    "auto".to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            output_format: OutputFormat::default(),
            language: default_language(),
            output_dir: None,
            recursive: false,
            skip_existing: false,
        }
    }
}

impl BatchConfig {
    /// Per-run settings derived from this section.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            output_dir: self.output_dir.clone(),
            format: self.output_format,
            language: self.language.clone(),
            skip_existing: self.skip_existing,
        }
    }
}

/// Settings a [`JobPipeline`](super::JobPipeline) needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Parent directory of per-job temp directories.
    pub temp_dir: PathBuf,
    /// Format of extracted audio.
    pub audio_format: AudioFormat,
    /// Largest payload sent to the provider.
    pub max_upload_bytes: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("transcribe-extractor"),
            audio_format: AudioFormat::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl PipelineSettings {
    /// Settings from the extractor and provider sections.
    pub fn from_sections(extractor: &ExtractorConfig, provider: &ProviderConfig) -> Self {
        Self {
            temp_dir: extractor.temp_dir.clone(),
            audio_format: extractor.audio_format,
            max_upload_bytes: provider.max_upload_bytes,
        }
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Sets the upload limit.
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
