//! Mock audio extractor for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::extractor::{AudioExtractor, AudioFormat, ExtractionResult, ExtractorError, MediaInfo};

/// How the mock answers an extraction request for a given input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorBehavior {
    /// Write a placeholder audio file.
    Succeed,
    /// Report that the input carries no audio.
    NoAudio,
    /// Fail with an extraction error carrying this reason.
    Fail(String),
    /// Panic inside the extraction call.
    Panic,
}

#[derive(Debug)]
struct ExtractorState {
    behaviors: HashMap<PathBuf, ExtractorBehavior>,
    extractions: Vec<(PathBuf, PathBuf)>,
    output_size: usize,
}

/// Mock implementation of the `AudioExtractor` trait.
///
/// Successful extractions write `output_size` placeholder bytes to the
/// requested output path, so callers can observe and clean up real files.
#[derive(Debug, Clone)]
pub struct MockExtractor {
    state: Arc<Mutex<ExtractorState>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    /// Create a mock that succeeds for every input.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ExtractorState {
                behaviors: HashMap::new(),
                extractions: Vec::new(),
                output_size: 2048,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ExtractorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the behavior for an input path.
    pub fn set_behavior(&self, input: impl AsRef<Path>, behavior: ExtractorBehavior) {
        self.state()
            .behaviors
            .insert(input.as_ref().to_path_buf(), behavior);
    }

    /// Size of the placeholder audio written on success.
    pub fn set_output_size(&self, bytes: usize) {
        self.state().output_size = bytes;
    }

    /// `(input, output)` pairs of every extraction request.
    pub fn extractions(&self) -> Vec<(PathBuf, PathBuf)> {
        self.state().extractions.clone()
    }

    /// Number of extraction requests.
    pub fn extraction_count(&self) -> usize {
        self.state().extractions.len()
    }

    fn behavior_for(&self, input: &Path) -> ExtractorBehavior {
        self.state()
            .behaviors
            .get(input)
            .cloned()
            .unwrap_or(ExtractorBehavior::Succeed)
    }
}

#[async_trait]
impl AudioExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ExtractorError> {
        let has_audio = self.behavior_for(path) != ExtractorBehavior::NoAudio;
        Ok(MediaInfo {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
            duration_secs: Some(90.0),
            has_video: true,
            has_audio,
            audio_codec: has_audio.then(|| "aac".to_string()),
            audio_channels: has_audio.then_some(2),
            audio_sample_rate: has_audio.then_some(48000),
        })
    }

    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<ExtractionResult, ExtractorError> {
        let output_size = {
            let mut state = self.state();
            state
                .extractions
                .push((input.to_path_buf(), output.to_path_buf()));
            state.output_size
        };

        match self.behavior_for(input) {
            ExtractorBehavior::Succeed => {}
            ExtractorBehavior::NoAudio => {
                return Err(ExtractorError::NoAudioStream {
                    path: input.to_path_buf(),
                })
            }
            ExtractorBehavior::Fail(reason) => {
                return Err(ExtractorError::extraction_failed(reason, None))
            }
            ExtractorBehavior::Panic => panic!("mock extractor panic for {}", input.display()),
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, vec![0u8; output_size]).await?;

        Ok(ExtractionResult {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            duration_secs: Some(90.0),
            format,
            size_bytes: output_size as u64,
        })
    }

    async fn validate(&self) -> Result<(), ExtractorError> {
        Ok(())
    }
}
