//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the extractor and
//! transcription provider traits, so batches can be exercised end to end
//! without FFmpeg or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use transcribe_core::testing::{MockExtractor, MockProvider, ProviderBehavior};
//!
//! let extractor = MockExtractor::new();
//! let provider = MockProvider::new();
//! provider.set_behavior("/media/bad.mp3", ProviderBehavior::AlwaysFail(err));
//!
//! let pipeline = fixtures::pipeline(&extractor, &provider, temp_dir);
//! ```

mod mock_extractor;
mod mock_provider;

pub use mock_extractor::{ExtractorBehavior, MockExtractor};
pub use mock_provider::{MockProvider, ProviderBehavior};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use super::{MockExtractor, MockProvider};
    use crate::catalog::MediaFile;
    use crate::output::FsOutputWriter;
    use crate::pipeline::{JobPipeline, PipelineSettings};
    use crate::transcription::{RetryPolicy, RetryingTranscriptionClient};

    /// Write a small placeholder media file and return its catalog entry.
    pub fn media_file(dir: &Path, name: &str) -> MediaFile {
        let path = dir.join(name);
        std::fs::write(&path, b"not really media").expect("write fixture");
        MediaFile::from_path(path)
            .expect("stat fixture")
            .expect("supported extension")
    }

    /// Write several placeholder media files.
    pub fn media_files(dir: &Path, names: &[&str]) -> Vec<MediaFile> {
        names.iter().map(|name| media_file(dir, name)).collect()
    }

    /// A pipeline wired to the given mocks with millisecond retry delays.
    pub fn pipeline(extractor: &MockExtractor, provider: &MockProvider, temp_dir: PathBuf) -> JobPipeline {
        JobPipeline::new(
            Arc::new(extractor.clone()),
            RetryingTranscriptionClient::new(Arc::new(provider.clone()), RetryPolicy::fast()),
            Arc::new(FsOutputWriter::new()),
            PipelineSettings::default().with_temp_dir(temp_dir),
        )
    }
}
