//! Audio extraction from media containers.
//!
//! This module provides the `AudioExtractor` trait and an FFmpeg-backed
//! implementation. Video containers are reduced to a single audio track that
//! the transcription API accepts.
//!
//! # Example
//!
//! ```ignore
//! use transcribe_core::extractor::{AudioExtractor, AudioFormat, FfmpegExtractor};
//!
//! let extractor = FfmpegExtractor::with_defaults();
//! extractor.validate().await?;
//!
//! let info = extractor.probe(Path::new("/media/talk.mkv")).await?;
//! println!("Duration: {}", info.duration_display());
//!
//! let result = extractor
//!     .extract(Path::new("/media/talk.mkv"), Path::new("/tmp/talk.mp3"), AudioFormat::Mp3)
//!     .await?;
//! println!("Extracted {} to {:?}", result.size_display(), result.output_path);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use ffmpeg::{parse_ffmpeg_version, FfmpegExtractor, FfmpegVersion, MIN_FFMPEG_VERSION};
pub use traits::AudioExtractor;
pub use types::{AudioFormat, ExtractionResult, MediaInfo};
