//! Transcript serialization and persistence.
//!
//! Supported formats are plain text and SubRip (`.srt`) subtitles.

mod error;
mod format;
mod writer;

pub use error::OutputError;
pub use format::{format_srt, format_srt_timestamp, format_transcript, format_txt, OutputFormat};
pub use writer::{FsOutputWriter, OutputWriter};
