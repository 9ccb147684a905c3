//! Types for the extractor module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Audio format produced by extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3, compact and accepted by the transcription API.
    #[default]
    Mp3,
    /// 16 kHz mono PCM WAV.
    Wav,
}

impl AudioFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// FFmpeg audio codec name.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Wav => "pcm_s16le",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            other => Err(format!(
                "Unsupported audio format '{}'. Use 'mp3' or 'wav'.",
                other
            )),
        }
    }
}

/// Information about a media file, as reported by ffprobe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path of the probed file.
    pub path: PathBuf,
    /// Container format name (first entry of ffprobe's list).
    pub format: String,
    /// Duration in seconds, if known.
    pub duration_secs: Option<f64>,
    /// Whether a video stream is present.
    pub has_video: bool,
    /// Whether an audio stream is present.
    pub has_audio: bool,
    /// Codec of the first audio stream.
    pub audio_codec: Option<String>,
    /// Channel count of the first audio stream.
    pub audio_channels: Option<u8>,
    /// Sample rate of the first audio stream.
    pub audio_sample_rate: Option<u32>,
}

impl MediaInfo {
    /// Duration as `M:SS` or `H:MM:SS`.
    pub fn duration_display(&self) -> String {
        let Some(duration) = self.duration_secs else {
            return "unknown".to_string();
        };
        let total = duration as u64;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }
}

/// Result of a successful extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Source media file.
    pub input_path: PathBuf,
    /// Extracted audio file.
    pub output_path: PathBuf,
    /// Duration of the source, if known.
    pub duration_secs: Option<f64>,
    /// Format of the extracted audio.
    pub format: AudioFormat,
    /// Size of the extracted audio in bytes.
    pub size_bytes: u64,
}

impl ExtractionResult {
    /// Output size as a human-readable string.
    pub fn size_display(&self) -> String {
        format_size(self.size_bytes)
    }
}

pub(crate) fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}
