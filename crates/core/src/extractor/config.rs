//! Configuration for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::AudioFormat;

/// Configuration for the FFmpeg-based extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Directory for extracted audio artifacts.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Timeout for a single extraction in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Format of extracted audio.
    #[serde(default)]
    pub audio_format: AudioFormat,

    /// Bitrate for MP3 output (e.g. "192k").
    #[serde(default = "default_bitrate")]
    pub audio_bitrate: String,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("transcribe-extractor")
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_bitrate() -> String {
    "192k".to_string()
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout(),
            audio_format: AudioFormat::default(),
            audio_bitrate: default_bitrate(),
            ffmpeg_log_level: default_log_level(),
        }
    }
}

impl ExtractorConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
