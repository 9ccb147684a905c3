//! Types for the catalog module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions of containers that need audio extraction before transcription.
pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "webm", "wmv", "flv"];

/// Extensions of audio files that can be uploaded as-is.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "m4a", "ogg", "wma"];

/// Kind of media file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Classifies a path by its (case-insensitive) extension.
    ///
    /// Returns `None` for unsupported or missing extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Audio)
        } else {
            None
        }
    }

    /// Whether audio has to be extracted before upload.
    pub fn needs_extraction(&self) -> bool {
        matches!(self, Self::Video)
    }
}

/// A media file discovered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Size in bytes at discovery time.
    pub size_bytes: u64,
    /// Audio or video.
    pub kind: MediaKind,
}

impl MediaFile {
    /// Builds a `MediaFile` from a path, reading its size from disk.
    ///
    /// Returns `Ok(None)` when the extension is not supported.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Option<Self>> {
        let path = path.into();
        let Some(kind) = MediaKind::from_path(&path) else {
            return Ok(None);
        };
        let size_bytes = std::fs::metadata(&path)?.len();
        Ok(Some(Self {
            path,
            size_bytes,
            kind,
        }))
    }

    /// File stem used to name outputs.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "transcript".to_string())
    }
}

/// Whether the path has a supported audio or video extension.
pub fn is_supported(path: &Path) -> bool {
    MediaKind::from_path(path).is_some()
}

/// Whether the path has a video extension.
pub fn is_video(path: &Path) -> bool {
    MediaKind::from_path(path) == Some(MediaKind::Video)
}

/// Whether the path has an audio-only extension.
pub fn is_audio(path: &Path) -> bool {
    MediaKind::from_path(path) == Some(MediaKind::Audio)
}

/// All supported extensions, sorted.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = VIDEO_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS.iter())
        .copied()
        .collect();
    all.sort_unstable();
    all
}
