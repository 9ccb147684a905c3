//! FFmpeg-based extractor implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::ExtractorConfig;
use super::error::ExtractorError;
use super::traits::AudioExtractor;
use super::types::{AudioFormat, ExtractionResult, MediaInfo};

/// Oldest FFmpeg release accepted by [`FfmpegExtractor::validate`].
pub const MIN_FFMPEG_VERSION: (u32, u32) = (4, 0);

static RELEASE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ffmpeg version n?(\d+)\.(\d+)").expect("valid regex"));
static DEV_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ffmpeg version N-(\d+)").expect("valid regex"));

/// Version reported by `ffmpeg -version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfmpegVersion {
    /// Tagged release such as `6.1.1` or `n5.1`.
    Release { major: u32, minor: u32 },
    /// Nightly build identified only by revision (`N-109421-g...`).
    Development { revision: u32 },
}

impl FfmpegVersion {
    /// Whether this version satisfies `min`. Development builds always do.
    pub fn meets(&self, min: (u32, u32)) -> bool {
        match *self {
            Self::Release { major, minor } => (major, minor) >= min,
            Self::Development { .. } => true,
        }
    }
}

impl std::fmt::Display for FfmpegVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Release { major, minor } => write!(f, "{}.{}", major, minor),
            Self::Development { revision } => write!(f, "N-{}", revision),
        }
    }
}

/// Parses the version out of `ffmpeg -version` output.
pub fn parse_ffmpeg_version(output: &str) -> Option<FfmpegVersion> {
    if let Some(caps) = DEV_VERSION.captures(output) {
        let revision = caps.get(1)?.as_str().parse().ok()?;
        return Some(FfmpegVersion::Development { revision });
    }
    let caps = RELEASE_VERSION.captures(output)?;
    Some(FfmpegVersion::Release {
        major: caps.get(1)?.as_str().parse().ok()?,
        minor: caps.get(2)?.as_str().parse().ok()?,
    })
}

/// FFmpeg-based extractor implementation.
pub struct FfmpegExtractor {
    config: ExtractorConfig,
}

impl FfmpegExtractor {
    /// Creates a new FFmpeg extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Creates an extractor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for audio extraction.
    fn build_args(&self, input: &Path, output: &Path, format: AudioFormat) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(), // Drop video
            "-c:a".to_string(),
            format.ffmpeg_codec().to_string(),
        ];

        match format {
            AudioFormat::Mp3 => {
                args.extend(["-b:a".to_string(), self.config.audio_bitrate.clone()]);
            }
            AudioFormat::Wav => {
                // 16 kHz mono is plenty for speech
                args.extend([
                    "-ar".to_string(),
                    "16000".to_string(),
                    "-ac".to_string(),
                    "1".to_string(),
                ]);
            }
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.push(output.to_string_lossy().to_string());
        args
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, ExtractorError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            format: Option<ProbeFormat>,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: Option<String>,
            duration: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            codec_name: Option<String>,
            sample_rate: Option<String>,
            channels: Option<u8>,
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            ExtractorError::probe_failed(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let is_type = |s: &ProbeStream, t: &str| s.codec_type.as_deref() == Some(t);
        let audio_stream = probe.streams.iter().find(|s| is_type(s, "audio"));
        let has_video = probe.streams.iter().any(|s| is_type(s, "video"));

        let format = probe
            .format
            .as_ref()
            .and_then(|f| f.format_name.as_deref())
            .and_then(|n| n.split(',').next())
            .unwrap_or("unknown")
            .to_string();

        let duration_secs = probe
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|d| d.parse::<f64>().ok());

        Ok(MediaInfo {
            path: path.to_path_buf(),
            format,
            duration_secs,
            has_video,
            has_audio: audio_stream.is_some(),
            audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
            audio_channels: audio_stream.and_then(|s| s.channels),
            audio_sample_rate: audio_stream
                .and_then(|s| s.sample_rate.as_ref())
                .and_then(|r| r.parse::<u32>().ok()),
        })
    }

    fn spawn_error(&self, tool: &str, path: &Path, e: std::io::Error) -> ExtractorError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractorError::tool_unavailable(tool, path)
        } else {
            ExtractorError::Io(e)
        }
    }

    /// Runs `ffmpeg -version` and returns the parsed version.
    pub async fn version(&self) -> Result<FfmpegVersion, ExtractorError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error("ffmpeg", &self.config.ffmpeg_path, e))?;

        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };

        parse_ffmpeg_version(&text).ok_or_else(|| {
            ExtractorError::extraction_failed(
                format!(
                    "Could not parse FFmpeg version from: {}",
                    text.chars().take(100).collect::<String>()
                ),
                None,
            )
        })
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ExtractorError> {
        if !path.exists() {
            return Err(ExtractorError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error("ffprobe", &self.config.ffprobe_path, e))?;

        if !output.status.success() {
            return Err(ExtractorError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<ExtractionResult, ExtractorError> {
        let info = self.probe(input).await?;
        if !info.has_audio {
            return Err(ExtractorError::NoAudioStream {
                path: input.to_path_buf(),
            });
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|_| {
                ExtractorError::OutputDirectoryFailed {
                    path: parent.to_path_buf(),
                }
            })?;
        }

        let args = self.build_args(input, output, format);
        debug!(input = %input.display(), output = %output.display(), "Running ffmpeg");

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error("ffmpeg", &self.config.ffmpeg_path, e))?;

        // Dropping the child on timeout kills the process.
        let result = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await;

        let process_output = match result {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => return Err(ExtractorError::Io(e)),
            Err(_) => {
                return Err(ExtractorError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !process_output.status.success() {
            let stderr = String::from_utf8_lossy(&process_output.stderr)
                .trim()
                .to_string();
            return Err(ExtractorError::extraction_failed(
                format!(
                    "FFmpeg exited with code {:?}: {}",
                    process_output.status.code(),
                    if stderr.is_empty() { "Unknown error" } else { stderr.as_str() }
                ),
                (!stderr.is_empty()).then_some(stderr.clone()),
            ));
        }

        let meta = tokio::fs::metadata(output).await.map_err(|_| {
            ExtractorError::extraction_failed(
                format!("Output file was not created: {}", output.display()),
                None,
            )
        })?;

        Ok(ExtractionResult {
            input_path: input.to_path_buf(),
            output_path: PathBuf::from(output),
            duration_secs: info.duration_secs,
            format,
            size_bytes: meta.len(),
        })
    }

    async fn validate(&self) -> Result<(), ExtractorError> {
        let version = self.version().await?;
        if !version.meets(MIN_FFMPEG_VERSION) {
            return Err(ExtractorError::UnsupportedVersion {
                found: version.to_string(),
                required: format!("{}.{}", MIN_FFMPEG_VERSION.0, MIN_FFMPEG_VERSION.1),
            });
        }

        let ffprobe_result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;
        if let Err(e) = ffprobe_result {
            return Err(self.spawn_error("ffprobe", &self.config.ffprobe_path, e));
        }

        tokio::fs::create_dir_all(&self.config.temp_dir).await?;

        Ok(())
    }
}
