//! Output formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::OutputError;
use crate::transcription::TranscriptionResult;

/// Representation a transcript is saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text.
    #[default]
    Txt,
    /// SubRip subtitles with timestamps.
    Srt,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Srt => "srt",
        }
    }

    /// Whether the format needs timing information.
    pub fn requires_timing(&self) -> bool {
        matches!(self, Self::Srt)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "srt" => Ok(Self::Srt),
            other => Err(format!(
                "Unsupported format '{}'. Use 'txt' or 'srt'.",
                other
            )),
        }
    }
}

/// Formats seconds as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Plain text: the transcript with surrounding whitespace removed.
pub fn format_txt(result: &TranscriptionResult) -> String {
    result.text.trim().to_string()
}

/// SubRip subtitles, one cue per segment.
///
/// Without segments, a single cue spanning the whole duration is produced.
/// Fails when neither segments nor text plus duration are available.
pub fn format_srt(result: &TranscriptionResult) -> Result<String, OutputError> {
    let mut out = String::new();

    if result.segments.is_empty() {
        let text = result.text.trim();
        match result.duration {
            Some(duration) if !text.is_empty() => {
                push_cue(&mut out, 1, 0.0, duration, text);
                return Ok(out);
            }
            _ => {
                return Err(OutputError::SerializationFailed {
                    format: "SRT".to_string(),
                    reason: "no segments available. The transcription may not have timestamp information".to_string(),
                })
            }
        }
    }

    for (i, segment) in result.segments.iter().enumerate() {
        push_cue(&mut out, i + 1, segment.start, segment.end, segment.text.trim());
    }

    Ok(out)
}

fn push_cue(out: &mut String, index: usize, start: f64, end: f64, text: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!(
        "{}\n{} --> {}\n{}\n",
        index,
        format_srt_timestamp(start),
        format_srt_timestamp(end.max(start)),
        text
    ));
}

/// Formats `result` in `format`.
pub fn format_transcript(
    result: &TranscriptionResult,
    format: OutputFormat,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Txt => Ok(format_txt(result)),
        OutputFormat::Srt => format_srt(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptionSegment;

    fn result(segments: Vec<TranscriptionSegment>, duration: Option<f64>) -> TranscriptionResult {
        TranscriptionResult {
            text: "  Hello world. Second line.  ".to_string(),
            segments,
            language: "en".to_string(),
            duration,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(3.5), "00:00:03,500");
        assert_eq!(format_srt_timestamp(3661.042), "01:01:01,042");
        assert_eq!(format_srt_timestamp(-1.0), "00:00:00,000");
    }

    #[test]
    fn test_format_txt_trims() {
        assert_eq!(format_txt(&result(vec![], None)), "Hello world. Second line.");
    }

    #[test]
    fn test_format_srt_segments() {
        let r = result(
            vec![
                TranscriptionSegment::new(0, 0.0, 2.5, "Hello world."),
                TranscriptionSegment::new(1, 2.5, 4.0, "Second line."),
            ],
            Some(4.0),
        );
        let srt = format_srt(&r).unwrap();
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,500\nHello world.\n\n\
             2\n00:00:02,500 --> 00:00:04,000\nSecond line.\n"
        );
    }

    #[test]
    fn test_format_srt_falls_back_to_duration() {
        let srt = format_srt(&result(vec![], Some(12.0))).unwrap();
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:12,000\nHello world. Second line.\n"
        );
    }

    #[test]
    fn test_format_srt_without_timing_fails() {
        let err = format_srt(&result(vec![], None)).unwrap_err();
        assert!(matches!(err, OutputError::SerializationFailed { .. }));
        assert!(err.to_string().contains("no segments"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("SRT".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert!("vtt".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Srt.requires_timing());
        assert!(!OutputFormat::Txt.requires_timing());
    }
}
