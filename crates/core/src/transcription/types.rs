//! Types for the transcription module.

use serde::{Deserialize, Serialize};

use super::error::TranscriptionError;

/// A timed piece of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    /// Position in the transcript, as reported by the provider.
    pub index: u32,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds, never before `start`.
    pub end: f64,
    /// Segment text, trimmed.
    pub text: String,
}

impl TranscriptionSegment {
    /// Creates a segment, clamping `end` so it is never before `start`.
    pub fn new(index: u32, start: f64, end: f64, text: impl Into<String>) -> Self {
        let start = start.max(0.0);
        Self {
            index,
            start,
            end: end.max(start),
            text: text.into().trim().to_string(),
        }
    }

    /// Duration of the segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Parsed result of a transcription call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcript text.
    pub text: String,
    /// Timed segments in order. May be empty.
    pub segments: Vec<TranscriptionSegment>,
    /// Detected or declared language, `"unknown"` if the provider said nothing.
    pub language: String,
    /// Total audio duration in seconds, if reported.
    pub duration: Option<f64>,
}

impl TranscriptionResult {
    /// Approximate word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether any timing information is available.
    pub fn has_timing(&self) -> bool {
        !self.segments.is_empty() || self.duration.is_some()
    }

    /// Parses a Whisper `verbose_json` response body.
    pub fn from_verbose_json(body: &str) -> Result<Self, TranscriptionError> {
        #[derive(Deserialize)]
        struct VerboseResponse {
            #[serde(default)]
            text: String,
            #[serde(default)]
            segments: Vec<RawSegment>,
            language: Option<String>,
            duration: Option<f64>,
        }

        #[derive(Deserialize)]
        struct RawSegment {
            id: Option<u32>,
            #[serde(default)]
            start: f64,
            #[serde(default)]
            end: f64,
            #[serde(default)]
            text: String,
        }

        let response: VerboseResponse = serde_json::from_str(body)
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        let segments = response
            .segments
            .into_iter()
            .enumerate()
            .map(|(i, s)| TranscriptionSegment::new(s.id.unwrap_or(i as u32), s.start, s.end, s.text))
            .collect();

        Ok(Self {
            text: response.text,
            segments,
            language: response
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            duration: response.duration,
        })
    }
}

/// Maps a user language setting to a provider hint. `"auto"` and empty mean none.
pub fn language_hint(language: &str) -> Option<&str> {
    let trimmed = language.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_clamps_end() {
        let seg = TranscriptionSegment::new(0, 5.0, 3.0, "  hi ");
        assert_eq!(seg.end, 5.0);
        assert_eq!(seg.duration(), 0.0);
        assert_eq!(seg.text, "hi");
    }

    #[test]
    fn test_parse_verbose_json() {
        let body = r#"{
            "task": "transcribe",
            "language": "english",
            "duration": 8.47,
            "text": "Hello there. General Kenobi.",
            "segments": [
                {"id": 0, "start": 0.0, "end": 3.2, "text": " Hello there."},
                {"id": 1, "start": 3.2, "end": 8.47, "text": " General Kenobi."}
            ]
        }"#;

        let result = TranscriptionResult::from_verbose_json(body).unwrap();
        assert_eq!(result.language, "english");
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[1].text, "General Kenobi.");
        assert_eq!(result.duration, Some(8.47));
        assert_eq!(result.word_count(), 4);
        assert!(result.has_timing());
    }

    #[test]
    fn test_parse_text_only_response() {
        let result = TranscriptionResult::from_verbose_json(r#"{"text": "just text"}"#).unwrap();
        assert!(result.segments.is_empty());
        assert_eq!(result.language, "unknown");
        assert!(!result.has_timing());
    }

    #[test]
    fn test_parse_missing_segment_ids() {
        let body = r#"{"text": "a b", "segments": [{"start": 0, "end": 1, "text": "a"}, {"start": 1, "end": 2, "text": "b"}]}"#;
        let result = TranscriptionResult::from_verbose_json(body).unwrap();
        assert_eq!(result.segments[0].index, 0);
        assert_eq!(result.segments[1].index, 1);
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = TranscriptionResult::from_verbose_json("<html>").unwrap_err();
        assert_eq!(
            err.kind(),
            super::super::error::TranscriptionErrorKind::InvalidResponse
        );
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("auto"), None);
        assert_eq!(language_hint("AUTO"), None);
        assert_eq!(language_hint(""), None);
        assert_eq!(language_hint("en"), Some("en"));
    }
}
