//! Types for the pipeline module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::MediaFile;
use crate::output::OutputFormat;
use crate::transcription::TranscriptionResult;

/// Settings shared by every job of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Where transcripts go. `None` writes next to each input.
    pub output_dir: Option<PathBuf>,
    /// Output representation.
    pub format: OutputFormat,
    /// Language code, or `"auto"` for detection.
    pub language: String,
    /// Skip inputs whose output file already exists.
    pub skip_existing: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: OutputFormat::default(),
            language: "auto".to_string(),
            skip_existing: false,
        }
    }
}

impl RunConfig {
    /// Sets the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Enables skipping of already transcribed inputs.
    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Output path for `input`.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let ext = self.format.extension();
        match &self.output_dir {
            Some(dir) => {
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "transcript".to_string());
                dir.join(format!("{}.{}", stem, ext))
            }
            None => input.with_extension(ext),
        }
    }
}

/// One file bound to the run configuration.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique job id.
    pub id: String,
    /// Input file.
    pub file: MediaFile,
    /// Batch-wide settings.
    pub run: Arc<RunConfig>,
}

impl Job {
    /// Creates a job with a fresh id.
    pub fn new(file: MediaFile, run: Arc<RunConfig>) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string()[..12].to_string();
        Self { id, file, run }
    }
}

/// States of a job's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Pending,
    Extracting,
    SizeChecked,
    Transcribing,
    Formatting,
    Completed,
    Skipped,
    Failed,
}

impl JobStage {
    /// Whether the stage is absorbing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: JobStage) -> bool {
        use JobStage::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Pending, Extracting) | (Pending, SizeChecked) | (Pending, Skipped) => true,
            (Extracting, SizeChecked) => true,
            (SizeChecked, Transcribing) => true,
            (Transcribing, Formatting) => true,
            (Formatting, Completed) => true,
            _ => false,
        }
    }

    /// Lowercase stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::SizeChecked => "size_checked",
            Self::Transcribing => "transcribing",
            Self::Formatting => "formatting",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Input file.
    pub input_path: PathBuf,
    /// Saved transcript, on success or skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Whether a transcript was produced.
    pub success: bool,
    /// Whether the job was skipped because its output already existed.
    #[serde(default)]
    pub skipped: bool,
    /// Human-readable failure cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stage the job was in when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<JobStage>,
    /// Parsed transcription, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionResult>,
    /// Wall time spent in the pipeline.
    pub duration_ms: u64,
}

impl JobResult {
    /// A completed job.
    pub fn completed(
        input_path: PathBuf,
        output_path: PathBuf,
        transcription: TranscriptionResult,
        duration_ms: u64,
    ) -> Self {
        Self {
            input_path,
            output_path: Some(output_path),
            success: true,
            skipped: false,
            error: None,
            failed_stage: None,
            transcription: Some(transcription),
            duration_ms,
        }
    }

    /// A failed job.
    pub fn failed(
        input_path: PathBuf,
        stage: JobStage,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            input_path,
            output_path: None,
            success: false,
            skipped: false,
            error: Some(error.into()),
            failed_stage: Some(stage),
            transcription: None,
            duration_ms,
        }
    }

    /// A job whose task ended without producing a result.
    pub fn aborted(input_path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            failed_stage: None,
            ..Self::failed(input_path, JobStage::Failed, error, 0)
        }
    }

    /// A skipped job whose output already existed.
    pub fn skipped(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_path,
            output_path: Some(output_path),
            success: false,
            skipped: true,
            error: None,
            failed_stage: None,
            transcription: None,
            duration_ms: 0,
        }
    }

    /// Whether the job failed (neither succeeded nor was skipped).
    pub fn is_failure(&self) -> bool {
        !self.success && !self.skipped
    }
}

/// Aggregated outcome of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of files submitted.
    pub total_files: usize,
    /// Jobs that produced a transcript.
    pub successful: usize,
    /// Jobs that failed.
    pub failed: usize,
    /// Jobs skipped because their output existed.
    pub skipped: usize,
    /// Per-job results, in completion order.
    pub results: Vec<JobResult>,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the last job finished.
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub(crate) fn new(total_files: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            total_files,
            successful: 0,
            failed: 0,
            skipped: 0,
            results: Vec::with_capacity(total_files),
            started_at,
            finished_at: started_at,
        }
    }

    /// An all-zero summary.
    pub fn empty() -> Self {
        Self::new(0, Utc::now())
    }

    pub(crate) fn record(&mut self, result: JobResult) {
        if result.success {
            self.successful += 1;
        } else if result.skipped {
            self.skipped += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Success rate as a percentage. 0.0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total_files as f64 * 100.0
    }

    /// Results of failed jobs.
    pub fn failures(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Result for a given input, if any.
    pub fn result_for(&self, input: &Path) -> Option<&JobResult> {
        self.results.iter().find(|r| r.input_path == input)
    }

    /// Whether the counters agree with each other and with `results`.
    pub fn is_consistent(&self) -> bool {
        self.successful + self.failed + self.skipped == self.total_files
            && self.total_files == self.results.len()
    }

    /// Elapsed wall time of the batch.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Status reported to a progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

impl ProgressStatus {
    /// Whether this is the last event a job emits.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }
}

/// A progress notification tagged with its input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub path: PathBuf,
    pub status: ProgressStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_input() {
        let run = RunConfig::default().with_format(OutputFormat::Srt);
        assert_eq!(
            run.output_path_for(Path::new("/media/talk.mkv")),
            PathBuf::from("/media/talk.srt")
        );
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let run = RunConfig::default().with_output_dir("/out");
        assert_eq!(
            run.output_path_for(Path::new("/media/a/talk.mp3")),
            PathBuf::from("/out/talk.txt")
        );
    }

    #[test]
    fn test_stage_transitions() {
        use JobStage::*;
        assert!(Pending.can_transition_to(Extracting));
        assert!(Pending.can_transition_to(SizeChecked));
        assert!(Extracting.can_transition_to(SizeChecked));
        assert!(SizeChecked.can_transition_to(Transcribing));
        assert!(Transcribing.can_transition_to(Formatting));
        assert!(Formatting.can_transition_to(Completed));
        assert!(Transcribing.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Transcribing));
        assert!(!SizeChecked.can_transition_to(Extracting));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
        assert!(!Extracting.can_transition_to(Skipped));
    }

    #[test]
    fn test_summary_record() {
        let mut summary = BatchSummary::new(3, Utc::now());
        summary.record(JobResult::completed(
            PathBuf::from("/a.mp3"),
            PathBuf::from("/a.txt"),
            TranscriptionResult {
                text: "a".into(),
                segments: vec![],
                language: "en".into(),
                duration: None,
            },
            10,
        ));
        summary.record(JobResult::failed(
            PathBuf::from("/b.mp3"),
            JobStage::Transcribing,
            "boom",
            5,
        ));
        summary.record(JobResult::skipped(
            PathBuf::from("/c.mp3"),
            PathBuf::from("/c.txt"),
        ));

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.is_consistent());
        assert_eq!(summary.failures().count(), 1);
        assert!((summary.success_rate() - 33.333).abs() < 0.01);
        assert!(summary.result_for(Path::new("/b.mp3")).is_some());
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::empty();
        assert!(summary.is_consistent());
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn test_progress_event_serialization() {
        let event = ProgressEvent {
            path: PathBuf::from("/a.mp3"),
            status: ProgressStatus::Completed,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"status\":\"completed\""));
        assert!(ProgressStatus::Failed.is_terminal());
        assert!(!ProgressStatus::Started.is_terminal());
    }
}
