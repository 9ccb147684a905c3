//! Single-file pipeline: extraction, size check, transcription, output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::catalog::MediaFile;
use crate::extractor::AudioExtractor;
use crate::output::OutputWriter;
use crate::transcription::{language_hint, RetryingTranscriptionClient, TranscriptionResult};

use super::config::PipelineSettings;
use super::progress::ProgressObserver;
use super::types::{Job, JobResult, JobStage, ProgressStatus, RunConfig};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Why a job stopped, and where.
struct JobFailure {
    stage: JobStage,
    cause: String,
}

/// Current stage of a running job.
struct StageTracker {
    stage: JobStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: JobStage::Pending,
        }
    }

    fn advance(&mut self, next: JobStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        debug!(from = %self.stage, to = %next, "Stage transition");
        self.stage = next;
    }

    fn fail(&self, cause: impl Into<String>) -> JobFailure {
        JobFailure {
            stage: self.stage,
            cause: cause.into(),
        }
    }
}

/// Per-job scratch directory for extracted audio.
///
/// Removed by [`TempArtifact::remove`] on normal exits and by `Drop` when the
/// job unwinds.
struct TempArtifact {
    dir: PathBuf,
    removed: bool,
}

impl TempArtifact {
    async fn create(dir: PathBuf) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            removed: false,
        })
    }

    async fn remove(mut self) {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => debug!(dir = %self.dir.display(), "Removed temp audio"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "Failed to remove temp audio"),
        }
        self.removed = true;
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }
}

/// Drives one file from input to saved transcript.
///
/// `run` never returns an error: every failure is captured in the
/// [`JobResult`] together with the stage it happened in.
pub struct JobPipeline {
    extractor: Arc<dyn AudioExtractor>,
    transcriber: RetryingTranscriptionClient,
    writer: Arc<dyn OutputWriter>,
    settings: PipelineSettings,
}

impl JobPipeline {
    /// Creates a pipeline from its collaborators.
    pub fn new(
        extractor: Arc<dyn AudioExtractor>,
        transcriber: RetryingTranscriptionClient,
        writer: Arc<dyn OutputWriter>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            transcriber,
            writer,
            settings,
        }
    }

    /// Pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// The retrying transcription client.
    pub fn transcriber(&self) -> &RetryingTranscriptionClient {
        &self.transcriber
    }

    /// Runs a single file outside of a batch.
    pub async fn run_file(
        &self,
        file: MediaFile,
        run: RunConfig,
        observer: &dyn ProgressObserver,
    ) -> JobResult {
        self.run(Job::new(file, Arc::new(run)), observer).await
    }

    /// Runs `job` to a terminal state.
    ///
    /// Emits exactly one `Started` and one terminal event to `observer`.
    pub async fn run(&self, job: Job, observer: &dyn ProgressObserver) -> JobResult {
        let span = info_span!("job", id = %job.id, path = %job.file.path.display());
        self.run_job(job, observer).instrument(span).await
    }

    async fn run_job(&self, job: Job, observer: &dyn ProgressObserver) -> JobResult {
        let start = Instant::now();
        let input = job.file.path.clone();
        let output_path = job.run.output_path_for(&input);
        let mut stages = StageTracker::new();

        observer.notify(&input, ProgressStatus::Started);

        if job.run.skip_existing && tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            stages.advance(JobStage::Skipped);
            info!(output = %output_path.display(), "Transcript exists, skipping");
            observer.notify(&input, ProgressStatus::Skipped);
            return JobResult::skipped(input, output_path);
        }

        let outcome = self.execute(&job, &output_path, &mut stages).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok((saved, transcription)) => {
                info!(
                    output = %saved.display(),
                    words = transcription.word_count(),
                    language = %transcription.language,
                    elapsed_ms,
                    "Job completed"
                );
                observer.notify(&input, ProgressStatus::Completed);
                JobResult::completed(input, saved, transcription, elapsed_ms)
            }
            Err(failure) => {
                stages.advance(JobStage::Failed);
                error!(stage = %failure.stage, error = %failure.cause, elapsed_ms, "Job failed");
                observer.notify(&input, ProgressStatus::Failed);
                JobResult::failed(input, failure.stage, failure.cause, elapsed_ms)
            }
        }
    }

    async fn execute(
        &self,
        job: &Job,
        output_path: &Path,
        stages: &mut StageTracker,
    ) -> Result<(PathBuf, TranscriptionResult), JobFailure> {
        let input = &job.file.path;

        if !job.file.kind.needs_extraction() {
            return self
                .transcribe_and_save(input, job, output_path, None, stages)
                .await;
        }

        stages.advance(JobStage::Extracting);
        let artifact = TempArtifact::create(self.settings.temp_dir.join(format!("job-{}", job.id)))
            .await
            .map_err(|e| stages.fail(format!("Failed to create temp directory: {}", e)))?;

        let format = self.settings.audio_format;
        let target = artifact
            .dir
            .join(format!("{}.{}", job.file.stem(), format.extension()));

        let extraction = match self.extractor.extract(input, &target, format).await {
            Ok(extraction) => extraction,
            Err(e) => {
                artifact.remove().await;
                return Err(stages.fail(e.to_string()));
            }
        };
        debug!(
            audio = %extraction.output_path.display(),
            size = %extraction.size_display(),
            "Audio extracted"
        );

        let outcome = self
            .transcribe_and_save(
                &extraction.output_path,
                job,
                output_path,
                extraction.duration_secs,
                stages,
            )
            .await;
        artifact.remove().await;
        outcome
    }

    async fn transcribe_and_save(
        &self,
        audio: &Path,
        job: &Job,
        output_path: &Path,
        source_duration: Option<f64>,
        stages: &mut StageTracker,
    ) -> Result<(PathBuf, TranscriptionResult), JobFailure> {
        stages.advance(JobStage::SizeChecked);
        let size = tokio::fs::metadata(audio)
            .await
            .map_err(|e| stages.fail(format!("Cannot read audio {}: {}", audio.display(), e)))?
            .len();
        let limit = self.settings.max_upload_bytes;
        if size > limit {
            return Err(stages.fail(format!(
                "File too large for transcription: {:.1} MB exceeds the {:.1} MB limit",
                size as f64 / BYTES_PER_MB,
                limit as f64 / BYTES_PER_MB
            )));
        }

        stages.advance(JobStage::Transcribing);
        let mut transcription = self
            .transcriber
            .transcribe(audio, language_hint(&job.run.language))
            .await
            .map_err(|e| stages.fail(e.to_string()))?;
        if transcription.duration.is_none() {
            transcription.duration = source_duration;
        }

        stages.advance(JobStage::Formatting);
        let saved = self
            .writer
            .save(&transcription, output_path, job.run.format)
            .await
            .map_err(|e| stages.fail(e.to_string()))?;

        stages.advance(JobStage::Completed);
        Ok((saved, transcription))
    }
}
