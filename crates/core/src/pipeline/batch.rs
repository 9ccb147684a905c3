//! Batch orchestration: fan out jobs through the gate, aggregate results.

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::catalog::{CatalogError, MediaCatalog, MediaFile};

use super::gate::{ConcurrencyGate, GateError};
use super::job::JobPipeline;
use super::progress::ProgressObserver;
use super::types::{BatchSummary, Job, JobResult, JobStage, ProgressStatus, RunConfig};

/// Error type for batch operations.
///
/// Only conditions that prevent the batch from starting surface here;
/// per-file failures are recorded in the [`BatchSummary`].
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Concurrency limit out of range.
    #[error(transparent)]
    InvalidConcurrency(#[from] GateError),

    /// The output directory could not be created.
    #[error("Cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory discovery failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Runs many jobs concurrently, bounded by a [`ConcurrencyGate`].
pub struct BatchOrchestrator {
    pipeline: Arc<JobPipeline>,
    gate: ConcurrencyGate,
}

impl BatchOrchestrator {
    /// Creates an orchestrator running at most `concurrency` jobs at once.
    pub fn new(pipeline: Arc<JobPipeline>, concurrency: usize) -> Result<Self, BatchError> {
        let gate = ConcurrencyGate::new(concurrency)?;
        Ok(Self { pipeline, gate })
    }

    /// The gate bounding this orchestrator.
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// The pipeline each job runs through.
    pub fn pipeline(&self) -> &Arc<JobPipeline> {
        &self.pipeline
    }

    /// Scans `dir` and processes every supported file in it.
    pub async fn process_directory(
        &self,
        dir: &Path,
        recursive: bool,
        run: RunConfig,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<BatchSummary, BatchError> {
        let files = MediaCatalog::scan(dir, recursive)?;
        info!(dir = %dir.display(), recursive, found = files.len(), "Scanned directory");
        self.run(files, run, observer).await
    }

    /// Processes `files` and waits for every job to finish.
    ///
    /// A failing job never stops the others. Results are recorded in
    /// completion order.
    ///
    /// Two inputs that map to the same output file (`talk.mp3` and
    /// `talk.mkv`, or equal names in different folders with a shared output
    /// directory) are never both run: the first in input order keeps the
    /// output path and each later one fails without being processed.
    pub async fn run(
        &self,
        files: Vec<MediaFile>,
        run: RunConfig,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<BatchSummary, BatchError> {
        let started_at = Utc::now();
        let total = files.len();

        if total == 0 {
            info!("No files to process");
            let mut summary = BatchSummary::new(0, started_at);
            summary.finish();
            return Ok(summary);
        }

        if let Some(dir) = &run.output_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| BatchError::OutputDirectory {
                    path: dir.clone(),
                    source,
                })?;
        }

        info!(
            files = total,
            concurrency = self.gate.limit(),
            format = %run.format,
            language = %run.language,
            "Starting batch"
        );

        let run = Arc::new(run);
        let mut tasks = FuturesUnordered::new();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut conflicts = Vec::new();

        for file in files {
            let output = run.output_path_for(&file.path);
            if let Some(owner) = claimed.get(&output) {
                warn!(
                    path = %file.path.display(),
                    output = %output.display(),
                    owner = %owner.display(),
                    "Output path already claimed by another input"
                );
                observer.notify(&file.path, ProgressStatus::Started);
                observer.notify(&file.path, ProgressStatus::Failed);
                let message = format!(
                    "Output {} is already produced by {}",
                    output.display(),
                    owner.display()
                );
                conflicts.push(JobResult::failed(file.path, JobStage::Pending, message, 0));
                continue;
            }
            claimed.insert(output, file.path.clone());

            let job = Job::new(file, Arc::clone(&run));
            let path = job.file.path.clone();
            let pipeline = Arc::clone(&self.pipeline);
            let gate = self.gate.clone();
            let task_observer = Arc::clone(&observer);

            let handle = tokio::spawn(async move {
                let _permit = match gate.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let input = job.file.path;
                        task_observer.notify(&input, ProgressStatus::Started);
                        task_observer.notify(&input, ProgressStatus::Failed);
                        return JobResult::failed(input, JobStage::Pending, e.to_string(), 0);
                    }
                };
                pipeline.run(job, task_observer.as_ref()).await
            });

            tasks.push(async move { (path, handle.await) });
        }

        let mut summary = BatchSummary::new(total, started_at);
        for result in conflicts {
            summary.record(result);
        }
        while let Some((path, joined)) = tasks.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Job task aborted");
                    observer.notify(&path, ProgressStatus::Failed);
                    JobResult::aborted(path, format!("job aborted unexpectedly: {}", e))
                }
            };
            summary.record(result);
        }
        summary.finish();

        info!(
            total = summary.total_files,
            successful = summary.successful,
            failed = summary.failed,
            skipped = summary.skipped,
            peak_concurrency = self.gate.peak(),
            elapsed_ms = summary.elapsed().num_milliseconds(),
            "Batch finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NoopObserver;
    use crate::testing::{fixtures, MockExtractor, MockProvider};

    fn orchestrator(concurrency: usize) -> Result<BatchOrchestrator, BatchError> {
        let pipeline = fixtures::pipeline(
            &MockExtractor::new(),
            &MockProvider::new(),
            std::env::temp_dir().join("transcribe-batch-tests"),
        );
        BatchOrchestrator::new(Arc::new(pipeline), concurrency)
    }

    #[test]
    fn test_rejects_invalid_concurrency() {
        assert!(matches!(
            orchestrator(0),
            Err(BatchError::InvalidConcurrency(GateError::InvalidLimit { .. }))
        ));
        assert!(orchestrator(21).is_err());
        assert_eq!(orchestrator(20).unwrap().gate().limit(), 20);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let orchestrator = orchestrator(4).unwrap();
        let summary = orchestrator
            .run(Vec::new(), RunConfig::default(), Arc::new(NoopObserver))
            .await
            .unwrap();

        assert_eq!(summary.total_files, 0);
        assert!(summary.results.is_empty());
        assert!(summary.is_consistent());
        assert_eq!(orchestrator.gate().acquisitions(), 0);
    }

    #[tokio::test]
    async fn test_same_stem_inputs_do_not_share_output() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new();
        let extractor = MockExtractor::new();
        let pipeline = fixtures::pipeline(&extractor, &provider, dir.path().join("tmp"));
        let orchestrator = BatchOrchestrator::new(Arc::new(pipeline), 2).unwrap();
        let files = fixtures::media_files(dir.path(), &["talk.mkv", "talk.mp3"]);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let summary = orchestrator
            .run(files, RunConfig::default(), Arc::new(tx))
            .await
            .unwrap();

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.is_consistent());
        assert_eq!(provider.total_calls(), 1);

        let loser = summary.result_for(&dir.path().join("talk.mp3")).unwrap();
        assert_eq!(loser.failed_stage, Some(JobStage::Pending));
        assert!(loser.error.as_deref().unwrap().contains("talk.mkv"));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_output_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let files = fixtures::media_files(dir.path(), &["a.mp3"]);

        let err = orchestrator(1)
            .unwrap()
            .run(
                files,
                RunConfig::default().with_output_dir(&blocker),
                Arc::new(NoopObserver),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::OutputDirectory { .. }));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let err = orchestrator(1)
            .unwrap()
            .process_directory(
                Path::new("/nonexistent/transcribe/input"),
                false,
                RunConfig::default(),
                Arc::new(NoopObserver),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BatchError::Catalog(CatalogError::DirectoryNotFound { .. })
        ));
    }
}
