//! Batch lifecycle integration tests.
//!
//! These tests drive the batch orchestrator with mock extractor and provider:
//! - Partial failure without aborting the batch
//! - Concurrency bound under load
//! - Progress event contract
//! - Temp artifact cleanup and panic capture

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use transcribe_core::{
    pipeline::{
        BatchOrchestrator, JobStage, NoopObserver, ProgressEvent, ProgressObserver,
        ProgressStatus, RunConfig,
    },
    testing::{fixtures, ExtractorBehavior, MockExtractor, MockProvider, ProviderBehavior},
    transcription::TranscriptionError,
    MediaCatalog, MediaFile, OutputFormat,
};

/// Test helper wiring an orchestrator to mocks and temp directories.
struct TestHarness {
    orchestrator: BatchOrchestrator,
    extractor: MockExtractor,
    provider: MockProvider,
    media_dir: TempDir,
    scratch_dir: TempDir,
}

impl TestHarness {
    fn new(concurrency: usize) -> Self {
        let media_dir = TempDir::new().expect("Failed to create media dir");
        let scratch_dir = TempDir::new().expect("Failed to create scratch dir");
        let extractor = MockExtractor::new();
        let provider = MockProvider::new();

        let pipeline =
            fixtures::pipeline(&extractor, &provider, scratch_dir.path().to_path_buf());
        let orchestrator = BatchOrchestrator::new(Arc::new(pipeline), concurrency)
            .expect("Failed to create orchestrator");

        Self {
            orchestrator,
            extractor,
            provider,
            media_dir,
            scratch_dir,
        }
    }

    fn media(&self, names: &[&str]) -> Vec<MediaFile> {
        fixtures::media_files(self.media_dir.path(), names)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.media_dir.path().join(name)
    }

    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path())
            .expect("Failed to read scratch dir")
            .count()
    }
}

fn channel() -> (Arc<dyn ProgressObserver>, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(tx), rx)
}

async fn drain(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_partial_failure_does_not_abort_batch() {
    let harness = TestHarness::new(2);
    let files = harness.media(&["a.mp3", "b.wav", "bad.mp3", "c.flac", "d.m4a"]);
    harness.provider.set_behavior(
        harness.path("bad.mp3"),
        ProviderBehavior::AlwaysFail(TranscriptionError::AuthenticationRejected(
            "invalid api key".into(),
        )),
    );

    let summary = harness
        .orchestrator
        .run(files, RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.successful, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert!(summary.is_consistent());

    let bad = summary.result_for(&harness.path("bad.mp3")).unwrap();
    assert!(!bad.success);
    assert_eq!(bad.failed_stage, Some(JobStage::Transcribing));
    assert!(bad.error.as_deref().unwrap().contains("invalid api key"));
    assert_eq!(harness.provider.call_count(harness.path("bad.mp3")), 1);

    for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
        assert!(harness.path(name).exists(), "missing {}", name);
    }
    assert!(!harness.path("bad.txt").exists());
}

#[tokio::test]
async fn test_transient_failure_attempted_three_times() {
    let harness = TestHarness::new(3);
    let files = harness.media(&["ok.mp3", "flaky.mp3"]);
    harness.provider.set_behavior(
        harness.path("flaky.mp3"),
        ProviderBehavior::AlwaysFail(TranscriptionError::RateLimited("429 Too Many Requests".into())),
    );

    let summary = harness
        .orchestrator
        .run(files, RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(harness.provider.call_count(harness.path("flaky.mp3")), 3);

    let flaky = summary.result_for(&harness.path("flaky.mp3")).unwrap();
    assert_eq!(
        flaky.error.as_deref(),
        Some(TranscriptionError::RateLimited("429 Too Many Requests".into()).to_string().as_str())
    );
}

#[tokio::test]
async fn test_concurrency_bound_respected() {
    let harness = TestHarness::new(3);
    harness.provider.set_latency(Duration::from_millis(20));
    let names: Vec<String> = (0..12).map(|i| format!("track{:02}.mp3", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let files = harness.media(&names);

    let summary = harness
        .orchestrator
        .run(files, RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(summary.successful, 12);
    assert!(harness.orchestrator.gate().peak() <= 3);
    assert!(harness.provider.peak_in_flight() <= 3);
    assert!(harness.provider.peak_in_flight() >= 1);
    assert_eq!(harness.orchestrator.gate().acquisitions(), 12);
    assert_eq!(harness.orchestrator.gate().active(), 0);
}

#[tokio::test]
async fn test_empty_directory_yields_empty_summary() {
    let harness = TestHarness::new(2);
    std::fs::write(harness.path("notes.txt"), "not media").unwrap();

    let summary = harness
        .orchestrator
        .process_directory(
            harness.media_dir.path(),
            false,
            RunConfig::default(),
            Arc::new(NoopObserver),
        )
        .await
        .unwrap();

    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.successful + summary.failed + summary.skipped, 0);
    assert_eq!(summary.success_rate(), 0.0);
    assert_eq!(harness.orchestrator.gate().acquisitions(), 0);
    assert_eq!(harness.provider.total_calls(), 0);
}

#[tokio::test]
async fn test_video_without_audio_stream() {
    let harness = TestHarness::new(2);
    let files = harness.media(&["silent.mkv", "voice.mp4"]);
    harness
        .extractor
        .set_behavior(harness.path("silent.mkv"), ExtractorBehavior::NoAudio);

    let summary = harness
        .orchestrator
        .run(files, RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    let silent = summary.result_for(&harness.path("silent.mkv")).unwrap();
    assert_eq!(silent.failed_stage, Some(JobStage::Extracting));
    assert!(silent.error.as_deref().unwrap().contains("No audio stream"));
    assert_eq!(harness.provider.stem_call_count("silent"), 0);
    assert_eq!(harness.provider.stem_call_count("voice"), 1);
}

#[tokio::test]
async fn test_temp_artifacts_removed() {
    let harness = TestHarness::new(4);
    let files = harness.media(&["ok.mkv", "fails.mov", "silent.webm", "plain.mp3"]);
    harness.provider.set_stem_behavior(
        "fails",
        ProviderBehavior::AlwaysFail(TranscriptionError::UnsupportedInput("corrupt".into())),
    );
    harness
        .extractor
        .set_behavior(harness.path("silent.webm"), ExtractorBehavior::NoAudio);

    let summary = harness
        .orchestrator
        .run(files, RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(harness.extractor.extraction_count(), 3);
    for (_, extracted) in harness.extractor.extractions() {
        assert!(!extracted.exists(), "leftover {}", extracted.display());
    }
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_panicking_job_becomes_failure() {
    let harness = TestHarness::new(2);
    let files = harness.media(&["boom.avi", "fine.mp3"]);
    harness
        .extractor
        .set_behavior(harness.path("boom.avi"), ExtractorBehavior::Panic);
    let (observer, rx) = channel();

    let summary = harness
        .orchestrator
        .run(files, RunConfig::default(), observer)
        .await
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert!(summary.is_consistent());
    let boom = summary.result_for(&harness.path("boom.avi")).unwrap();
    assert!(boom
        .error
        .as_deref()
        .unwrap()
        .starts_with("job aborted unexpectedly"));
    assert_eq!(harness.scratch_entries(), 0);
    assert_eq!(harness.orchestrator.gate().active(), 0);

    let events = drain(rx).await;
    let boom_events: Vec<ProgressStatus> = events
        .iter()
        .filter(|e| e.path == harness.path("boom.avi"))
        .map(|e| e.status)
        .collect();
    assert_eq!(boom_events, vec![ProgressStatus::Started, ProgressStatus::Failed]);
}

#[tokio::test]
async fn test_progress_events_per_file() {
    let harness = TestHarness::new(2);
    let files = harness.media(&["one.mp3", "two.mp3", "three.mp3"]);
    harness.provider.set_behavior(
        harness.path("two.mp3"),
        ProviderBehavior::AlwaysFail(TranscriptionError::MalformedRequest("bad".into())),
    );
    let (observer, rx) = channel();

    harness
        .orchestrator
        .run(files, RunConfig::default(), observer)
        .await
        .unwrap();

    let mut by_path: HashMap<PathBuf, Vec<ProgressStatus>> = HashMap::new();
    for event in drain(rx).await {
        by_path.entry(event.path).or_default().push(event.status);
    }

    assert_eq!(by_path.len(), 3);
    assert_eq!(
        by_path[&harness.path("one.mp3")],
        vec![ProgressStatus::Started, ProgressStatus::Completed]
    );
    assert_eq!(
        by_path[&harness.path("two.mp3")],
        vec![ProgressStatus::Started, ProgressStatus::Failed]
    );
}

#[tokio::test]
async fn test_repeat_batch_is_idempotent() {
    let harness = TestHarness::new(2);
    let names = ["x.mp3", "y.mp3", "z.mp3"];
    harness.provider.set_behavior(
        harness.path("y.mp3"),
        ProviderBehavior::AlwaysFail(TranscriptionError::UnsupportedInput("nope".into())),
    );

    let first = harness
        .orchestrator
        .run(harness.media(&names), RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();
    let second = harness
        .orchestrator
        .run(harness.media(&names), RunConfig::default(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(
        (first.successful, first.failed, first.skipped),
        (second.successful, second.failed, second.skipped)
    );
    assert_eq!(
        std::fs::read_to_string(harness.path("x.txt")).unwrap(),
        "Transcript of x."
    );
}

#[tokio::test]
async fn test_skip_existing_and_output_dir() {
    let harness = TestHarness::new(2);
    let out_dir = harness.media_dir.path().join("transcripts");
    std::fs::create_dir_all(&out_dir).unwrap();
    std::fs::write(out_dir.join("old.srt"), "1\n").unwrap();
    let files = harness.media(&["old.mp3", "new.mp3"]);
    let run = RunConfig::default()
        .with_output_dir(&out_dir)
        .with_format(OutputFormat::Srt)
        .with_skip_existing(true);

    let summary = harness
        .orchestrator
        .run(files, run, Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_consistent());
    assert_eq!(harness.provider.call_count(harness.path("old.mp3")), 0);

    let srt = std::fs::read_to_string(out_dir.join("new.srt")).unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,500\n"));
}

#[tokio::test]
async fn test_recursive_directory_batch() {
    let harness = TestHarness::new(2);
    let nested = harness.media_dir.path().join("season1");
    std::fs::create_dir_all(&nested).unwrap();
    harness.media(&["intro.mp3"]);
    fixtures::media_file(&nested, "episode1.mkv");

    let flat = MediaCatalog::scan(harness.media_dir.path(), false).unwrap();
    assert_eq!(flat.len(), 1);

    let summary = harness
        .orchestrator
        .process_directory(
            harness.media_dir.path(),
            true,
            RunConfig::default(),
            Arc::new(NoopObserver),
        )
        .await
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.successful, 2);
    assert!(nested.join("episode1.txt").exists());
}
