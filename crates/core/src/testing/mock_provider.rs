//! Mock transcription provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::transcription::{
    TranscriptionError, TranscriptionProvider, TranscriptionResult, TranscriptionSegment,
};

/// How the mock answers calls for a given file.
#[derive(Debug, Clone)]
pub enum ProviderBehavior {
    /// Return a canned transcript derived from the file name.
    Succeed,
    /// Return this exact result.
    SucceedWith(TranscriptionResult),
    /// Fail every call with this error.
    AlwaysFail(TranscriptionError),
    /// Fail the first `n` calls with this error, then succeed.
    FailTimes(u32, TranscriptionError),
}

#[derive(Debug, Default)]
struct ProviderState {
    by_path: HashMap<PathBuf, ProviderBehavior>,
    by_stem: HashMap<String, ProviderBehavior>,
    calls: HashMap<PathBuf, u32>,
    languages: Vec<Option<String>>,
}

/// Mock implementation of the `TranscriptionProvider` trait.
///
/// Behaviors are looked up by exact path first, then by file stem. Stem
/// matching lets tests target video inputs, whose audio reaches the provider
/// from a temp directory under the same stem.
///
/// # Example
///
/// ```rust,ignore
/// use transcribe_core::testing::{MockProvider, ProviderBehavior};
///
/// let provider = MockProvider::new();
/// provider.set_behavior(
///     "/media/bad.mp3",
///     ProviderBehavior::AlwaysFail(TranscriptionError::RateLimited("429".into())),
/// );
///
/// let client = RetryingTranscriptionClient::new(Arc::new(provider.clone()), RetryPolicy::fast());
/// let _ = client.transcribe(Path::new("/media/bad.mp3"), None).await;
/// assert_eq!(provider.call_count("/media/bad.mp3"), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<ProviderState>>,
    latency: Arc<Mutex<Duration>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a mock that succeeds for every file.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the behavior for an exact path.
    pub fn set_behavior(&self, path: impl AsRef<Path>, behavior: ProviderBehavior) {
        self.state()
            .by_path
            .insert(path.as_ref().to_path_buf(), behavior);
    }

    /// Set the behavior for any path with this file stem.
    pub fn set_stem_behavior(&self, stem: &str, behavior: ProviderBehavior) {
        self.state().by_stem.insert(stem.to_string(), behavior);
    }

    /// Simulated time spent in each call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Number of calls made for an exact path.
    pub fn call_count(&self, path: impl AsRef<Path>) -> u32 {
        self.state()
            .calls
            .get(path.as_ref())
            .copied()
            .unwrap_or(0)
    }

    /// Number of calls made for paths with this file stem.
    pub fn stem_call_count(&self, stem: &str) -> u32 {
        self.state()
            .calls
            .iter()
            .filter(|(path, _)| stem_of(path) == stem)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Total number of calls.
    pub fn total_calls(&self) -> u32 {
        self.state().calls.values().sum()
    }

    /// Every path the provider was called with.
    pub fn called_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.state().calls.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Language hints received, in call order.
    pub fn languages_seen(&self) -> Vec<Option<String>> {
        self.state().languages.clone()
    }

    /// Highest number of calls that were in progress at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// The canned result returned by `ProviderBehavior::Succeed`.
    pub fn canned_result(path: &Path) -> TranscriptionResult {
        let text = format!("Transcript of {}.", stem_of(path));
        TranscriptionResult {
            segments: vec![TranscriptionSegment::new(0, 0.0, 1.5, text.clone())],
            text,
            language: "en".to_string(),
            duration: Some(1.5),
        }
    }

    fn answer(&self, path: &Path, language: Option<&str>) -> Result<TranscriptionResult, TranscriptionError> {
        let mut state = self.state();
        let count = {
            let entry = state.calls.entry(path.to_path_buf()).or_insert(0);
            *entry += 1;
            *entry
        };
        state.languages.push(language.map(str::to_string));

        let behavior = state
            .by_path
            .get(path)
            .or_else(|| state.by_stem.get(&stem_of(path)))
            .cloned()
            .unwrap_or(ProviderBehavior::Succeed);

        match behavior {
            ProviderBehavior::Succeed => Ok(Self::canned_result(path)),
            ProviderBehavior::SucceedWith(result) => Ok(result),
            ProviderBehavior::AlwaysFail(err) => Err(err),
            ProviderBehavior::FailTimes(n, err) if count <= n => Err(err),
            ProviderBehavior::FailTimes(..) => Ok(Self::canned_result(path)),
        }
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl TranscriptionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let outcome = self.answer(audio_path, language);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_success() {
        let provider = MockProvider::new();
        let result = provider
            .transcribe(Path::new("/a/talk.mp3"), Some("en"))
            .await
            .unwrap();

        assert_eq!(result.text, "Transcript of talk.");
        assert_eq!(provider.call_count("/a/talk.mp3"), 1);
        assert_eq!(provider.languages_seen(), vec![Some("en".to_string())]);
    }

    #[tokio::test]
    async fn test_fail_times_then_succeed() {
        let provider = MockProvider::new();
        provider.set_behavior(
            "/a/x.mp3",
            ProviderBehavior::FailTimes(1, TranscriptionError::Timeout("t".into())),
        );

        assert!(provider.transcribe(Path::new("/a/x.mp3"), None).await.is_err());
        assert!(provider.transcribe(Path::new("/a/x.mp3"), None).await.is_ok());
        assert_eq!(provider.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_stem_behavior() {
        let provider = MockProvider::new();
        provider.set_stem_behavior(
            "clip",
            ProviderBehavior::AlwaysFail(TranscriptionError::UnsupportedInput("bad".into())),
        );

        let err = provider
            .transcribe(Path::new("/tmp/job-1/clip.mp3"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::UnsupportedInput(_)));
        assert_eq!(provider.stem_call_count("clip"), 1);
    }
}
