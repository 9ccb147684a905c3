//! Bounded exponential-backoff retry around a transcription provider.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::RetryConfig;
use super::error::TranscriptionError;
use super::traits::TranscriptionProvider;
use super::types::TranscriptionResult;

/// When and how often to retry transient failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Longest single backoff delay a policy will ever wait, in seconds.
pub const MAX_RETRY_DELAY_SECS: f64 = 3600.0;

/// Converts configured seconds to a delay within `0..=MAX_RETRY_DELAY_SECS`.
/// NaN counts as zero.
fn bounded_delay(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.min(MAX_RETRY_DELAY_SECS))
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        let multiplier = if config.backoff_multiplier.is_finite() {
            config.backoff_multiplier.max(1.0)
        } else {
            1.0
        };
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: bounded_delay(config.initial_delay_secs),
            max_delay: bounded_delay(config.max_delay_secs),
            multiplier,
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget with millisecond delays, for tests and local stubs.
    pub fn fast() -> Self {
        Self {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        bounded_delay(secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Calls a provider, retrying transient failures per a [`RetryPolicy`].
///
/// Non-transient failures return immediately. When all attempts fail, the
/// last error is returned unchanged.
pub struct RetryingTranscriptionClient {
    provider: Arc<dyn TranscriptionProvider>,
    policy: RetryPolicy,
}

impl RetryingTranscriptionClient {
    /// Wraps `provider` with `policy`.
    pub fn new(provider: Arc<dyn TranscriptionProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// The active policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Name of the wrapped provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Transcribes `audio_path`, retrying transient failures.
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.provider.transcribe(audio_path, language).await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt, path = %audio_path.display(), "Transcription succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        path = %audio_path.display(),
                        "Transient transcription failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(
                        attempt,
                        transient = e.is_transient(),
                        error = %e,
                        "Transcription failed, giving up"
                    );
                    return Err(e);
                }
            }
        }
    }
}
