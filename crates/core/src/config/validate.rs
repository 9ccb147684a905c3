use crate::pipeline::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use crate::transcription::MAX_RETRY_DELAY_SECS;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Batch concurrency is within the gate's bounds
/// - Retry attempts and upload limit are not 0
/// - Retry delays are finite and within `0..=MAX_RETRY_DELAY_SECS`, and the
///   backoff multiplier is finite and at least 1
/// - Extraction timeout is not 0
/// - The output directory, if set, is not an existing file
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let concurrency = config.batch.concurrency;
    if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
        return Err(ConfigError::ValidationError(format!(
            "batch.concurrency must be between {} and {}, got {}",
            MIN_CONCURRENCY, MAX_CONCURRENCY, concurrency
        )));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts cannot be 0".to_string(),
        ));
    }

    let retry = &config.retry;
    for (name, secs) in [
        ("retry.initial_delay_secs", retry.initial_delay_secs),
        ("retry.max_delay_secs", retry.max_delay_secs),
    ] {
        if !(0.0..=MAX_RETRY_DELAY_SECS).contains(&secs) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 0 and {}, got {}",
                name, MAX_RETRY_DELAY_SECS, secs
            )));
        }
    }

    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(format!(
            "retry.backoff_multiplier must be a finite number of at least 1, got {}",
            retry.backoff_multiplier
        )));
    }

    if config.transcription.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "transcription.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    if config.extractor.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "extractor.timeout_secs cannot be 0".to_string(),
        ));
    }

    if let Some(dir) = &config.batch.output_dir {
        if dir.is_file() {
            return Err(ConfigError::ValidationError(format!(
                "batch.output_dir is a file: {}",
                dir.display()
            )));
        }
    }

    Ok(())
}

/// The configured API key, or `MissingApiKey`.
pub fn require_api_key(config: &Config) -> Result<&str, ConfigError> {
    config
        .transcription
        .api_key()
        .ok_or(ConfigError::MissingApiKey)
}
