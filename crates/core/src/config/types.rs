use serde::{Deserialize, Serialize};

use crate::extractor::ExtractorConfig;
use crate::pipeline::{BatchConfig, PipelineSettings};
use crate::transcription::{ProviderConfig, RetryConfig, RetryPolicy};

/// Full application configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transcription: ProviderConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Retry policy from the `[retry]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    /// Pipeline settings from the extractor and transcription sections.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings::from_sections(&self.extractor, &self.transcription)
    }
}

/// Sanitized config for display (API key redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub transcription: SanitizedTranscriptionConfig,
    pub retry: RetryConfig,
    pub extractor: ExtractorConfig,
    pub batch: BatchConfig,
}

/// Sanitized transcription section (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranscriptionConfig {
    pub api_key_configured: bool,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_upload_bytes: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            transcription: SanitizedTranscriptionConfig {
                api_key_configured: config.transcription.api_key().is_some(),
                base_url: config.transcription.base_url.clone(),
                model: config.transcription.model.clone(),
                timeout_secs: config.transcription.timeout_secs,
                max_upload_bytes: config.transcription.max_upload_bytes,
            },
            retry: config.retry.clone(),
            extractor: config.extractor.clone(),
            batch: config.batch.clone(),
        }
    }
}
