//! Configuration loading and validation.
//!
//! Configuration comes from an optional TOML file, overridden by
//! `TRANSCRIBE_`-prefixed environment variables (nested keys separated by
//! `__`, e.g. `TRANSCRIBE_BATCH__CONCURRENCY=8`). `OPENAI_API_KEY` is used
//! when no key is configured otherwise.

mod loader;
mod types;
mod validate;

pub use loader::{
    apply_api_key_fallback, load_config, load_config_from_str, load_config_or_default,
    API_KEY_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX,
};
pub use types::*;
pub use validate::{require_api_key, validate_config};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured. Set OPENAI_API_KEY or api_key in the [transcription] section")]
    MissingApiKey,
}
