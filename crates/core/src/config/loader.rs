use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;
use tracing::debug;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "TRANSCRIBE_";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "transcribe.toml";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from `path` if it exists, defaults otherwise.
///
/// Environment overrides apply in both cases.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();
    match path {
        Some(path) if path.exists() => figment = figment.merge(Toml::file(path)),
        Some(path) => debug!(path = %path.display(), "No config file, using defaults"),
        None => {}
    }

    extract(figment)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Fills in the API key from `env_key` when the config carries none.
pub fn apply_api_key_fallback(mut config: Config, env_key: Option<String>) -> Config {
    if config.transcription.api_key().is_none() {
        config.transcription.api_key = env_key.filter(|k| !k.trim().is_empty());
    }
    config
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(apply_api_key_fallback(config, std::env::var(API_KEY_ENV).ok()))
}
