//! Error types for the transcription module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a transcription provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptionError {
    /// The provider is throttling requests.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Transport-level failure reaching the provider.
    #[error("Connection to transcription API failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("Transcription request timed out: {0}")]
    Timeout(String),

    /// No API key is configured.
    #[error(
        "OpenAI API key is not configured. Set the OPENAI_API_KEY environment variable \
         or api_key in the [transcription] section of the config file"
    )]
    AuthenticationMissing,

    /// The provider refused the configured credentials.
    #[error("Authentication rejected by transcription API: {0}")]
    AuthenticationRejected(String),

    /// The provider rejected the request as malformed.
    #[error("Malformed transcription request: {0}")]
    MalformedRequest(String),

    /// The provider cannot handle the submitted audio.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Any other provider-side failure.
    #[error("API error{}: {message}", http_suffix(.status))]
    ProviderError {
        status: Option<u16>,
        message: String,
    },

    /// The provider answered with something we could not parse.
    #[error("Invalid response from transcription API: {0}")]
    InvalidResponse(String),
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// Kind of a [`TranscriptionError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionErrorKind {
    RateLimited,
    ConnectionFailed,
    Timeout,
    AuthenticationMissing,
    AuthenticationRejected,
    MalformedRequest,
    UnsupportedInput,
    ProviderError,
    InvalidResponse,
}

/// Whether a failure may succeed if attempted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retryability {
    Transient,
    NonTransient,
}

/// Static retry classification of an error kind.
pub fn classify(kind: TranscriptionErrorKind) -> Retryability {
    use TranscriptionErrorKind::*;
    match kind {
        RateLimited | ConnectionFailed | Timeout => Retryability::Transient,
        AuthenticationMissing | AuthenticationRejected | MalformedRequest | UnsupportedInput
        | ProviderError | InvalidResponse => Retryability::NonTransient,
    }
}

impl TranscriptionError {
    /// The kind of this error.
    pub fn kind(&self) -> TranscriptionErrorKind {
        match self {
            Self::RateLimited(_) => TranscriptionErrorKind::RateLimited,
            Self::ConnectionFailed(_) => TranscriptionErrorKind::ConnectionFailed,
            Self::Timeout(_) => TranscriptionErrorKind::Timeout,
            Self::AuthenticationMissing => TranscriptionErrorKind::AuthenticationMissing,
            Self::AuthenticationRejected(_) => TranscriptionErrorKind::AuthenticationRejected,
            Self::MalformedRequest(_) => TranscriptionErrorKind::MalformedRequest,
            Self::UnsupportedInput(_) => TranscriptionErrorKind::UnsupportedInput,
            Self::ProviderError { .. } => TranscriptionErrorKind::ProviderError,
            Self::InvalidResponse(_) => TranscriptionErrorKind::InvalidResponse,
        }
    }

    /// Whether the retry client should attempt this call again.
    pub fn is_transient(&self) -> bool {
        classify(self.kind()) == Retryability::Transient
    }

    /// Creates a provider error.
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ProviderError {
            status,
            message: message.into(),
        }
    }
}
