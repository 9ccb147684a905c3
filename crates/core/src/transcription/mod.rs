//! Speech-to-text transcription.
//!
//! This module provides the `TranscriptionProvider` trait, an OpenAI Whisper
//! API implementation, and `RetryingTranscriptionClient`, which wraps any
//! provider with bounded exponential backoff for transient failures.
//!
//! Whether a failure is worth retrying is decided by [`classify`], a pure
//! mapping from [`TranscriptionErrorKind`] to [`Retryability`]. Error messages
//! never influence the decision.
//!
//! # Example
//!
//! ```ignore
//! use transcribe_core::transcription::{
//!     OpenAiProvider, ProviderConfig, RetryPolicy, RetryingTranscriptionClient,
//! };
//!
//! let provider = OpenAiProvider::new(ProviderConfig::with_api_key("sk-..."))?;
//! let client = RetryingTranscriptionClient::new(Arc::new(provider), RetryPolicy::default());
//!
//! let result = client.transcribe(Path::new("/tmp/talk.mp3"), None).await?;
//! println!("{} words in {}", result.word_count(), result.language);
//! ```

mod config;
mod error;
mod openai;
mod retry;
mod traits;
mod types;

pub use config::{ProviderConfig, RetryConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{classify, Retryability, TranscriptionError, TranscriptionErrorKind};
pub use openai::OpenAiProvider;
pub use retry::{RetryPolicy, RetryingTranscriptionClient, MAX_RETRY_DELAY_SECS};
pub use traits::TranscriptionProvider;
pub use types::{language_hint, TranscriptionResult, TranscriptionSegment};
