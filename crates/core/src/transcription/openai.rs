//! OpenAI Whisper API provider.

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::config::ProviderConfig;
use super::error::TranscriptionError;
use super::traits::TranscriptionProvider;
use super::types::TranscriptionResult;

/// Transcription provider backed by an OpenAI-compatible `audio/transcriptions` endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Creates a provider. Fails with `AuthenticationMissing` when no key is configured.
    pub fn new(config: ProviderConfig) -> Result<Self, TranscriptionError> {
        let api_key = config
            .api_key()
            .ok_or(TranscriptionError::AuthenticationMissing)?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranscriptionError::provider(None, format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

/// MIME type for an audio upload, by extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") | Some("aac") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Maps a non-success HTTP status to an error.
fn error_for_status(status: StatusCode, body: &str) -> TranscriptionError {
    let message = body.chars().take(300).collect::<String>();
    match status.as_u16() {
        429 => TranscriptionError::RateLimited(message),
        401 | 403 => TranscriptionError::AuthenticationRejected(message),
        400 | 422 => TranscriptionError::MalformedRequest(message),
        413 | 415 => TranscriptionError::UnsupportedInput(message),
        code => TranscriptionError::provider(Some(code), message),
    }
}

/// Maps a transport-level reqwest error.
fn error_for_transport(e: reqwest::Error) -> TranscriptionError {
    if e.is_timeout() {
        TranscriptionError::Timeout(e.to_string())
    } else if e.is_connect() || e.is_request() {
        TranscriptionError::ConnectionFailed(e.to_string())
    } else {
        TranscriptionError::provider(None, e.to_string())
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            TranscriptionError::UnsupportedInput(format!(
                "cannot read {}: {}",
                audio_path.display(),
                e
            ))
        })?;

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());

        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(audio_path))
            .map_err(|e| TranscriptionError::MalformedRequest(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        debug!(model = %self.model, path = %audio_path.display(), "Sending audio to transcription API");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(error_for_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(error_for_transport)?;

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        let result = TranscriptionResult::from_verbose_json(&body)?;
        debug!(
            chars = result.text.len(),
            segments = result.segments.len(),
            language = %result.language,
            "Transcription response parsed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptionErrorKind;

    #[test]
    fn test_new_without_key_fails() {
        let result = OpenAiProvider::new(ProviderConfig::default());
        assert!(matches!(
            result,
            Err(TranscriptionError::AuthenticationMissing)
        ));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let provider = OpenAiProvider::new(
            ProviderConfig::with_api_key("sk-test").with_base_url("http://localhost:9000/v1/"),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9000/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_status_mapping() {
        let kind = |code: u16| error_for_status(StatusCode::from_u16(code).unwrap(), "").kind();
        assert_eq!(kind(429), TranscriptionErrorKind::RateLimited);
        assert_eq!(kind(401), TranscriptionErrorKind::AuthenticationRejected);
        assert_eq!(kind(400), TranscriptionErrorKind::MalformedRequest);
        assert_eq!(kind(413), TranscriptionErrorKind::UnsupportedInput);
        assert_eq!(kind(500), TranscriptionErrorKind::ProviderError);
        // Gateway timeouts are server answers, not client-side timeouts.
        assert_eq!(kind(408), TranscriptionErrorKind::ProviderError);
        assert_eq!(kind(504), TranscriptionErrorKind::ProviderError);
        assert!(!error_for_status(StatusCode::GATEWAY_TIMEOUT, "").is_transient());
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("a.mp3")), "audio/mpeg");
        assert_eq!(mime_for(Path::new("a.WAV")), "audio/wav");
        assert_eq!(mime_for(Path::new("a.bin")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let audio = dir.path().join("clip.mp3");
        std::fs::write(&audio, b"ID3").unwrap();

        // Port 9 (discard) on localhost is almost never listening.
        let provider = OpenAiProvider::new(
            ProviderConfig::with_api_key("sk-test").with_base_url("http://127.0.0.1:9/v1"),
        )
        .unwrap();

        let err = provider.transcribe(&audio, None).await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {:?}", err);
    }
}
