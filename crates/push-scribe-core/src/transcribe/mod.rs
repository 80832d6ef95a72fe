//! Remote transcription client.
//!
//! Speaks the OpenAI-compatible `audio/transcriptions` multipart protocol.
//! The default endpoint is Groq's hosted Whisper; any compatible server
//! works. The call is network-bound and blocking from the caller's point
//! of view, so the controller always dispatches it off the UI thread.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, instrument};

/// Default OpenAI-compatible transcription endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

/// Default transcription model.
pub const DEFAULT_MODEL: &str = "whisper-large-v3-turbo";

/// Maximum response-body snippet carried in API errors.
const ERROR_BODY_SNIPPET: usize = 300;

/// Response-format selector for the transcription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Plain recognized text.
    Text,
    /// Structured JSON with timestamps; only the `text` field is consumed.
    VerboseJson,
}

impl ResponseFormat {
    /// Wire value for the `response_format` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Text => "text",
            ResponseFormat::VerboseJson => "verbose_json",
        }
    }
}

/// Transcription seam: accepts a WAV byte buffer, returns recognized text.
///
/// The controller only sees this trait, which keeps it testable with fakes.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one WAV payload.
    async fn transcribe(&self, wav_bytes: Vec<u8>) -> CoreResult<String>;
}

/// HTTP client for an OpenAI-compatible transcription endpoint.
pub struct GroqTranscriber {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    format: ResponseFormat,
}

impl GroqTranscriber {
    /// Create a client against the default Groq endpoint and model.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            format: ResponseFormat::Text,
        }
    }

    /// Override the endpoint (any OpenAI-compatible server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Select the response format.
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

#[async_trait]
impl Transcriber for GroqTranscriber {
    #[instrument(skip(self, wav_bytes), fields(payload_len = wav_bytes.len()))]
    async fn transcribe(&self, wav_bytes: Vec<u8>) -> CoreResult<String> {
        let part = Part::bytes(wav_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| CoreError::InvalidResponse {
                reason: format!("Failed to build multipart payload: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", self.format.as_str());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CoreError::TranscriptionNetwork {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::TranscriptionNetwork {
                reason: format!("Failed to read response body: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), &body));
        }

        let text = parse_success_body(self.format, &body)?;

        info!(text_len = text.len(), "Transcription received");

        Ok(text)
    }
}

/// Map a non-success HTTP status to the error taxonomy: 401/403 are auth
/// failures, everything else is an API error carrying a body snippet.
#[track_caller]
pub(crate) fn error_for_status(status: u16, body: &str) -> CoreError {
    match status {
        401 | 403 => CoreError::TranscriptionAuth {
            status,
            location: ErrorLocation::from(Location::caller()),
        },
        _ => CoreError::TranscriptionApi {
            status,
            body: body.chars().take(ERROR_BODY_SNIPPET).collect(),
            location: ErrorLocation::from(Location::caller()),
        },
    }
}

/// Extract recognized text from a successful response body.
#[track_caller]
pub(crate) fn parse_success_body(format: ResponseFormat, body: &str) -> CoreResult<String> {
    match format {
        ResponseFormat::Text => Ok(body.trim().to_string()),
        ResponseFormat::VerboseJson => {
            let value: serde_json::Value =
                serde_json::from_str(body).map_err(|e| CoreError::InvalidResponse {
                    reason: format!("Response is not valid JSON: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let text = value.get("text").and_then(|t| t.as_str()).ok_or_else(|| {
                CoreError::InvalidResponse {
                    reason: "Response JSON has no `text` field".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

            debug!("Extracted text from verbose_json response");

            Ok(text.trim().to_string())
        }
    }
}
