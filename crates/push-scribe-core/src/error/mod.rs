use error_location::ErrorLocation;
use thiserror::Error;

/// Audio capture and transcription errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture worker is already running.
    #[error("Capture already in progress {location}")]
    CaptureBusy {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture worker thread misbehaved (failed handshake, lost channel).
    #[error("Capture thread error: {reason} {location}")]
    CaptureThread {
        /// Description of the thread failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// WAV encoding failed.
    #[error("WAV encode error: {reason} {location}")]
    WavEncode {
        /// Description of the encoding failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The transcription service rejected our credentials.
    #[error("Transcription auth error (HTTP {status}) {location}")]
    TranscriptionAuth {
        /// HTTP status code returned by the service.
        status: u16,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Could not reach the transcription service.
    #[error("Transcription network error: {reason} {location}")]
    TranscriptionNetwork {
        /// Description of the transport failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The transcription service returned a non-success status.
    #[error("Transcription API error (HTTP {status}): {body} {location}")]
    TranscriptionApi {
        /// HTTP status code returned by the service.
        status: u16,
        /// Snippet of the response body for diagnostics.
        body: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The transcription service returned a body we could not interpret.
    #[error("Invalid transcription response: {reason} {location}")]
    InvalidResponse {
        /// Description of what was wrong with the response.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
