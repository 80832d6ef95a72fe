//! Push-Scribe Core Library
//!
//! Audio capture and remote transcription primitives for push-to-talk
//! dictation: a dedicated capture worker thread (CPAL), in-memory WAV
//! encoding, and an OpenAI-compatible transcription client.
//!
//! # Example
//!
//! ```no_run
//! use push_scribe_core::{CaptureBackend, CoreResult, GroqTranscriber, MicCapture, encode_wav};
//!
//! use std::{thread::sleep, time::Duration};
//!
//! # async fn record() -> CoreResult<()> {
//! let mut capture = MicCapture::new();
//! capture.start()?;
//! sleep(Duration::from_secs(3));
//! let samples = capture.stop()?;
//!
//! let wav = encode_wav(&samples)?;
//! use push_scribe_core::Transcriber;
//! let client = GroqTranscriber::new("gsk_...".to_string());
//! let text = client.transcribe(wav).await?;
//! println!("Transcribed: {}", text);
//! # Ok(())
//! # }
//! ```

mod audio;
mod error;
mod transcribe;

pub use {
    audio::{AudioChunk, CHANNELS, CaptureBackend, MicCapture, SAMPLE_RATE, concat_chunks,
        encode_wav},
    error::{CoreError, Result as CoreResult},
    transcribe::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GroqTranscriber, ResponseFormat, Transcriber},
};

#[cfg(test)]
mod tests;
