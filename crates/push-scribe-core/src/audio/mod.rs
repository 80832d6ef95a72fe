pub(crate) mod capture;
pub(crate) mod chunk;
pub(crate) mod wav;

pub use {
    capture::{CaptureBackend, MicCapture},
    chunk::{AudioChunk, concat_chunks},
    wav::encode_wav,
};

/// Fixed capture sample rate. The transcription payload is always mono
/// 44.1 kHz, matching the WAV artifact the service expects.
pub const SAMPLE_RATE: u32 = 44_100;

/// Fixed capture channel count (mono).
pub const CHANNELS: u16 = 1;
