use crate::{CoreError, CoreResult, audio};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

/// Encode f32 samples as a 16-bit PCM mono WAV at the fixed capture rate.
///
/// Produced entirely in memory; the caller decides where the bytes go
/// (temp artifact file, upload payload).
#[track_caller]
pub fn encode_wav(samples: &[f32]) -> CoreResult<Vec<u8>> {
    let spec = WavSpec {
        channels: audio::CHANNELS,
        sample_rate: audio::SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = WavWriter::new(cursor, spec).map_err(|e| CoreError::WavEncode {
            reason: format!("Failed to create WAV writer: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        for &sample in samples {
            let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer
                .write_sample(quantized)
                .map_err(|e| CoreError::WavEncode {
                    reason: format!("Failed to write sample: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        writer.finalize().map_err(|e| CoreError::WavEncode {
            reason: format!("Failed to finalize WAV: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
    }

    debug!(
        sample_count = samples.len(),
        byte_len = bytes.len(),
        "WAV payload encoded"
    );

    Ok(bytes)
}
