use crate::audio::{self, wav::encode_wav};

/// WHAT: WAV header declares mono 16-bit PCM at the fixed capture rate
/// WHY: The transcription service expects a standard 44.1 kHz mono payload
#[test]
#[allow(clippy::unwrap_used)]
fn given_samples_when_encoded_then_header_is_mono_16bit_44100() {
    // Given: 100 quiet samples
    let samples = vec![0.1f32; 100];

    // When: Encoding
    let bytes = encode_wav(&samples).unwrap();

    // Then: RIFF/WAVE container with the expected fmt fields
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");

    let channels = u16::from_le_bytes([bytes[22], bytes[23]]);
    let sample_rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let bits_per_sample = u16::from_le_bytes([bytes[34], bytes[35]]);

    assert_eq!(channels, audio::CHANNELS);
    assert_eq!(sample_rate, audio::SAMPLE_RATE);
    assert_eq!(bits_per_sample, 16);

    // Data chunk: two bytes per 16-bit sample
    let data_len = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
    assert_eq!(data_len as usize, samples.len() * 2);
}

/// WHAT: Out-of-range samples are clamped instead of wrapping
/// WHY: A hot microphone must clip audibly, not corrupt the payload
#[test]
#[allow(clippy::unwrap_used)]
fn given_out_of_range_samples_when_encoded_then_values_are_clamped() {
    let bytes = encode_wav(&[2.0, -2.0]).unwrap();

    let first = i16::from_le_bytes([bytes[44], bytes[45]]);
    let second = i16::from_le_bytes([bytes[46], bytes[47]]);

    assert_eq!(first, i16::MAX);
    assert_eq!(second, -i16::MAX);
}

/// WHAT: Encoding zero samples produces a valid empty WAV
/// WHY: The controller never encodes an empty buffer, but the encoder must
///      not fail if it ever does
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_samples_when_encoded_then_wav_has_empty_data_chunk() {
    let bytes = encode_wav(&[]).unwrap();

    assert_eq!(&bytes[0..4], b"RIFF");
    let data_len = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
    assert_eq!(data_len, 0);
}
