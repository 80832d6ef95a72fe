use std::time::Instant;

/// One callback-sized block of captured samples.
///
/// Chunks are appended by the capture worker in callback order and are
/// immutable afterwards. They are only read once the worker has stopped.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// When the device callback delivered this block.
    pub captured_at: Instant,
    /// Interleaved samples (mono, so one sample per frame).
    pub samples: Vec<f32>,
}

impl AudioChunk {
    /// Create a chunk timestamped now.
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            captured_at: Instant::now(),
            samples,
        }
    }
}

/// Concatenate chunks into one contiguous sample buffer, preserving
/// append order. Frames come from a realtime callback and must never be
/// reordered or dropped. Zero chunks yield an empty buffer, not an error.
pub fn concat_chunks(chunks: &[AudioChunk]) -> Vec<f32> {
    let total: usize = chunks.iter().map(|c| c.samples.len()).sum();
    let mut out = Vec::with_capacity(total);
    for chunk in chunks {
        out.extend_from_slice(&chunk.samples);
    }
    out
}
