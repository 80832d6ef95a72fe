use crate::audio::chunk::{AudioChunk, concat_chunks};

/// WHAT: Concatenating N chunks yields a buffer of length sum(s_i) in order
/// WHY: Frames come from a realtime callback and must never be reordered
#[test]
fn given_chunks_of_varying_sizes_when_concatenated_then_order_and_length_preserved() {
    // Given: Three chunks with distinguishable contents and sizes
    let chunks = vec![
        AudioChunk::new(vec![1.0; 441]),
        AudioChunk::new(vec![2.0; 100]),
        AudioChunk::new(vec![3.0; 7]),
    ];

    // When: Concatenating
    let buffer = concat_chunks(&chunks);

    // Then: Total length is the sum and chunk contents appear in append order
    assert_eq!(buffer.len(), 441 + 100 + 7);
    assert!(buffer[..441].iter().all(|&s| (s - 1.0).abs() < f32::EPSILON));
    assert!(
        buffer[441..541]
            .iter()
            .all(|&s| (s - 2.0).abs() < f32::EPSILON)
    );
    assert!(buffer[541..].iter().all(|&s| (s - 3.0).abs() < f32::EPSILON));
}

/// WHAT: Zero chunks concatenate to an explicit empty buffer
/// WHY: The controller classifies an empty result as "too short", not an error
#[test]
fn given_no_chunks_when_concatenated_then_result_is_empty() {
    let buffer = concat_chunks(&[]);
    assert!(buffer.is_empty());
}

/// WHAT: A single empty chunk still concatenates cleanly
/// WHY: Some backends deliver zero-length callbacks on device quirks
#[test]
fn given_empty_chunk_when_concatenated_then_result_is_empty() {
    let chunks = vec![AudioChunk::new(Vec::new())];
    assert!(concat_chunks(&chunks).is_empty());
}
