//! Integration coverage for `eventframe_testing` helpers.

use eventframe::{codec::MessageFrameDecoder, event_stream::HeaderValue};
use eventframe_testing::{
    byte_by_byte,
    decode_with_chunks,
    event_message,
    fixed_chunks,
    flip_bit,
    length_prefixed,
    split_at,
};

#[test]
fn split_points_cover_the_input() {
    let wire = length_prefixed(b"payload");
    let chunks = split_at(&wire, &[0, 3, 3, 9]);
    assert_eq!(chunks.len(), 5);
    assert!(chunks[0].is_empty());
    assert!(chunks[2].is_empty());
    assert_eq!(chunks.concat(), wire);
}

#[test]
fn fixed_chunks_respect_size() {
    let chunks = fixed_chunks(&[1, 2, 3, 4, 5], 2);
    assert_eq!(chunks.iter().map(bytes::Bytes::len).collect::<Vec<_>>(), vec![2, 2, 1]);
}

#[test]
fn flip_bit_changes_one_byte() {
    let message = event_message(&[("k", HeaderValue::Bool(true))], b"body");
    let flipped = flip_bit(&message, 4);
    let differing = message.iter().zip(flipped.iter()).filter(|(a, b)| a != b).count();
    assert_eq!(differing, 1);
}

#[tokio::test]
async fn duplex_driver_feeds_decoder() {
    let mut wire = length_prefixed(b"one");
    wire.extend(length_prefixed(b"two"));
    let results = decode_with_chunks(MessageFrameDecoder::default(), byte_by_byte(&wire)).await;
    let frames: Vec<_> = results
        .into_iter()
        .map(|r| r.expect("frame decodes"))
        .collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[1][4..], b"two");
}
