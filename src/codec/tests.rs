//! Unit tests for the length-prefixed frame decoder and encoder.
//!
//! Covers chunk boundaries inside the size header, several frames per chunk,
//! EOF handling, and size header validation.

use bytes::{Bytes, BytesMut};
use rstest::rstest;
use tokio_util::codec::{Decoder, Encoder};

use super::*;

fn frame(payload: &[u8]) -> Bytes { encode_frame(payload).expect("payload fits") }

#[test]
fn frame_config_clamps_limits() {
    assert_eq!(
        FrameConfig::new(MAX_FRAME_LENGTH.saturating_add(1)).max_frame_length(),
        MAX_FRAME_LENGTH
    );
    assert_eq!(FrameConfig::new(0).max_frame_length(), MIN_FRAME_LENGTH);
}

#[test]
fn emitted_frame_keeps_size_header() {
    let mut decoder = MessageFrameDecoder::default();
    let mut input = frame(b"abc");
    let out = decoder
        .feed(&mut input)
        .expect("valid frame")
        .expect("frame complete");
    assert_eq!(out.as_ref(), &[0, 0, 0, 7, b'a', b'b', b'c']);
    assert!(decoder.is_idle());
}

#[rstest]
#[case::after_one(1)]
#[case::after_two(2)]
#[case::after_three(3)]
#[case::after_header(4)]
#[case::mid_payload(6)]
fn split_anywhere_yields_same_frame(#[case] split: usize) {
    let whole = frame(b"payload");
    let mut first = whole.slice(..split);
    let mut second = whole.slice(split..);
    let mut decoder = MessageFrameDecoder::default();

    assert!(decoder.feed(&mut first).expect("valid prefix").is_none());
    assert!(!decoder.is_idle());
    let out = decoder
        .feed(&mut second)
        .expect("valid suffix")
        .expect("frame complete");
    assert_eq!(out, whole);
}

#[test]
fn several_frames_in_one_chunk_are_yielded_in_order() {
    let mut chunk = BytesMut::new();
    chunk.extend_from_slice(&frame(b"one"));
    chunk.extend_from_slice(&frame(b""));
    chunk.extend_from_slice(&frame(b"three"));
    let mut chunk = chunk.freeze();
    let mut decoder = MessageFrameDecoder::default();

    let mut seen = Vec::new();
    while let Some(out) = decoder.feed(&mut chunk).expect("valid frames") {
        seen.push(out);
    }
    assert_eq!(seen, vec![frame(b"one"), frame(b""), frame(b"three")]);
    assert!(chunk.is_empty());
}

#[test]
fn finish_without_partial_frame_is_clean() {
    let mut decoder = MessageFrameDecoder::default();
    assert!(decoder.finish().expect("clean end").is_none());
}

#[test]
fn finish_mid_payload_reports_truncation() {
    let mut decoder = MessageFrameDecoder::default();
    let mut partial = frame(b"truncated").slice(..6);
    assert!(decoder.feed(&mut partial).expect("valid prefix").is_none());

    let err = decoder.finish().expect_err("truncated input");
    assert!(matches!(
        err,
        CodecError::Eof(EofError::Truncated {
            bytes_received: 6,
            expected: 13,
        })
    ));
    assert!(decoder.is_idle(), "decoder resets after truncation");
}

#[test]
fn finish_mid_header_reports_truncated_header() {
    let mut decoder = MessageFrameDecoder::default();
    let mut partial = Bytes::from_static(&[0, 0]);
    assert!(decoder.feed(&mut partial).expect("valid prefix").is_none());

    let err = decoder.finish().expect_err("truncated header");
    assert!(matches!(
        err,
        CodecError::Eof(EofError::TruncatedHeader {
            bytes_received: 2,
            header_size: LENGTH_HEADER_SIZE,
        })
    ));
}

#[rstest]
#[case::zero(0)]
#[case::three(3)]
fn size_smaller_than_header_is_rejected(#[case] size: u8) {
    let mut decoder = MessageFrameDecoder::default();
    let mut input = Bytes::from(vec![0, 0, 0, size, 1, 2, 3]);
    let err = decoder.feed(&mut input).expect_err("invalid size");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::InvalidLengthEncoding { .. })
    ));
    assert!(err.should_disconnect());
}

#[test]
fn oversized_frame_is_skipped_and_decoding_resumes() {
    let mut decoder = MessageFrameDecoder::new(FrameConfig::new(MIN_FRAME_LENGTH));
    let big = frame(&[7_u8; MIN_FRAME_LENGTH]);
    let small = frame(b"ok");
    let mut input = BytesMut::new();
    input.extend_from_slice(&big);
    input.extend_from_slice(&small);
    let mut input = input.freeze();

    let err = decoder.feed(&mut input).expect_err("oversized frame");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::OversizedFrame { .. })
    ));
    assert!(!err.should_disconnect());

    let out = decoder
        .feed(&mut input)
        .expect("decoding resumes")
        .expect("small frame complete");
    assert_eq!(out, small);
}

#[test]
fn decode_eof_flushes_then_reports_truncation() {
    let mut decoder = MessageFrameDecoder::default();
    let mut src = BytesMut::new();
    src.extend_from_slice(&frame(b"done"));
    src.extend_from_slice(&[0, 0, 0, 9, 1]);

    let first = decoder.decode_eof(&mut src).expect("first frame");
    assert_eq!(first, Some(frame(b"done")));
    let err = decoder.decode_eof(&mut src).expect_err("partial frame");
    assert!(err.is_truncation());
}

#[test]
fn encoder_rejects_frames_over_limit() {
    let mut encoder = MessageFrameEncoder::new(FrameConfig::new(MIN_FRAME_LENGTH));
    let mut dst = BytesMut::new();
    let payload = Bytes::from(vec![0_u8; MIN_FRAME_LENGTH]);

    let err = encoder.encode(payload, &mut dst).expect_err("too large");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::OversizedFrame { size, .. }) if size == MIN_FRAME_LENGTH + 4
    ));
    assert!(dst.is_empty());
}

#[test]
fn encoder_output_decodes() {
    let mut encoder = MessageFrameEncoder::default();
    let mut decoder = MessageFrameDecoder::default();
    let mut buf = BytesMut::new();
    encoder
        .encode(Bytes::from_static(b"xyz"), &mut buf)
        .expect("encode should succeed");

    let out = decoder
        .decode(&mut buf)
        .expect("decode should succeed")
        .expect("expected a frame");
    assert_eq!(&out[LENGTH_HEADER_SIZE..], b"xyz");
}
