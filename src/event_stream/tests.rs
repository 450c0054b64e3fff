//! Unit tests for event-stream message verification and header coding.

use bytes::{Bytes, BytesMut};
use futures::{StreamExt, executor::block_on, stream};
use rstest::{fixture, rstest};
use tokio_util::codec::Decoder;

use super::*;
use crate::codec::{ChecksumKind, CodecError, FramingError, ProtocolError};

#[fixture]
fn headers() -> Vec<EventHeader> {
    vec![
        EventHeader::new(":event-type", HeaderValue::String("chunk".into())),
        EventHeader::new(":content-type", HeaderValue::String("application/json".into())),
        EventHeader::new("retry", HeaderValue::Bool(false)),
        EventHeader::new("seq", HeaderValue::Long(-42)),
    ]
}

#[rstest]
fn parsed_lengths_match_layout(headers: Vec<EventHeader>) {
    let body = br#"{"bytes":"aGk="}"#;
    let message = encode_message(&headers, body).expect("encodable");
    let parsed = parse_message(&message).expect("valid message");

    let headers_length = parsed.headers().len();
    assert_eq!(
        parsed.body().len(),
        message.len() - headers_length - MINIMUM_MESSAGE_LENGTH
    );
    assert_eq!(parsed.body().as_ref(), body);
    assert_eq!(parsed.decode_headers().expect("valid headers"), headers);
}

#[test]
fn too_short_is_rejected() {
    let err = parse_message(&Bytes::from_static(&[0; 15])).expect_err("too short");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::MessageTooShort {
            length: 15,
            minimum: MINIMUM_MESSAGE_LENGTH,
        })
    ));
}

#[test]
fn declared_length_must_match_buffer() {
    let message = encode_message(&[], b"body").expect("encodable");
    let mut longer = BytesMut::from(message.as_ref());
    longer.extend_from_slice(&[0]);

    let err = parse_message(&longer.freeze()).expect_err("length mismatch");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::LengthMismatch {
            declared: 20,
            actual: 21,
        })
    ));
}

#[rstest]
#[case::headers_length_bit(5, ChecksumKind::Prelude)]
#[case::prelude_checksum(9, ChecksumKind::Prelude)]
#[case::body_bit(14, ChecksumKind::Message)]
#[case::trailing_checksum(20, ChecksumKind::Message)]
fn single_bit_flip_is_detected(#[case] index: usize, #[case] kind: ChecksumKind) {
    let message = encode_message(&[], b"payload").expect("encodable");
    let mut corrupted = BytesMut::from(message.as_ref());
    corrupted[index] ^= 0x01;

    let err = parse_message(&corrupted.freeze()).expect_err("corruption detected");
    assert!(
        matches!(
            &err,
            CodecError::Framing(FramingError::ChecksumMismatch { kind: k, .. }) if *k == kind
        ),
        "unexpected error {err:?}"
    );
}

#[test]
fn flipped_total_length_fails_before_checksum() {
    let message = encode_message(&[], b"payload").expect("encodable");
    let mut corrupted = BytesMut::from(message.as_ref());
    corrupted[3] ^= 0x01;

    let err = parse_message(&corrupted.freeze()).expect_err("length mismatch");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::LengthMismatch { .. })
    ));
}

#[test]
fn header_block_overflow_is_a_protocol_error() {
    // Headers length claims more bytes than the message holds; both
    // checksums are recomputed so only the overflow check can fail.
    let mut raw = BytesMut::new();
    raw.extend_from_slice(&[0, 0, 0, 16, 0, 0, 0, 9]);
    let prelude = crc32fast::hash(&raw);
    raw.extend_from_slice(&prelude.to_be_bytes());
    let full = crc32fast::hash(&raw);
    raw.extend_from_slice(&full.to_be_bytes());

    let err = parse_message(&raw.freeze()).expect_err("overflow");
    assert!(matches!(
        err,
        CodecError::Protocol(ProtocolError::HeadersOverflow {
            headers_length: 9,
            available: 0,
        })
    ));
}

#[test]
fn every_header_type_round_trips() {
    let all = vec![
        EventHeader::new("t", HeaderValue::Bool(true)),
        EventHeader::new("f", HeaderValue::Bool(false)),
        EventHeader::new("b", HeaderValue::Byte(-1)),
        EventHeader::new("s", HeaderValue::Short(i16::MIN)),
        EventHeader::new("i", HeaderValue::Integer(i32::MAX)),
        EventHeader::new("l", HeaderValue::Long(i64::MIN)),
        EventHeader::new("a", HeaderValue::ByteArray(Bytes::from_static(&[1, 2, 3]))),
        EventHeader::new("str", HeaderValue::String("héllo".into())),
        EventHeader::new("ts", HeaderValue::Timestamp(1_700_000_000_000)),
        EventHeader::new("id", HeaderValue::Uuid([7; 16])),
    ];
    let mut block = BytesMut::new();
    encode_headers(&all, &mut block).expect("encodable");
    assert_eq!(decode_headers(&block.freeze()).expect("decodable"), all);
}

#[rstest]
#[case::unknown_type(&[1, b'x', 42], "unknown header value type 42")]
#[case::truncated_name(&[5, b'a', b'b'], "truncated header at offset 1")]
#[case::truncated_value(&[1, b'x', 4, 0, 0], "truncated header at offset 3")]
fn malformed_header_blocks_are_rejected(#[case] block: &'static [u8], #[case] message: &str) {
    let err = decode_headers(&Bytes::from_static(block)).expect_err("malformed");
    assert!(
        err.to_string().contains(message),
        "expected '{message}' in '{err}'"
    );
}

#[test]
fn oversized_header_name_is_rejected() {
    let long = "n".repeat(256);
    let err = encode_headers(
        &[EventHeader::new(long, HeaderValue::Bool(true))],
        &mut BytesMut::new(),
    )
    .expect_err("name too long");
    assert!(matches!(err, ProtocolError::HeaderTooLong { max: 255, .. }));
}

#[rstest]
fn decoder_yields_messages_split_across_reads(headers: Vec<EventHeader>) {
    let first = encode_message(&headers, b"one").expect("encodable");
    let second = encode_message(&[], b"two").expect("encodable");
    let mut wire = BytesMut::new();
    wire.extend_from_slice(&first);
    wire.extend_from_slice(&second);

    let mut decoder = EventStreamDecoder::default();
    let mut src = BytesMut::new();
    let mut seen = Vec::new();
    for byte in wire {
        src.extend_from_slice(&[byte]);
        if let Some(message) = decoder.decode(&mut src).expect("valid stream") {
            seen.push(message.body().clone());
        }
    }
    assert_eq!(seen, vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")]);
}

#[test]
fn event_stream_skips_corrupt_message_and_continues() {
    let good = encode_message(&[], b"good").expect("encodable");
    let mut bad = BytesMut::from(good.as_ref());
    let last = bad.len() - 1;
    bad[last] ^= 0xFF;
    let chunks = stream::iter([
        Ok::<_, std::io::Error>(bad.freeze()),
        Ok(good.clone()),
    ]);

    let results: Vec<_> = block_on(decode_events(chunks).collect());
    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0],
        Err(CodecError::Framing(FramingError::ChecksumMismatch { .. }))
    ));
    let message = results[1].as_ref().expect("second message valid");
    assert_eq!(message.body().as_ref(), b"good");
}
