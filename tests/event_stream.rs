//! Integration tests for checksummed event-stream decoding.

use std::sync::Arc;

use bytes::Bytes;
use eventframe::{
    codec::{ChecksumKind, CodecError, FramingError, RecoveryPolicy, RecoveryPolicyHook},
    event_stream::{EventStream, EventStreamDecoder, HeaderValue, decode_events},
};
use eventframe_testing::{
    LoggerHandle,
    byte_by_byte,
    chunk_stream,
    decode_with_chunks,
    event_message,
    fixed_chunks,
    flip_bit,
    logger,
};
use futures::{StreamExt, executor::block_on};
use rstest::rstest;

fn sample() -> Bytes {
    event_message(
        &[
            (":event-type", HeaderValue::String("Records".into())),
            (":message-type", HeaderValue::String("event".into())),
            ("seq", HeaderValue::Long(42)),
        ],
        b"{\"id\":1}",
    )
}

#[test]
fn messages_survive_any_chunk_size() {
    let mut wire = sample().to_vec();
    wire.extend_from_slice(&event_message(&[], b""));
    for size in [1, 3, 7, 16, wire.len()] {
        let messages: Vec<_> = block_on(decode_events(chunk_stream(fixed_chunks(&wire, size))).collect());
        assert_eq!(messages.len(), 2, "chunk size {size}");
        let first = messages[0].as_ref().expect("first message verifies");
        assert_eq!(first.body().as_ref(), b"{\"id\":1}");
        let headers = first.decode_headers().expect("headers decode");
        assert_eq!(headers[0].value().as_str(), Some("Records"));
        assert_eq!(headers[2].value(), &HeaderValue::Long(42));
        let second = messages[1].as_ref().expect("second message verifies");
        assert!(second.headers().is_empty());
    }
}

#[rstest]
#[case::prelude(9, ChecksumKind::Prelude)]
#[case::header_block(14, ChecksumKind::Message)]
#[case::body(72, ChecksumKind::Message)]
fn corrupted_message_is_skipped(#[case] index: usize, #[case] kind: ChecksumKind) {
    let good = sample();
    let mut wire = flip_bit(&good, index).to_vec();
    wire.extend_from_slice(&good);

    let results: Vec<_> = block_on(decode_events(chunk_stream(byte_by_byte(&wire))).collect());

    assert_eq!(results.len(), 2);
    assert!(matches!(
        &results[0],
        Err(CodecError::Framing(FramingError::ChecksumMismatch { kind: k, .. })) if *k == kind
    ));
    assert!(results[1].is_ok());
}

#[rstest]
fn checksum_failure_is_logged(mut logger: LoggerHandle) {
    let corrupted = flip_bit(&sample(), 20);
    let results: Vec<_> =
        block_on(EventStream::new(chunk_stream(vec![corrupted]), Default::default()).collect());
    assert!(results[0].is_err());

    let records = logger.take_matching("checksum mismatch");
    assert!(!records.is_empty());
    assert!(records.iter().all(|(level, _)| *level == log::Level::Warn));
}

#[tokio::test]
async fn framed_read_stops_on_first_error() {
    let good = sample();
    let mut wire = good.to_vec();
    wire.extend_from_slice(&flip_bit(&good, 30));
    wire.extend_from_slice(&good);

    let results = decode_with_chunks(EventStreamDecoder::default(), fixed_chunks(&wire, 5)).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().is_err_and(|e| !e.should_disconnect()));
}

struct StopOnChecksum;

impl RecoveryPolicyHook for StopOnChecksum {
    fn recovery_policy(&self, error: &CodecError) -> RecoveryPolicy {
        match error {
            CodecError::Framing(FramingError::ChecksumMismatch { .. }) => RecoveryPolicy::Disconnect,
            other => other.default_recovery_policy(),
        }
    }
}

#[test]
fn recovery_hook_can_end_the_stream() {
    let good = sample();
    let mut wire = flip_bit(&good, 40).to_vec();
    wire.extend_from_slice(&good);

    let results: Vec<_> = block_on(
        EventStream::new(chunk_stream(vec![Bytes::from(wire)]), Default::default())
            .with_recovery_policy(Arc::new(StopOnChecksum))
            .collect(),
    );

    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}
