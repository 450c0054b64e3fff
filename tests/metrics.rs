#![cfg(feature = "metrics")]
//! Tests for `eventframe` metrics helpers.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.

use bytes::Bytes;
use eventframe::{
    codec::MessageFrameDecoder,
    event_stream::{encode_message, parse_message},
    metrics::{ERRORS_TOTAL, FRAMES_DECODED, MERGE_ACTIVE, MESSAGES_VERIFIED},
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter_value(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && label.is_none_or(|(k, v)| key.key().labels().any(|l| l.key() == k && l.value() == v))
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}

#[test]
fn decoded_frames_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut decoder = MessageFrameDecoder::default();
        let mut input = Bytes::from_static(&[0, 0, 0, 5, 1, 0, 0, 0, 4]);
        while decoder.feed(&mut input).expect("valid frames").is_some() {}
    });

    assert_eq!(counter_value(&snapshotter, FRAMES_DECODED, None), 2);
}

#[rstest]
#[case::valid(None, 1, 0)]
#[case::corrupted(Some(3), 0, 1)]
fn message_verification_is_counted(
    #[case] flip: Option<usize>,
    #[case] verified: u64,
    #[case] framing_errors: u64,
) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut wire = encode_message(&[], b"body").expect("small message").to_vec();
        if let Some(index) = flip {
            wire[index] ^= 0x01;
        }
        let _ = parse_message(&Bytes::from(wire));
    });

    assert_eq!(counter_value(&snapshotter, MESSAGES_VERIFIED, None), verified);
    assert_eq!(
        counter_value(&snapshotter, ERRORS_TOTAL, Some(("kind", "framing"))),
        framing_errors
    );
}

#[test]
fn merge_gauge_tracks_active_inners() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        eventframe::metrics::inc_merge_active();
        eventframe::metrics::inc_merge_active();
        eventframe::metrics::dec_merge_active();
    });

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == MERGE_ACTIVE
            && matches!(v, DebugValue::Gauge(g) if (g.into_inner() - 1.0).abs() < f64::EPSILON)
    });
    assert!(found, "merge gauge not recorded");
}
