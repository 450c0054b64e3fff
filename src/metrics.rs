//! Metric helpers for `eventframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking frames produced by the frame decoder.
pub const FRAMES_DECODED: &str = "eventframe_frames_decoded_total";
/// Name of the counter tracking verified event-stream messages.
pub const MESSAGES_VERIFIED: &str = "eventframe_messages_verified_total";
/// Name of the counter tracking error occurrences, labelled by `kind`.
pub const ERRORS_TOTAL: &str = "eventframe_errors_total";
/// Name of the gauge tracking active merge inner sequences.
pub const MERGE_ACTIVE: &str = "eventframe_merge_active";

/// Record a decoded frame.
pub fn inc_frames() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_DECODED).increment(1);
}

/// Record an event-stream message that passed both checksums.
pub fn inc_messages() {
    #[cfg(feature = "metrics")]
    counter!(MESSAGES_VERIFIED).increment(1);
}

/// Record an error occurrence of the given kind.
pub fn inc_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Increment the active merge inner sequence gauge.
pub fn inc_merge_active() {
    #[cfg(feature = "metrics")]
    gauge!(MERGE_ACTIVE).increment(1.0);
}

/// Decrement the active merge inner sequence gauge.
pub fn dec_merge_active() {
    #[cfg(feature = "metrics")]
    gauge!(MERGE_ACTIVE).decrement(1.0);
}
