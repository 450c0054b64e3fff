//! Length-prefixed framing for chunked byte streams.
//!
//! Every frame starts with a 4-byte big-endian size that counts the whole
//! frame, size header included. [`MessageFrameDecoder`] turns arbitrarily
//! chunked input into complete frames and [`MessageFrameEncoder`] writes
//! them. Emitted frames keep their size header so they remain
//! self-describing for the next layer (see [`crate::event_stream`]).
//!
//! # Error Handling
//!
//! The codec layer reports failures through [`CodecError`], which
//! distinguishes framing errors, protocol errors, I/O errors, and EOF
//! conditions. Each error carries a default [`RecoveryPolicy`]:
//!
//! - [`RecoveryPolicy::Drop`]: Discard the offending message and continue.
//! - [`RecoveryPolicy::Disconnect`]: Abandon the stream.

pub mod error;
mod frame;
pub mod recovery;
mod stream;

pub use error::{ChecksumKind, CodecError, EofError, FramingError, ProtocolError};
pub use frame::{MessageFrameDecoder, MessageFrameEncoder, encode_frame};
pub use recovery::{DefaultRecoveryPolicy, RecoveryPolicy, RecoveryPolicyHook};
pub use stream::{MessageFrames, decode_frames};

/// Width of the big-endian size header that starts every frame.
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Minimum configurable frame length in bytes.
///
/// Frame lengths passed to [`FrameConfig::new`] are clamped to at least this
/// value.
pub const MIN_FRAME_LENGTH: usize = 64;

/// Maximum frame length in bytes (16 MiB).
///
/// Frame lengths passed to [`FrameConfig::new`] are clamped to at most this
/// value to prevent unbounded allocation from a hostile size header.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

pub(crate) fn clamp_frame_length(value: usize) -> usize {
    value.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH)
}

/// Limits applied while decoding and encoding frames.
///
/// # Examples
///
/// ```
/// use eventframe::codec::{FrameConfig, MAX_FRAME_LENGTH, MIN_FRAME_LENGTH};
///
/// assert_eq!(FrameConfig::new(1).max_frame_length(), MIN_FRAME_LENGTH);
/// assert_eq!(FrameConfig::default().max_frame_length(), MAX_FRAME_LENGTH);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    max_frame_length: usize,
}

impl FrameConfig {
    /// Construct a configuration, clamping `max_frame_length` to
    /// [`MIN_FRAME_LENGTH`]..=[`MAX_FRAME_LENGTH`].
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: clamp_frame_length(max_frame_length),
        }
    }

    /// Largest frame, size header included, that will be accepted.
    #[must_use]
    pub const fn max_frame_length(&self) -> usize { self.max_frame_length }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_length: MAX_FRAME_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests;
