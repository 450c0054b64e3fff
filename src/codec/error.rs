//! Error types for the codec layer.
//!
//! This module provides a structured error taxonomy that distinguishes between
//! framing errors (frame boundaries and integrity), protocol errors (semantic
//! violations inside a verified message), I/O errors, and EOF conditions.
//!
//! # Error Categories
//!
//! - [`FramingError`]: Wire-level issues in frame structure (oversized frames, invalid length
//!   encoding, checksum and length mismatches).
//! - [`ProtocolError`]: Violations inside an event-stream header block.
//! - [`EofError`]: Input that ended part-way through a frame.
//! - [`CodecError`]: Top-level enum wrapping all categories plus I/O errors.

use std::io;

use thiserror::Error;

use super::recovery::RecoveryPolicy;

/// Which of the two event-stream checksums failed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumKind {
    /// CRC32 of the eight-byte prelude.
    Prelude,
    /// CRC32 of the whole message, excluding the trailing checksum.
    Message,
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prelude => f.write_str("prelude"),
            Self::Message => f.write_str("message"),
        }
    }
}

/// Framing-level errors occurring during frame boundary detection or
/// integrity verification.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Frame length prefix indicates size exceeding configured maximum.
    #[error("frame exceeds max length: {size} > {max}")]
    OversizedFrame {
        /// Size declared by the length prefix.
        size: usize,
        /// Maximum allowed frame size.
        max: usize,
    },

    /// Frame length prefix cannot describe a self-inclusive frame.
    #[error("invalid frame length encoding: {size} is smaller than the {header_size} byte header")]
    InvalidLengthEncoding {
        /// Size declared by the length prefix.
        size: usize,
        /// Width of the length prefix itself.
        header_size: usize,
    },

    /// A message is shorter than the fixed event-stream overhead.
    #[error("message too short: {length} bytes, minimum is {minimum}")]
    MessageTooShort {
        /// Actual buffer length.
        length: usize,
        /// Minimum message length.
        minimum: usize,
    },

    /// The declared total length disagrees with the buffer length.
    #[error("message length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        /// Length declared in the prelude.
        declared: usize,
        /// Length of the buffer handed to the parser.
        actual: usize,
    },

    /// Frame checksum mismatch.
    #[error("{kind} checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Which checksum failed.
        kind: ChecksumKind,
        /// Checksum carried on the wire.
        expected: u32,
        /// Checksum computed from the received bytes.
        actual: u32,
    },
}

/// Protocol-level errors found inside an integrity-checked event message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The declared header block does not fit inside the message.
    #[error("headers length {headers_length} exceeds available {available} bytes")]
    HeadersOverflow {
        /// Header block length declared in the prelude.
        headers_length: usize,
        /// Bytes available between the prelude and the trailing checksum.
        available: usize,
    },

    /// A header ended before its declared name or value length.
    #[error("truncated header at offset {offset}")]
    TruncatedHeader {
        /// Offset within the header block where decoding stopped.
        offset: usize,
    },

    /// A header carried an unrecognised value type tag.
    #[error("unknown header value type {tag} for header {name:?}")]
    InvalidHeaderType {
        /// Header name.
        name: String,
        /// Type tag found on the wire.
        tag: u8,
    },

    /// A header name or string value was not valid UTF-8.
    #[error("header {field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Name of the offending field, or the header name for values.
        field: String,
    },

    /// A header name or value is too long for its length prefix.
    #[error("header {name:?} exceeds the {max} byte limit")]
    HeaderTooLong {
        /// Header name (possibly truncated for display).
        name: String,
        /// Maximum encodable length.
        max: usize,
    },
}

/// Input ended before the frame in progress was complete.
///
/// End of input on a frame boundary is not an error; decoders report it as
/// the end of the stream.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// The stream ended after the size header but before the frame was
    /// complete.
    #[error("truncated message: {bytes_received} bytes of {expected} byte frame received")]
    Truncated {
        /// Frame bytes received before EOF, including the size header.
        bytes_received: usize,
        /// Total frame size declared by the size header.
        expected: usize,
    },

    /// The stream ended while the size header itself was being read.
    #[error("truncated message: {bytes_received} of {header_size} header bytes received")]
    TruncatedHeader {
        /// Header bytes received before EOF.
        bytes_received: usize,
        /// Width of the size header.
        header_size: usize,
    },
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use eventframe::codec::{CodecError, EofError, RecoveryPolicy};
///
/// let err = CodecError::Eof(EofError::Truncated {
///     bytes_received: 6,
///     expected: 32,
/// });
///
/// assert_eq!(err.default_recovery_policy(), RecoveryPolicy::Disconnect);
/// assert!(err.is_truncation());
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Framing layer error.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Protocol layer error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport layer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// End-of-stream handling.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),
}

impl CodecError {
    /// Returns the recommended recovery policy for this error.
    ///
    /// | Error Type | Policy |
    /// |------------|--------|
    /// | `Framing::OversizedFrame` | `Drop` |
    /// | `Framing::InvalidLengthEncoding` | `Disconnect` |
    /// | Other `Framing` errors | `Drop` |
    /// | All `Protocol` errors | `Drop` |
    /// | All `Io` errors | `Disconnect` |
    /// | All `Eof` errors | `Disconnect` |
    ///
    /// Checksum and length failures concern one fully delimited message, so
    /// the stream can carry on with the next frame. A corrupt length prefix
    /// loses frame synchronisation for good.
    #[must_use]
    pub fn default_recovery_policy(&self) -> RecoveryPolicy {
        match self {
            Self::Framing(FramingError::InvalidLengthEncoding { .. })
            | Self::Io(_)
            | Self::Eof(_) => RecoveryPolicy::Disconnect,
            Self::Framing(_) | Self::Protocol(_) => RecoveryPolicy::Drop,
        }
    }

    /// Returns true if the stream ended part-way through a frame.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::Eof(EofError::Truncated { .. } | EofError::TruncatedHeader { .. })
        )
    }

    /// Returns true if the stream should be abandoned.
    #[must_use]
    pub fn should_disconnect(&self) -> bool {
        self.default_recovery_policy() == RecoveryPolicy::Disconnect
    }

    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of: `"framing"`, `"protocol"`, `"io"`, or `"eof"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Protocol(_) => "protocol",
            Self::Io(_) => "io",
            Self::Eof(_) => "eof",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Framing(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            CodecError::Protocol(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            CodecError::Eof(e) => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
