//! Canonical error and result types for the crate.
//!
//! Each component reports failures through its own error type; this module
//! gathers them into a single `EventframeError` surface for callers that
//! mix components, such as the bundled binary.

use thiserror::Error;

use crate::{codec::CodecError, merge::MergeConfigError, multipart::MultipartError};

/// Top-level error type exposed by `eventframe`.
#[derive(Debug, Error)]
pub enum EventframeError {
    /// Framing, checksum or event header failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// Malformed `multipart/form-data` body.
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
    /// Invalid merge configuration.
    #[error("merge configuration error: {0}")]
    MergeConfig(#[from] MergeConfigError),
    /// Underlying I/O failure.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Canonical result alias used by `eventframe` public APIs.
pub type Result<T> = std::result::Result<T, EventframeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{EofError, FramingError};

    #[test]
    fn wraps_component_errors() {
        let err: EventframeError = CodecError::from(FramingError::InvalidLengthEncoding {
            size: 2,
            header_size: 4,
        })
        .into();
        assert!(matches!(err, EventframeError::Codec(_)));
        assert!(err.to_string().starts_with("codec error:"));

        let err: EventframeError = MultipartError::InvalidBoundary(String::new()).into();
        assert!(matches!(err, EventframeError::Multipart(_)));
    }

    #[test]
    fn truncation_keeps_its_message() {
        let err: EventframeError = CodecError::from(EofError::Truncated {
            bytes_received: 6,
            expected: 32,
        })
        .into();
        assert_eq!(
            err.to_string(),
            "codec error: EOF: truncated message: 6 bytes of 32 byte frame received"
        );
    }
}
