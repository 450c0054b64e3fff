//! Error types for multipart parsing.

use thiserror::Error;

/// Grammar violation in a section header block.
///
/// Each variant carries the byte offset at which parsing stopped. The type is
/// `Copy` so failing a parse never allocates.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HeaderParseError {
    /// The header block ended without a `Content-Disposition` name.
    #[error("header block at offset {0} ended without a content-disposition name")]
    MissingName(usize),
    /// A header name is empty or contains non-token bytes.
    #[error("invalid header name at offset {0}")]
    InvalidHeaderName(usize),
    /// A header name is not followed by `:`.
    #[error("expected ':' after header name at offset {0}")]
    MissingColon(usize),
    /// `Content-Disposition` does not match `form-data; name="..."`.
    #[error("malformed content-disposition at offset {0}")]
    MalformedDisposition(usize),
    /// A header line does not end in CRLF.
    #[error("header line not terminated by CRLF at offset {0}")]
    MissingCrlf(usize),
}

impl HeaderParseError {
    /// Offset at which parsing stopped.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::MissingName(offset)
            | Self::InvalidHeaderName(offset)
            | Self::MissingColon(offset)
            | Self::MalformedDisposition(offset)
            | Self::MissingCrlf(offset) => offset,
        }
    }
}

/// Failure while walking a complete `multipart/form-data` body.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    /// The boundary is empty or longer than 70 bytes.
    #[error("invalid boundary {0:?}")]
    InvalidBoundary(String),
    /// A boundary delimiter was expected.
    #[error("expected boundary delimiter at offset {offset}")]
    MissingBoundary {
        /// Offset where the delimiter should start.
        offset: usize,
    },
    /// A CRLF was expected.
    #[error("expected CRLF at offset {offset}")]
    MissingCrlf {
        /// Offset where the CRLF should start.
        offset: usize,
    },
    /// A section body is not followed by a boundary delimiter.
    #[error("section body starting at offset {offset} is not terminated by the boundary")]
    UnterminatedBody {
        /// Offset where the section body starts.
        offset: usize,
    },
    /// A section header block is malformed.
    #[error("invalid section headers: {0}")]
    Headers(#[from] HeaderParseError),
}
