//! Utilities for exercising `eventframe` decoders in tests.
//!
//! Provides builders for well-formed and corrupted wire bytes, helpers that
//! re-chunk a byte sequence at chosen split points, an in-memory driver for
//! `tokio_util` decoders and a serialised log capture fixture.
//!
//! ```rust
//! use eventframe_testing::{chunk_stream, length_prefixed, split_at};
//!
//! let wire = length_prefixed(b"hello");
//! let chunks = split_at(&wire, &[2, 6]);
//! assert_eq!(chunks.len(), 3);
//! let _stream = chunk_stream(chunks);
//! ```

pub mod chunks;
pub mod fixtures;
pub mod logging;

pub use chunks::{
    byte_by_byte,
    chunk_stream,
    decode_with_chunks,
    fixed_chunks,
    split_at,
};
pub use fixtures::{
    event_message,
    flip_bit,
    form_data_body,
    length_prefixed,
    truncated,
};
pub use logging::{LoggerHandle, logger};
