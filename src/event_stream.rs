//! Checksum-verified event-stream messages.
//!
//! An event-stream message is a frame in the [`codec`](crate::codec) format
//! whose payload carries an integrity-checked layout:
//!
//! ```text
//! +-------------+---------------+-------------+---------+------+-------------+
//! | total (u32) | headers (u32) | prelude CRC | headers | body | message CRC |
//! +-------------+---------------+-------------+---------+------+-------------+
//! ```
//!
//! The prelude CRC covers the first eight bytes. The message CRC covers
//! everything before it, prelude and prelude CRC included. All integers are
//! big-endian.

mod decoder;
mod header;
mod message;

pub use decoder::{EventStream, EventStreamDecoder, decode_events};
pub use header::{EventHeader, HeaderValue, decode_headers, encode_headers};
pub use message::{EventMessage, encode_message, parse_message};

/// Length of the prelude (total length and headers length).
pub const PRELUDE_LENGTH: usize = 8;
/// Length of each CRC32 checksum.
pub const CHECKSUM_LENGTH: usize = 4;
/// Length of the prelude together with its checksum.
pub const PRELUDE_TOTAL_LENGTH: usize = PRELUDE_LENGTH + CHECKSUM_LENGTH;
/// Smallest valid message: prelude, prelude checksum and message checksum.
pub const MINIMUM_MESSAGE_LENGTH: usize = PRELUDE_TOTAL_LENGTH + CHECKSUM_LENGTH;

#[cfg(test)]
mod tests;
