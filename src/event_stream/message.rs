//! Parsing and encoding of a single, fully buffered event-stream message.

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    CHECKSUM_LENGTH,
    MINIMUM_MESSAGE_LENGTH,
    PRELUDE_LENGTH,
    PRELUDE_TOTAL_LENGTH,
    header::{EventHeader, decode_headers, encode_headers},
};
use crate::{
    byte_order::{read_network_u32_at, write_network_u32},
    codec::{ChecksumKind, CodecError, FramingError, ProtocolError},
    metrics,
};

/// Headers and body of a verified event-stream message.
///
/// Both parts are zero-copy views into the original message buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMessage {
    headers: Bytes,
    body: Bytes,
}

impl EventMessage {
    /// Raw header block.
    #[must_use]
    pub fn headers(&self) -> &Bytes { &self.headers }

    /// Message body.
    #[must_use]
    pub fn body(&self) -> &Bytes { &self.body }

    /// Decode the header block into typed headers.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the header block is malformed.
    pub fn decode_headers(&self) -> Result<Vec<EventHeader>, ProtocolError> {
        decode_headers(&self.headers)
    }

    /// Split into `(headers, body)`.
    #[must_use]
    pub fn into_parts(self) -> (Bytes, Bytes) { (self.headers, self.body) }
}

fn read_u32(message: &[u8], offset: usize) -> Result<u32, FramingError> {
    read_network_u32_at(message, offset).ok_or(FramingError::MessageTooShort {
        length: message.len(),
        minimum: MINIMUM_MESSAGE_LENGTH,
    })
}

fn checksum_failure(kind: ChecksumKind, expected: u32, actual: u32) -> CodecError {
    tracing::warn!(
        %kind,
        expected = format_args!("{expected:#010x}"),
        actual = format_args!("{actual:#010x}"),
        "event-stream checksum mismatch"
    );
    metrics::inc_errors("framing");
    FramingError::ChecksumMismatch {
        kind,
        expected,
        actual,
    }
    .into()
}

/// Verify and split one complete event-stream message.
///
/// # Errors
///
/// Returns a [`FramingError`] when the message is shorter than
/// [`MINIMUM_MESSAGE_LENGTH`], its declared total length differs from the
/// buffer length, or either checksum fails, and
/// [`ProtocolError::HeadersOverflow`] when the declared header block does not
/// fit.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use eventframe::event_stream::{encode_message, parse_message};
///
/// let message = encode_message(&[], b"{}").expect("small message");
/// let parsed = parse_message(&message).expect("valid message");
/// assert!(parsed.headers().is_empty());
/// assert_eq!(parsed.body().as_ref(), b"{}");
/// ```
pub fn parse_message(message: &Bytes) -> Result<EventMessage, CodecError> {
    let length = message.len();
    if length < MINIMUM_MESSAGE_LENGTH {
        metrics::inc_errors("framing");
        return Err(FramingError::MessageTooShort {
            length,
            minimum: MINIMUM_MESSAGE_LENGTH,
        }
        .into());
    }

    let declared = read_u32(message, 0)? as usize;
    if declared != length {
        metrics::inc_errors("framing");
        return Err(FramingError::LengthMismatch {
            declared,
            actual: length,
        }
        .into());
    }

    let headers_length = read_u32(message, 4)? as usize;
    let prelude_checksum = read_u32(message, PRELUDE_LENGTH)?;
    let actual_prelude = crc32fast::hash(&message[..PRELUDE_LENGTH]);
    if actual_prelude != prelude_checksum {
        return Err(checksum_failure(
            ChecksumKind::Prelude,
            prelude_checksum,
            actual_prelude,
        ));
    }

    let checksum_offset = length - CHECKSUM_LENGTH;
    let message_checksum = read_u32(message, checksum_offset)?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&message[..PRELUDE_LENGTH]);
    hasher.update(&message[PRELUDE_LENGTH..checksum_offset]);
    let actual_message = hasher.finalize();
    if actual_message != message_checksum {
        return Err(checksum_failure(
            ChecksumKind::Message,
            message_checksum,
            actual_message,
        ));
    }

    let available = checksum_offset - PRELUDE_TOTAL_LENGTH;
    if headers_length > available {
        metrics::inc_errors("protocol");
        return Err(ProtocolError::HeadersOverflow {
            headers_length,
            available,
        }
        .into());
    }

    let body_start = PRELUDE_TOTAL_LENGTH + headers_length;
    metrics::inc_messages();
    Ok(EventMessage {
        headers: message.slice(PRELUDE_TOTAL_LENGTH..body_start),
        body: message.slice(body_start..checksum_offset),
    })
}

/// Build a complete event-stream message from typed headers and a body.
///
/// # Errors
///
/// Returns [`ProtocolError::HeaderTooLong`] if a header cannot be encoded and
/// [`FramingError::OversizedFrame`] if the message would not fit its 32-bit
/// length fields.
pub fn encode_message(headers: &[EventHeader], body: &[u8]) -> Result<Bytes, CodecError> {
    let mut header_block = BytesMut::new();
    encode_headers(headers, &mut header_block)?;

    let size = MINIMUM_MESSAGE_LENGTH
        .saturating_add(header_block.len())
        .saturating_add(body.len());
    let oversized = || FramingError::OversizedFrame {
        size,
        max: u32::MAX as usize,
    };
    let total_length = u32::try_from(size).map_err(|_| oversized())?;
    let headers_length = u32::try_from(header_block.len()).map_err(|_| oversized())?;

    let mut out = BytesMut::with_capacity(size);
    out.put_slice(&write_network_u32(total_length));
    out.put_slice(&write_network_u32(headers_length));
    let prelude_checksum = crc32fast::hash(&out[..PRELUDE_LENGTH]);
    out.put_slice(&write_network_u32(prelude_checksum));
    out.put_slice(&header_block);
    out.put_slice(body);
    let message_checksum = crc32fast::hash(&out);
    out.put_slice(&write_network_u32(message_checksum));
    Ok(out.freeze())
}
