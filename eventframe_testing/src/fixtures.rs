//! Wire byte builders for valid and corrupted inputs.
//!
//! Length-prefixed frames are assembled by hand rather than through the
//! crate's encoder so fixtures stay independent of it and can describe
//! inputs the encoder would refuse.

use bytes::{BufMut, Bytes, BytesMut};
use eventframe::event_stream::{EventHeader, HeaderValue, encode_message};

/// Frame `payload` with a 4-byte big-endian length prefix that counts
/// itself.
///
/// ```rust
/// use eventframe_testing::length_prefixed;
///
/// assert_eq!(length_prefixed(b"ab"), vec![0, 0, 0, 6, b'a', b'b']);
/// ```
#[must_use]
pub fn length_prefixed(payload: &[u8]) -> Vec<u8> {
    let size = u32::try_from(payload.len() + 4).expect("fixture payload fits u32");
    let mut wire = Vec::with_capacity(payload.len() + 4);
    wire.extend_from_slice(&size.to_be_bytes());
    wire.extend_from_slice(payload);
    wire
}

/// Drop the last `missing` bytes of `wire`.
#[must_use]
pub fn truncated(wire: &[u8], missing: usize) -> Vec<u8> {
    wire[..wire.len().saturating_sub(missing)].to_vec()
}

/// Build a checksummed event-stream message.
///
/// # Panics
///
/// Panics if the headers or body exceed the wire format limits.
#[must_use]
pub fn event_message(headers: &[(&str, HeaderValue)], body: &[u8]) -> Bytes {
    let headers: Vec<EventHeader> = headers
        .iter()
        .map(|(name, value)| EventHeader::new(*name, value.clone()))
        .collect();
    encode_message(&headers, body).expect("fixture message encodes")
}

/// Copy `wire` with the lowest bit of byte `index` inverted.
#[must_use]
pub fn flip_bit(wire: &[u8], index: usize) -> Bytes {
    let mut copy = wire.to_vec();
    copy[index] ^= 0x01;
    Bytes::from(copy)
}

/// Assemble a `multipart/form-data` body.
///
/// Each part is `(name, filename, body)`; file parts are tagged
/// `application/octet-stream`.
///
/// ```rust
/// use eventframe_testing::form_data_body;
///
/// let body = form_data_body("b", &[("a", None, &b"1"[..])]);
/// assert!(body.ends_with(b"--b--\r\n"));
/// ```
#[must_use]
pub fn form_data_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Bytes {
    let mut body = BytesMut::new();
    for (name, filename, content) in parts {
        body.put_slice(format!("--{boundary}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.put_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"{filename}\"\r\nContent-Type: \
                         application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.put_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.put_slice(content);
        body.put_slice(b"\r\n");
    }
    body.put_slice(format!("--{boundary}--\r\n").as_bytes());
    body.freeze()
}
