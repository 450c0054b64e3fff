//! Typed event-stream headers.
//!
//! Each header is `name_len: u8`, `name`, `type: u8`, then a value whose
//! layout depends on the type tag.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    byte_order::{read_network_signed, read_network_u16, write_network_signed, write_network_u16},
    codec::ProtocolError,
};

const TYPE_BOOL_TRUE: u8 = 0;
const TYPE_BOOL_FALSE: u8 = 1;
const TYPE_BYTE: u8 = 2;
const TYPE_SHORT: u8 = 3;
const TYPE_INTEGER: u8 = 4;
const TYPE_LONG: u8 = 5;
const TYPE_BYTE_ARRAY: u8 = 6;
const TYPE_STRING: u8 = 7;
const TYPE_TIMESTAMP: u8 = 8;
const TYPE_UUID: u8 = 9;

const MAX_NAME_LENGTH: usize = u8::MAX as usize;
const MAX_VALUE_LENGTH: usize = u16::MAX as usize;
const UUID_LENGTH: usize = 16;

/// Value carried by an event-stream header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    /// Boolean, encoded in the type tag itself.
    Bool(bool),
    /// Signed 8-bit integer.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Integer(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// Opaque bytes, at most 65535.
    ByteArray(Bytes),
    /// UTF-8 string, at most 65535 bytes.
    String(String),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// Raw 16-byte UUID.
    Uuid([u8; UUID_LENGTH]),
}

impl HeaderValue {
    /// Borrow the value as a string if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::ByteArray(v) => write!(f, "<{} bytes>", v.len()),
            Self::String(v) => f.write_str(v),
            Self::Uuid(v) => v.iter().try_for_each(|b| write!(f, "{b:02x}")),
        }
    }
}

/// A named header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventHeader {
    name: String,
    value: HeaderValue,
}

impl EventHeader {
    /// Construct a header.
    pub fn new(name: impl Into<String>, value: HeaderValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Header name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Header value.
    #[must_use]
    pub fn value(&self) -> &HeaderValue { &self.value }
}

struct HeaderReader<'a> {
    block: &'a Bytes,
    offset: usize,
}

impl<'a> HeaderReader<'a> {
    fn remaining(&self) -> usize { self.block.len() - self.offset }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        let block: &'a Bytes = self.block;
        let end = self.offset.checked_add(n);
        let slice = end
            .and_then(|end| block.get(self.offset..end))
            .ok_or(ProtocolError::TruncatedHeader {
                offset: self.offset,
            })?;
        self.offset += n;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, ProtocolError> { Ok(self.take(1)?[0]) }

    fn take_u16(&mut self) -> Result<usize, ProtocolError> {
        let bytes = self.take(2)?;
        Ok(usize::from(read_network_u16([bytes[0], bytes[1]])))
    }

    fn take_signed(&mut self, width: usize) -> Result<i64, ProtocolError> {
        let offset = self.offset;
        read_network_signed(self.take(width)?).ok_or(ProtocolError::TruncatedHeader { offset })
    }

    fn take_string(&mut self, len: usize, field: &str) -> Result<String, ProtocolError> {
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidUtf8 {
            field: field.to_owned(),
        })
    }
}

/// Decode a header block.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when a header is truncated, carries an
/// unknown type tag, or holds invalid UTF-8.
pub fn decode_headers(block: &Bytes) -> Result<Vec<EventHeader>, ProtocolError> {
    let mut reader = HeaderReader { block, offset: 0 };
    let mut headers = Vec::new();

    while reader.remaining() > 0 {
        let name_len = usize::from(reader.take_u8()?);
        let name = reader.take_string(name_len, "header name")?;
        let tag = reader.take_u8()?;
        let value = match tag {
            TYPE_BOOL_TRUE => HeaderValue::Bool(true),
            TYPE_BOOL_FALSE => HeaderValue::Bool(false),
            TYPE_BYTE => HeaderValue::Byte(narrow(reader.take_signed(1)?)),
            TYPE_SHORT => HeaderValue::Short(narrow(reader.take_signed(2)?)),
            TYPE_INTEGER => HeaderValue::Integer(narrow(reader.take_signed(4)?)),
            TYPE_LONG => HeaderValue::Long(reader.take_signed(8)?),
            TYPE_BYTE_ARRAY => {
                let len = reader.take_u16()?;
                let start = reader.offset;
                reader.take(len)?;
                HeaderValue::ByteArray(block.slice(start..start + len))
            }
            TYPE_STRING => {
                let len = reader.take_u16()?;
                HeaderValue::String(reader.take_string(len, &name)?)
            }
            TYPE_TIMESTAMP => HeaderValue::Timestamp(reader.take_signed(8)?),
            TYPE_UUID => {
                let mut uuid = [0_u8; UUID_LENGTH];
                uuid.copy_from_slice(reader.take(UUID_LENGTH)?);
                HeaderValue::Uuid(uuid)
            }
            other => return Err(ProtocolError::InvalidHeaderType { name, tag: other }),
        };
        headers.push(EventHeader { name, value });
    }

    Ok(headers)
}

// Values read with an exact width always fit their target type.
fn narrow<T: TryFrom<i64> + Default>(value: i64) -> T { T::try_from(value).unwrap_or_default() }

/// Append the encoding of `headers` to `dst`.
///
/// # Errors
///
/// Returns [`ProtocolError::HeaderTooLong`] if a name exceeds 255 bytes or a
/// string or byte array value exceeds 65535 bytes.
pub fn encode_headers(headers: &[EventHeader], dst: &mut BytesMut) -> Result<(), ProtocolError> {
    for header in headers {
        let name = header.name.as_bytes();
        let name_len = u8::try_from(name.len()).map_err(|_| ProtocolError::HeaderTooLong {
            name: header.name.chars().take(32).collect(),
            max: MAX_NAME_LENGTH,
        })?;
        dst.put_u8(name_len);
        dst.put_slice(name);

        match &header.value {
            HeaderValue::Bool(true) => dst.put_u8(TYPE_BOOL_TRUE),
            HeaderValue::Bool(false) => dst.put_u8(TYPE_BOOL_FALSE),
            HeaderValue::Byte(v) => put_signed(dst, TYPE_BYTE, i64::from(*v), 1),
            HeaderValue::Short(v) => put_signed(dst, TYPE_SHORT, i64::from(*v), 2),
            HeaderValue::Integer(v) => put_signed(dst, TYPE_INTEGER, i64::from(*v), 4),
            HeaderValue::Long(v) => put_signed(dst, TYPE_LONG, *v, 8),
            HeaderValue::Timestamp(v) => put_signed(dst, TYPE_TIMESTAMP, *v, 8),
            HeaderValue::ByteArray(v) => put_sized(dst, TYPE_BYTE_ARRAY, v, &header.name)?,
            HeaderValue::String(v) => put_sized(dst, TYPE_STRING, v.as_bytes(), &header.name)?,
            HeaderValue::Uuid(v) => {
                dst.put_u8(TYPE_UUID);
                dst.put_slice(v);
            }
        }
    }
    Ok(())
}

fn put_signed(dst: &mut BytesMut, tag: u8, value: i64, width: usize) {
    dst.put_u8(tag);
    dst.put_slice(&write_network_signed(value, width));
}

fn put_sized(dst: &mut BytesMut, tag: u8, value: &[u8], name: &str) -> Result<(), ProtocolError> {
    let len = u16::try_from(value.len()).map_err(|_| ProtocolError::HeaderTooLong {
        name: name.chars().take(32).collect(),
        max: MAX_VALUE_LENGTH,
    })?;
    dst.put_u8(tag);
    dst.put_slice(&write_network_u16(len));
    dst.put_slice(value);
    Ok(())
}
