//! Incremental decoder and encoder for self-inclusive length-prefixed frames.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{CodecError, EofError, FrameConfig, FramingError, LENGTH_HEADER_SIZE};
use crate::{
    byte_order::{read_network_u32, write_network_u32},
    metrics,
};

/// Stateful decoder turning arbitrarily chunked bytes into complete frames.
///
/// The decoder keeps its progress between calls: a partially received size
/// header, the frame buffer being filled, and the number of bytes received so
/// far. Input may split a frame (or its size header) at any byte.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use eventframe::codec::{FrameConfig, MessageFrameDecoder};
///
/// let mut decoder = MessageFrameDecoder::new(FrameConfig::default());
/// let mut first = Bytes::from_static(&[0, 0, 0]);
/// let mut second = Bytes::from_static(&[6, 0xAA, 0xBB]);
///
/// assert!(decoder.feed(&mut first).expect("valid input").is_none());
/// let frame = decoder
///     .feed(&mut second)
///     .expect("valid input")
///     .expect("frame complete");
/// assert_eq!(frame.as_ref(), &[0, 0, 0, 6, 0xAA, 0xBB]);
/// ```
#[derive(Debug)]
pub struct MessageFrameDecoder {
    max_frame_length: usize,
    size_header: [u8; LENGTH_HEADER_SIZE],
    size_header_len: usize,
    message_buffer: Option<BytesMut>,
    message_size: usize,
    bytes_received: usize,
    discarding: usize,
}

impl MessageFrameDecoder {
    /// Create a decoder enforcing the limits in `config`.
    #[must_use]
    pub fn new(config: FrameConfig) -> Self {
        Self {
            max_frame_length: config.max_frame_length(),
            size_header: [0; LENGTH_HEADER_SIZE],
            size_header_len: 0,
            message_buffer: None,
            message_size: 0,
            bytes_received: 0,
            discarding: 0,
        }
    }

    /// Returns true when no frame (or frame header) is partially received.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.message_buffer.is_none() && self.size_header_len == 0 && self.discarding == 0
    }

    /// Consume bytes from `chunk` until a frame completes or the chunk is
    /// exhausted.
    ///
    /// Bytes after a completed frame stay in `chunk`; call again to continue.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::InvalidLengthEncoding`] when a size header is
    /// smaller than the header itself and [`FramingError::OversizedFrame`]
    /// when it exceeds the configured maximum. After an oversized frame the
    /// decoder skips the declared bytes, so the stream can resume at the
    /// next frame.
    pub fn feed<B: Buf>(&mut self, chunk: &mut B) -> Result<Option<Bytes>, CodecError> {
        while chunk.has_remaining() {
            if self.discarding > 0 {
                let skip = self.discarding.min(chunk.remaining());
                chunk.advance(skip);
                self.discarding -= skip;
                continue;
            }

            if self.message_buffer.is_none() {
                let want = LENGTH_HEADER_SIZE - self.size_header_len;
                let take = want.min(chunk.remaining());
                let start = self.size_header_len;
                chunk.copy_to_slice(&mut self.size_header[start..start + take]);
                self.size_header_len += take;
                if self.size_header_len < LENGTH_HEADER_SIZE {
                    return Ok(None);
                }
                self.allocate()?;
            }

            self.fill_from(chunk);
            if self.bytes_received == self.message_size {
                return Ok(self.take_frame());
            }
        }
        Ok(None)
    }

    /// Signal end of input.
    ///
    /// Returns `Ok(None)` when no frame is in progress, or the in-progress
    /// frame if it happens to be complete.
    ///
    /// # Errors
    ///
    /// Returns [`EofError::TruncatedHeader`] or [`EofError::Truncated`] when
    /// input ended part-way through a frame.
    pub fn finish(&mut self) -> Result<Option<Bytes>, CodecError> {
        if self.message_buffer.is_none() {
            if self.size_header_len == 0 {
                return Ok(None);
            }
            let bytes_received = self.size_header_len;
            self.reset();
            metrics::inc_errors("eof");
            return Err(EofError::TruncatedHeader {
                bytes_received,
                header_size: LENGTH_HEADER_SIZE,
            }
            .into());
        }

        if self.bytes_received == self.message_size {
            return Ok(self.take_frame());
        }

        let err = EofError::Truncated {
            bytes_received: self.bytes_received,
            expected: self.message_size,
        };
        tracing::warn!(
            bytes_received = self.bytes_received,
            expected = self.message_size,
            "input ended mid-frame"
        );
        self.reset();
        metrics::inc_errors("eof");
        Err(err.into())
    }

    fn allocate(&mut self) -> Result<(), CodecError> {
        let size = read_network_u32(self.size_header) as usize;
        self.size_header_len = 0;

        if size < LENGTH_HEADER_SIZE {
            metrics::inc_errors("framing");
            return Err(FramingError::InvalidLengthEncoding {
                size,
                header_size: LENGTH_HEADER_SIZE,
            }
            .into());
        }
        if size > self.max_frame_length {
            tracing::warn!(
                size,
                max = self.max_frame_length,
                "dropping oversized frame"
            );
            self.discarding = size - LENGTH_HEADER_SIZE;
            metrics::inc_errors("framing");
            return Err(FramingError::OversizedFrame {
                size,
                max: self.max_frame_length,
            }
            .into());
        }

        let mut buffer = BytesMut::with_capacity(size);
        buffer.put_slice(&self.size_header);
        self.message_buffer = Some(buffer);
        self.message_size = size;
        self.bytes_received = LENGTH_HEADER_SIZE;
        tracing::trace!(size, "frame allocated");
        Ok(())
    }

    fn fill_from<B: Buf>(&mut self, chunk: &mut B) {
        let Some(buffer) = self.message_buffer.as_mut() else {
            return;
        };
        let mut wanted = self.message_size - self.bytes_received;
        while wanted > 0 && chunk.has_remaining() {
            let available = chunk.chunk();
            let n = available.len().min(wanted);
            buffer.extend_from_slice(&available[..n]);
            chunk.advance(n);
            wanted -= n;
            self.bytes_received += n;
        }
    }

    fn take_frame(&mut self) -> Option<Bytes> {
        let frame = self.message_buffer.take().map(BytesMut::freeze);
        self.reset();
        if frame.is_some() {
            metrics::inc_frames();
        }
        frame
    }

    fn reset(&mut self) {
        self.message_buffer = None;
        self.message_size = 0;
        self.bytes_received = 0;
        self.size_header_len = 0;
    }
}

impl Default for MessageFrameDecoder {
    fn default() -> Self { Self::new(FrameConfig::default()) }
}

impl Decoder for MessageFrameDecoder {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.feed(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.feed(src)? {
            return Ok(Some(frame));
        }
        self.finish()
    }
}

/// Encoder writing payloads as self-inclusive length-prefixed frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageFrameEncoder {
    config: FrameConfig,
}

impl MessageFrameEncoder {
    /// Create an encoder enforcing the limits in `config`.
    #[must_use]
    pub fn new(config: FrameConfig) -> Self { Self { config } }
}

impl Encoder<Bytes> for MessageFrameEncoder {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let size = item.len().saturating_add(LENGTH_HEADER_SIZE);
        if size > self.config.max_frame_length() {
            return Err(FramingError::OversizedFrame {
                size,
                max: self.config.max_frame_length(),
            }
            .into());
        }
        put_frame(&item, size, dst)
    }
}

/// Encode `payload` as a single frame without applying a size limit beyond
/// what the 32-bit size header can express.
///
/// # Errors
///
/// Returns [`FramingError::OversizedFrame`] if the frame would not fit a
/// `u32` size header.
///
/// # Examples
///
/// ```
/// use eventframe::codec::encode_frame;
///
/// let frame = encode_frame(b"hi").expect("small payload");
/// assert_eq!(frame.as_ref(), &[0, 0, 0, 6, b'h', b'i']);
/// ```
pub fn encode_frame(payload: &[u8]) -> Result<Bytes, CodecError> {
    let size = payload.len().saturating_add(LENGTH_HEADER_SIZE);
    let mut dst = BytesMut::with_capacity(size);
    put_frame(payload, size, &mut dst)?;
    Ok(dst.freeze())
}

fn put_frame(payload: &[u8], size: usize, dst: &mut BytesMut) -> Result<(), CodecError> {
    let declared = u32::try_from(size).map_err(|_| FramingError::OversizedFrame {
        size,
        max: u32::MAX as usize,
    })?;
    dst.reserve(size);
    dst.put_slice(&write_network_u32(declared));
    dst.put_slice(payload);
    Ok(())
}
