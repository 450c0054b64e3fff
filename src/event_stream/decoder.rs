//! Event-stream decoding over chunked input.
//!
//! Both adapters run the frame decoder first and verify each complete frame
//! with [`parse_message`].

use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio_util::codec::Decoder;

use super::message::{EventMessage, parse_message};
use crate::codec::{CodecError, FrameConfig, MessageFrameDecoder, MessageFrames, RecoveryPolicyHook};

/// `tokio_util` decoder yielding verified event-stream messages.
///
/// Use with [`FramedRead`](tokio_util::codec::FramedRead) over any
/// `AsyncRead`.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    frames: MessageFrameDecoder,
}

impl EventStreamDecoder {
    /// Create a decoder enforcing the frame limits in `config`.
    #[must_use]
    pub fn new(config: FrameConfig) -> Self {
        Self {
            frames: MessageFrameDecoder::new(config),
        }
    }
}

impl Decoder for EventStreamDecoder {
    type Item = EventMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.frames
            .decode(src)?
            .map(|frame| parse_message(&frame))
            .transpose()
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.frames
            .decode_eof(src)?
            .map(|frame| parse_message(&frame))
            .transpose()
    }
}

/// Stream of verified messages decoded from a stream of byte chunks.
///
/// A message failing verification is yielded as an error and decoding
/// continues with the next frame; truncation ends the stream. Both framing
/// and verification errors go through the same recovery policy.
pub struct EventStream<S> {
    frames: MessageFrames<S>,
}

impl<S> EventStream<S> {
    /// Wrap `chunks`, decoding with the frame limits in `config`.
    pub fn new(chunks: S, config: FrameConfig) -> Self {
        Self {
            frames: MessageFrames::new(chunks, config),
        }
    }

    /// Decide per error whether decoding continues.
    #[must_use]
    pub fn with_recovery_policy(self, policy: Arc<dyn RecoveryPolicyHook>) -> Self {
        Self {
            frames: self.frames.with_recovery_policy(policy),
        }
    }
}

/// Decode event-stream messages from `chunks` with default limits.
pub fn decode_events<S>(chunks: S) -> EventStream<S> { EventStream::new(chunks, FrameConfig::default()) }

impl<S, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<CodecError>,
{
    type Item = Result<EventMessage, CodecError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let item = ready!(Pin::new(&mut this.frames).poll_next(cx));
        Poll::Ready(item.map(|frame| {
            frame.and_then(|frame| parse_message(&frame).map_err(|err| this.frames.recover(err)))
        }))
    }
}
