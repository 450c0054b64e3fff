//! Pull-based adapter from a stream of byte chunks to a stream of frames.

use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};

use bytes::{Buf, Bytes};
use futures::Stream;

use super::{
    CodecError,
    DefaultRecoveryPolicy,
    FrameConfig,
    MessageFrameDecoder,
    RecoveryPolicy,
    RecoveryPolicyHook,
};

/// Stream of complete frames decoded from a stream of byte chunks.
///
/// The next chunk is only pulled once the current one is exhausted, so a
/// chunk holding several frames yields them one per poll. Dropping the
/// stream abandons any partial frame; no cleanup is required.
///
/// Errors whose recovery policy is [`Drop`](RecoveryPolicy::Drop) are
/// yielded and decoding continues; any other error ends the stream. The
/// policy comes from [`CodecError::default_recovery_policy`] unless a hook is
/// installed with [`with_recovery_policy`](Self::with_recovery_policy).
pub struct MessageFrames<S> {
    chunks: S,
    current: Bytes,
    decoder: MessageFrameDecoder,
    policy: Arc<dyn RecoveryPolicyHook>,
    done: bool,
}

impl<S> MessageFrames<S> {
    /// Wrap `chunks`, decoding with the limits in `config`.
    pub fn new(chunks: S, config: FrameConfig) -> Self {
        Self {
            chunks,
            current: Bytes::new(),
            decoder: MessageFrameDecoder::new(config),
            policy: Arc::new(DefaultRecoveryPolicy),
            done: false,
        }
    }

    /// Decide per error whether decoding continues.
    #[must_use]
    pub fn with_recovery_policy(mut self, policy: Arc<dyn RecoveryPolicyHook>) -> Self {
        self.policy = policy;
        self
    }

    /// Apply the recovery policy to `err`, ending the stream if required.
    pub(crate) fn recover(&mut self, err: CodecError) -> CodecError {
        if self.policy.recovery_policy(&err) == RecoveryPolicy::Disconnect {
            self.done = true;
        }
        err
    }
}

/// Decode frames from `chunks` using the default [`FrameConfig`].
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use eventframe::codec::decode_frames;
/// use futures::{StreamExt, executor::block_on, stream};
///
/// let chunks = stream::iter([
///     Ok::<_, std::io::Error>(Bytes::from_static(&[0, 0])),
///     Ok(Bytes::from_static(&[0, 5, 42])),
/// ]);
/// let frames: Vec<_> = block_on(decode_frames(chunks).collect());
/// assert_eq!(frames.len(), 1);
/// ```
pub fn decode_frames<S>(chunks: S) -> MessageFrames<S> {
    MessageFrames::new(chunks, FrameConfig::default())
}

impl<S, E> Stream for MessageFrames<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<CodecError>,
{
    type Item = Result<Bytes, CodecError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if this.current.has_remaining() {
                match this.decoder.feed(&mut this.current) {
                    Ok(Some(frame)) => return Poll::Ready(Some(Ok(frame))),
                    Ok(None) => continue,
                    Err(err) => return Poll::Ready(Some(Err(this.recover(err)))),
                }
            }

            match ready!(Pin::new(&mut this.chunks).poll_next(cx)) {
                Some(Ok(chunk)) => this.current = chunk,
                Some(Err(err)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(err.into())));
                }
                None => {
                    this.done = true;
                    return Poll::Ready(this.decoder.finish().transpose());
                }
            }
        }
    }
}
