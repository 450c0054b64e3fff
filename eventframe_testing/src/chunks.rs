//! Helpers for feeding byte sequences to decoders in arbitrary pieces.

use std::io;

use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncWriteExt, duplex};
use tokio_util::codec::{Decoder, FramedRead};

/// Split `bytes` at each offset in `points`.
///
/// Offsets must be ascending and within bounds; empty pieces are kept so a
/// decoder also sees zero-length chunks.
#[must_use]
pub fn split_at(bytes: &[u8], points: &[usize]) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for &point in points {
        chunks.push(Bytes::copy_from_slice(&bytes[start..point]));
        start = point;
    }
    chunks.push(Bytes::copy_from_slice(&bytes[start..]));
    chunks
}

/// Split `bytes` into pieces of at most `size` bytes.
///
/// # Panics
///
/// Panics if `size` is zero.
#[must_use]
pub fn fixed_chunks(bytes: &[u8], size: usize) -> Vec<Bytes> {
    bytes.chunks(size).map(Bytes::copy_from_slice).collect()
}

/// One chunk per byte.
#[must_use]
pub fn byte_by_byte(bytes: &[u8]) -> Vec<Bytes> { fixed_chunks(bytes, 1) }

/// Wrap `chunks` as an infallible chunk stream.
pub fn chunk_stream(chunks: Vec<Bytes>) -> impl Stream<Item = io::Result<Bytes>> + Unpin {
    stream::iter(chunks.into_iter().map(Ok))
}

/// Write `chunks` into an in-memory duplex pipe one by one and decode the
/// other end with `decoder` through [`FramedRead`].
///
/// Collection stops after the first error, as [`FramedRead`] does.
pub async fn decode_with_chunks<D>(decoder: D, chunks: Vec<Bytes>) -> Vec<Result<D::Item, D::Error>>
where
    D: Decoder + Send + 'static,
    D::Item: Send,
    D::Error: Send,
{
    let (mut client, server) = duplex(64);
    let writer = tokio::spawn(async move {
        for chunk in chunks {
            if client.write_all(&chunk).await.is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
    });

    let mut framed = FramedRead::new(server, decoder);
    let mut results = Vec::new();
    while let Some(item) = framed.next().await {
        let failed = item.is_err();
        results.push(item);
        if failed {
            break;
        }
    }
    drop(framed);
    let _ = writer.await;
    results
}
