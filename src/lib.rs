#![doc(html_root_url = "https://docs.rs/eventframe/latest")]
//! Public API for the `eventframe` library.
//!
//! This crate provides building blocks for consuming framed, checksummed
//! event streams and related wire formats:
//!
//! - [`codec`]: length-prefixed frame extraction from arbitrarily chunked
//!   byte streams.
//! - [`event_stream`]: CRC32-verified event messages with typed headers.
//! - [`multipart`]: `multipart/form-data` header and body parsing.
//! - [`merge`]: bounded-concurrency merging of asynchronous sequences.

pub mod byte_order;
pub mod codec;
pub mod error;
pub mod event_stream;
pub mod merge;
pub mod metrics;
pub mod multipart;
pub mod prelude;

pub use codec::{CodecError, FrameConfig, MessageFrameDecoder, MessageFrames, decode_frames};
pub use error::{EventframeError, Result};
pub use event_stream::{EventMessage, EventStream, EventStreamDecoder, decode_events};
pub use merge::{MergeConfig, MergeEvent, MergeHandle, MergeScheduler};
pub use metrics::{ERRORS_TOTAL, FRAMES_DECODED, MERGE_ACTIVE, MESSAGES_VERIFIED};
pub use multipart::{FormPart, MediaType, parse_form_data, parse_section_headers};
