//! Optional convenience imports for common `eventframe` workflows.
//!
//! This module is intentionally small and focused on high-frequency types.
//! Prefer importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use eventframe::prelude::*;
//!
//! fn first_message(frame: &Bytes) -> Result<EventMessage> { Ok(parse_message(frame)?) }
//! ```

pub use crate::{
    codec::{CodecError, FrameConfig, MessageFrameDecoder, decode_frames},
    error::{EventframeError, Result},
    event_stream::{EventHeader, EventMessage, HeaderValue, decode_events, parse_message},
    merge::{Destination, MergeConfig, MergeEvent, MergeHandle, MergeScheduler},
    multipart::{FormPart, MediaType, parse_form_data},
};
