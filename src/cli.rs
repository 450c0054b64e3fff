//! Command line interface for the `eventframe` binary.
//!
//! Kept free of crate dependencies so the build script can include it to
//! generate the manual page.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line arguments for the `eventframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "eventframe",
    version,
    about = "Inspect length-prefixed frames, event-stream messages and form-data bodies"
)]
pub struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands understood by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a file of 4-byte big-endian length-prefixed frames.
    Frames {
        /// Input file.
        file: PathBuf,
        /// Largest frame accepted, in bytes; clamped to the supported range.
        #[arg(long)]
        max_frame_length: Option<usize>,
    },
    /// Decode and verify event-stream messages.
    Events {
        /// Input file.
        file: PathBuf,
    },
    /// Parse a `multipart/form-data` body.
    FormData {
        /// Input file.
        file: PathBuf,
        /// Boundary string separating the sections.
        #[arg(short, long)]
        boundary: String,
    },
}
