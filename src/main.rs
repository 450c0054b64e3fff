//! `eventframe` command line tool.
//!
//! Decodes files of length-prefixed frames, event-stream messages or
//! `multipart/form-data` bodies and prints a summary of their contents.

mod cli;

use std::path::Path;

use bytes::Bytes;
use clap::Parser;
use eventframe::{
    CodecError,
    FrameConfig,
    MessageFrames,
    Result,
    event_stream::{EventStream, HeaderValue},
    multipart::parse_form_data,
};
use futures::StreamExt;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Command::Frames {
            file,
            max_frame_length,
        } => {
            let config = max_frame_length.map_or_else(FrameConfig::default, FrameConfig::new);
            print_frames(&file, config).await
        }
        cli::Command::Events { file } => print_events(&file).await,
        cli::Command::FormData { file, boundary } => print_form_data(&file, &boundary).await,
    }
}

async fn open_chunks(path: &Path) -> Result<ReaderStream<File>> {
    Ok(ReaderStream::new(File::open(path).await?))
}

async fn print_frames(path: &Path, config: FrameConfig) -> Result<()> {
    let mut frames = MessageFrames::new(open_chunks(path).await?, config);
    let mut index = 0usize;
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(frame) => {
                println!("frame {index}: {} bytes", frame.len());
                index += 1;
            }
            Err(error) if error.should_disconnect() => return Err(error.into()),
            Err(error) => tracing::warn!(%error, "frame skipped"),
        }
    }
    println!("{index} frames");
    Ok(())
}

async fn print_events(path: &Path) -> Result<()> {
    let mut messages = EventStream::new(open_chunks(path).await?, FrameConfig::default());
    let mut index = 0usize;
    while let Some(message) = messages.next().await {
        let message = match message {
            Ok(message) => message,
            Err(error) if error.should_disconnect() => return Err(error.into()),
            Err(error) => {
                tracing::warn!(%error, "message rejected");
                continue;
            }
        };
        println!("message {index}: {} body bytes", message.body().len());
        for header in message.decode_headers().map_err(CodecError::from)? {
            match header.value() {
                HeaderValue::ByteArray(bytes) => {
                    println!("  {}: <{} bytes>", header.name(), bytes.len());
                }
                value => println!("  {}: {value}", header.name()),
            }
        }
        index += 1;
    }
    println!("{index} messages");
    Ok(())
}

async fn print_form_data(path: &Path, boundary: &str) -> Result<()> {
    let body = Bytes::from(tokio::fs::read(path).await?);
    for part in parse_form_data(&body, boundary)? {
        let content_type = part
            .headers
            .content_type
            .as_ref()
            .map_or_else(|| "-".to_owned(), ToString::to_string);
        println!(
            "{}: filename={} content-type={} {} bytes",
            part.headers.name,
            part.headers.filename.as_deref().unwrap_or("-"),
            content_type,
            part.body.len()
        );
    }
    Ok(())
}
