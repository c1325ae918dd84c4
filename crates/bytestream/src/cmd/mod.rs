use clap::{Args, Subcommand};
use std::path::PathBuf;

use bytestream_frame::StreamSettings;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod checksum;
pub mod decode;
pub mod demo;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame messages and write the wire bytes.
    Encode(EncodeArgs),
    /// Reassemble wire bytes and print each message.
    Decode(DecodeArgs),
    /// Compute the one's-complement checksum of a payload.
    Checksum(ChecksumArgs),
    /// Push sample sentences through an encoder/decoder pair.
    Demo(DemoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Framing flags and limits shared by `encode` and `decode`.
#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Write length and checksum fields in wire (big-endian) order.
    #[arg(long)]
    pub endian: bool,
    /// Add a checksum field to every frame.
    #[arg(long)]
    pub checksum: bool,
    /// Maximum frame size in bytes, header included (0 = protocol maximum).
    #[arg(long, default_value = "0")]
    pub max_frame_size: usize,
}

impl StreamArgs {
    pub fn settings(&self, capacity: usize) -> StreamSettings {
        StreamSettings {
            endian: self.endian,
            checksum: self.checksum,
            max_frame_size: self.max_frame_size,
            capacity,
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message to frame (repeatable).
    #[arg(long)]
    pub data: Vec<String>,
    /// Read one more message from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Write wire bytes to a file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read wire bytes from a file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Maximum completed messages held before draining (0 = unbounded).
    #[arg(long, default_value = "0")]
    pub capacity: usize,
    /// Feed input to the decoder in fragments of this many bytes.
    #[arg(long, default_value = "4096")]
    pub chunk_size: usize,
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Payload string.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Convert words from wire order before summing.
    #[arg(long)]
    pub endian: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Maximum frame size in bytes, header included.
    #[arg(long, default_value = "64")]
    pub max_frame_size: usize,
    /// Queue capacity for both sides.
    #[arg(long, default_value = "2")]
    pub capacity: usize,
    /// Bytes moved from encoder to decoder per step.
    #[arg(long, default_value = "16")]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a file, or stdin when no path is given.
pub(crate) fn read_input(path: Option<&PathBuf>) -> CliResult<Vec<u8>> {
    use std::io::Read;

    match path {
        Some(path) => std::fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        }),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| crate::exit::io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}
