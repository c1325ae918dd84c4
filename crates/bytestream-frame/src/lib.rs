//! Length-prefixed message framing with optional checksums.
//!
//! This is the core of bytestream. Every message is framed with:
//! - A 4-byte payload length
//! - An optional 4-byte one's-complement checksum of the payload
//!
//! Both fields are big-endian when [`Flags::ENDIAN`] is set and host order
//! otherwise. [`Encoder`] turns messages into wire bytes on demand,
//! [`Decoder`] reassembles messages from arbitrarily fragmented input, and
//! both are bounded by a shared [`StreamConfig`].

pub mod checksum;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reader;
#[cfg(feature = "async")]
pub mod stream_codec;
pub mod writer;

pub use checksum::{calculate_sum, check_sum, convert_sum};
pub use codec::{
    decode_frame, encode_frame, header_size, CHECKSUM_SIZE, LENGTH_SIZE, MAX_FRAME_SIZE,
};
pub use config::{effective_max_payload, Flags, Snapshot, StreamConfig, StreamSettings};
pub use decoder::{Decoder, DecoderState};
pub use encoder::{Encoder, MessageQueue};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
#[cfg(feature = "async")]
pub use stream_codec::StreamCodec;
pub use writer::FrameWriter;
