//! Binary message framing for byte-oriented transports.
//!
//! bytestream turns discrete messages into a length-prefixed byte stream and
//! reassembles arbitrarily fragmented input back into messages, with optional
//! one's-complement checksums and explicit control over wire byte order.
//!
//! # Crate Structure
//!
//! - [`endian`]: host/wire byte-order conversion
//! - [`frame`]: checksum engine, stream configuration, encoder and decoder,
//!   blocking I/O adapters and the `tokio_util` codec (behind `async`)

/// Re-export byte-order types.
pub mod endian {
    pub use bytestream_endian::*;
}

/// Re-export frame types.
pub mod frame {
    pub use bytestream_frame::*;
}
