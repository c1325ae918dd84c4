//! Host/wire byte-order conversion.
//!
//! This is the lowest layer of bytestream. The wire order is big-endian
//! ("network order"); every conversion here is pure and round-trips exactly.
//!
//! ```
//! use bytestream_endian::{host_to_wire, wire_to_host};
//!
//! let wire = host_to_wire(0x0102_0304u32);
//! assert_eq!(wire.to_ne_bytes(), [0x01, 0x02, 0x03, 0x04]);
//! assert_eq!(wire_to_host::<u32>(wire), 0x0102_0304);
//! ```

pub mod order;

pub use order::{host_to_wire, is_little_endian, wire_to_host, WireOrder};
