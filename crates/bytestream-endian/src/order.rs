/// A value with a fixed-width wire representation.
///
/// `to_wire` yields an unsigned integer whose in-memory bytes are the
/// big-endian encoding of `self`; `from_wire` is its exact inverse.
pub trait WireOrder: Sized {
    /// Unsigned integer of the same width carrying the wire bytes.
    type Wire: Copy;

    fn to_wire(self) -> Self::Wire;

    fn from_wire(wire: Self::Wire) -> Self;
}

/// Returns true when the host stores the least significant byte first.
#[inline]
pub const fn is_little_endian() -> bool {
    cfg!(target_endian = "little")
}

/// Convert a host value to its wire representation.
#[inline]
pub fn host_to_wire<T: WireOrder>(value: T) -> T::Wire {
    value.to_wire()
}

/// Convert a wire representation back to a host value.
#[inline]
pub fn wire_to_host<T: WireOrder>(wire: T::Wire) -> T {
    T::from_wire(wire)
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {$(
        impl WireOrder for $ty {
            type Wire = $ty;

            #[inline]
            fn to_wire(self) -> $ty {
                self.to_be()
            }

            #[inline]
            fn from_wire(wire: $ty) -> $ty {
                <$ty>::from_be(wire)
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($ty:ty => $wire:ty),*) => {$(
        impl WireOrder for $ty {
            type Wire = $wire;

            #[inline]
            fn to_wire(self) -> $wire {
                (self as $wire).to_be()
            }

            #[inline]
            fn from_wire(wire: $wire) -> $ty {
                <$wire>::from_be(wire) as $ty
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64);
impl_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64);

impl WireOrder for bool {
    type Wire = u8;

    #[inline]
    fn to_wire(self) -> u8 {
        u8::from(self)
    }

    #[inline]
    fn from_wire(wire: u8) -> bool {
        wire != 0
    }
}

impl WireOrder for f32 {
    type Wire = u32;

    #[inline]
    fn to_wire(self) -> u32 {
        self.to_bits().to_be()
    }

    #[inline]
    fn from_wire(wire: u32) -> f32 {
        f32::from_bits(u32::from_be(wire))
    }
}

impl WireOrder for f64 {
    type Wire = u64;

    #[inline]
    fn to_wire(self) -> u64 {
        self.to_bits().to_be()
    }

    #[inline]
    fn from_wire(wire: u64) -> f64 {
        f64::from_bits(u64::from_be(wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_matches_target() {
        assert_eq!(is_little_endian(), 1u16.to_ne_bytes()[0] == 1);
    }

    #[test]
    fn integers_land_big_endian_in_memory() {
        assert_eq!(host_to_wire(0xABu8).to_ne_bytes(), [0xAB]);
        assert_eq!(host_to_wire(0x0102u16).to_ne_bytes(), [0x01, 0x02]);
        assert_eq!(
            host_to_wire(0x0102_0304u32).to_ne_bytes(),
            [0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(
            host_to_wire(0x0102_0304_0506_0708u64).to_ne_bytes(),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn signed_round_trip() {
        for value in [i8::MIN, -1, 0, 1, i8::MAX] {
            assert_eq!(wire_to_host::<i8>(host_to_wire(value)), value);
        }
        for value in [i16::MIN, -2, 0, 300, i16::MAX] {
            assert_eq!(wire_to_host::<i16>(host_to_wire(value)), value);
        }
        for value in [i32::MIN, -70_000, 0, 70_000, i32::MAX] {
            assert_eq!(wire_to_host::<i32>(host_to_wire(value)), value);
        }
        for value in [i64::MIN, -1, 0, 1 << 40, i64::MAX] {
            assert_eq!(wire_to_host::<i64>(host_to_wire(value)), value);
        }
        assert_eq!(host_to_wire(-1i16).to_ne_bytes(), [0xFF, 0xFF]);
    }

    #[test]
    fn bool_round_trip() {
        assert_eq!(host_to_wire(true), 1);
        assert!(wire_to_host::<bool>(host_to_wire(true)));
        assert!(!wire_to_host::<bool>(host_to_wire(false)));
    }

    #[test]
    fn floats_are_bit_exact() {
        let nan = f32::from_bits(0x7FC0_1234);
        assert_eq!(wire_to_host::<f32>(host_to_wire(nan)).to_bits(), 0x7FC0_1234);
        assert_eq!(
            host_to_wire(1.0f32).to_ne_bytes(),
            [0x3F, 0x80, 0x00, 0x00]
        );

        for value in [0.0f64, -0.0, 1.5, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY] {
            let back = wire_to_host::<f64>(host_to_wire(value));
            assert_eq!(back.to_bits(), value.to_bits());
        }
        assert_eq!(
            host_to_wire(1.0f64).to_ne_bytes(),
            [0x3F, 0xF0, 0, 0, 0, 0, 0, 0]
        );
    }
}
