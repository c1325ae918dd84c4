//! 32-bit one's-complement checksum (Internet-checksum family, widened to
//! 32-bit words).
//!
//! The checksum detects accidental corruption only; it is not
//! collision-resistant and offers no protection against tampering.
//!
//! Words are always loaded through a byte copy into a `[u8; 4]`, so the
//! result does not depend on the alignment of the input slice.

use bytestream_endian::{host_to_wire, wire_to_host};

/// Size of one summed word and of the stored checksum field.
pub const WORD_SIZE: usize = 4;

/// Load a word from its in-memory bytes, converting from wire order when
/// `endian` is set.
#[inline]
pub(crate) fn load_word(word: [u8; WORD_SIZE], endian: bool) -> u32 {
    let raw = u32::from_ne_bytes(word);
    if endian {
        wire_to_host(raw)
    } else {
        raw
    }
}

/// Sum `data` as 4-byte words with end-around carry.
///
/// A trailing partial word is zero-padded in its high-address bytes. With
/// `endian` unset the words are read in host order, so hosts of different
/// endianness produce different sums for the same bytes.
pub fn calculate_sum(data: &[u8], endian: bool) -> u32 {
    let mut sum = 0u64;

    let mut words = data.chunks_exact(WORD_SIZE);
    for chunk in &mut words {
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(chunk);
        sum += u64::from(load_word(word, endian));
    }

    let tail = words.remainder();
    if !tail.is_empty() {
        let mut word = [0u8; WORD_SIZE];
        word[..tail.len()].copy_from_slice(tail);
        sum += u64::from(load_word(word, endian));
    }

    fold(sum)
}

/// Fold carries above bit 31 back into the low word until it fits.
fn fold(mut sum: u64) -> u32 {
    while sum > u64::from(u32::MAX) {
        sum = (sum & u64::from(u32::MAX)) + (sum >> 32);
    }
    sum as u32
}

/// Complement `sum` for storage, converting to wire order when `endian` is set.
///
/// The result is written to the wire with its in-memory (native) layout.
pub fn convert_sum(sum: u32, endian: bool) -> u32 {
    let sum = !sum;
    if endian {
        host_to_wire(sum)
    } else {
        sum
    }
}

/// Check a stored checksum field against the sum computed over the payload.
///
/// Holds iff `expected + stored == 0xFFFF_FFFF`. A field shorter than
/// [`WORD_SIZE`] never matches.
pub fn check_sum(stored: &[u8], expected: u32, endian: bool) -> bool {
    match stored_sum(stored, endian) {
        Some(stored) => expected.wrapping_add(stored) == u32::MAX,
        None => false,
    }
}

/// Read a stored checksum field back into host order.
pub fn stored_sum(stored: &[u8], endian: bool) -> Option<u32> {
    let word: [u8; WORD_SIZE] = stored.get(..WORD_SIZE)?.try_into().ok()?;
    Some(load_word(word, endian))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(data: &[u8], endian: bool) -> [u8; WORD_SIZE] {
        convert_sum(calculate_sum(data, endian), endian).to_ne_bytes()
    }

    #[test]
    fn empty_input_sums_to_zero() {
        assert_eq!(calculate_sum(&[], true), 0);
        assert_eq!(calculate_sum(&[], false), 0);
    }

    #[test]
    fn endian_sum_reads_big_endian_words() {
        let data = [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(calculate_sum(&data, true), 3);
    }

    #[test]
    fn partial_word_is_zero_padded() {
        assert_eq!(calculate_sum(&[0xAB], true), 0xAB00_0000);
        assert_eq!(calculate_sum(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06], true), 0x0608_0304);
    }

    #[test]
    fn carries_fold_back_into_low_word() {
        let data = [0xFF; 8];
        // 0xFFFFFFFF + 0xFFFFFFFF = 0x1_FFFF_FFFE -> 0xFFFF_FFFF
        assert_eq!(calculate_sum(&data, true), 0xFFFF_FFFF);

        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(calculate_sum(&data, true), 0x0000_0002);
    }

    #[test]
    fn host_order_sum_depends_on_host() {
        let data = [0x00, 0x00, 0x00, 0x01];
        let expected = u32::from_ne_bytes(data);
        assert_eq!(calculate_sum(&data, false), expected);
    }

    #[test]
    fn stored_sum_validates_in_both_modes() {
        let payload = b"one's complement checksum";
        for endian in [false, true] {
            let field = stored(payload, endian);
            let sum = calculate_sum(payload, endian);
            assert!(check_sum(&field, sum, endian));
            assert!(!check_sum(&field, sum.wrapping_add(1), endian));
        }
    }

    #[test]
    fn endian_field_is_big_endian_on_the_wire() {
        let payload = [0x00, 0x00, 0x00, 0x01];
        assert_eq!(stored(&payload, true), [0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn short_field_never_matches() {
        assert!(!check_sum(&[0xFF, 0xFF], 0, true));
        assert_eq!(stored_sum(&[0x01, 0x02, 0x03], false), None);
    }

    #[test]
    fn alignment_does_not_change_the_sum() {
        let mut backing = vec![0u8; 64];
        for (i, byte) in backing.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        let aligned = backing[8..49].to_vec();

        for shift in 1..WORD_SIZE {
            let mut shifted = vec![0u8; shift];
            shifted.extend_from_slice(&aligned);
            let view = &shifted[shift..];
            assert_eq!(calculate_sum(view, true), calculate_sum(&aligned, true));
            assert_eq!(calculate_sum(view, false), calculate_sum(&aligned, false));
        }
    }

    #[test]
    fn stored_field_checks_at_unaligned_offset() {
        let payload: Vec<u8> = (0u8..41).collect();
        let mut buf = vec![0u8; 1];
        buf.extend_from_slice(&stored(&payload, true));
        buf.extend_from_slice(&payload);

        let sum = calculate_sum(&buf[1 + WORD_SIZE..], true);
        assert!(check_sum(&buf[1..], sum, true));
    }
}
