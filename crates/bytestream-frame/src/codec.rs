use bytes::{Buf, BufMut, Bytes, BytesMut};
use bytestream_endian::host_to_wire;

use crate::checksum::{calculate_sum, check_sum, convert_sum, load_word, stored_sum, WORD_SIZE};
use crate::config::Flags;
use crate::error::{FrameError, Result};

/// Size of the length field.
pub const LENGTH_SIZE: usize = 4;

/// Size of the optional checksum field.
pub const CHECKSUM_SIZE: usize = WORD_SIZE;

/// Protocol maximum frame size (the length field is a `u32`).
pub const MAX_FRAME_SIZE: usize = u32::MAX as usize;

/// Header size under `flags`: length, plus checksum when enabled.
pub fn header_size(flags: Flags) -> usize {
    if flags.contains(Flags::CHECKSUM) {
        LENGTH_SIZE + CHECKSUM_SIZE
    } else {
        LENGTH_SIZE
    }
}

/// Read a length field, converting from wire order when `endian` is set.
///
/// Returns `None` if fewer than [`LENGTH_SIZE`] bytes are available.
pub fn read_length(src: &[u8], endian: bool) -> Option<u32> {
    let word: [u8; LENGTH_SIZE] = src.get(..LENGTH_SIZE)?.try_into().ok()?;
    Some(load_word(word, endian))
}

/// Append one frame for a payload whose length already fits a `u32`.
///
/// Returns the frame's wire size.
pub(crate) fn put_frame(length: u32, payload: &[u8], flags: Flags, dst: &mut BytesMut) -> usize {
    let endian = flags.contains(Flags::ENDIAN);
    let checksum = flags.contains(Flags::CHECKSUM);
    let size = header_size(flags) + payload.len();

    dst.reserve(size);
    dst.put_u32_ne(if endian { host_to_wire(length) } else { length });
    if checksum {
        let sum = calculate_sum(payload, endian);
        dst.put_u32_ne(convert_sum(sum, endian));
    }
    dst.put_slice(payload);
    size
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬──────────────────┐
/// │ Length (4B)  │ Checksum (4B)│ Payload          │
/// │              │ (optional)   │ (Length bytes)   │
/// └──────────────┴──────────────┴──────────────────┘
/// ```
///
/// Both fields are big-endian when [`Flags::ENDIAN`] is set and host order
/// otherwise. Returns the number of bytes appended.
pub fn encode_frame(payload: &[u8], flags: Flags, dst: &mut BytesMut) -> Result<usize> {
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_FRAME_SIZE,
    })?;
    Ok(put_frame(length, payload, flags, dst))
}

/// Decode one frame from the front of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. On error the
/// buffer is left untouched.
pub fn decode_frame(src: &mut BytesMut, flags: Flags, max_payload: usize) -> Result<Option<Bytes>> {
    let endian = flags.contains(Flags::ENDIAN);
    let Some(length) = read_length(src, endian) else {
        return Ok(None); // Need more data
    };

    let length = length as usize;
    if length > max_payload {
        return Err(FrameError::FrameTooLarge {
            size: length,
            max: max_payload,
        });
    }

    let header = header_size(flags);
    if src.len() < header + length {
        return Ok(None); // Need more data
    }

    if flags.contains(Flags::CHECKSUM) {
        let field = &src[LENGTH_SIZE..header];
        let computed = calculate_sum(&src[header..header + length], endian);
        if !check_sum(field, computed, endian) {
            return Err(FrameError::ChecksumMismatch {
                computed,
                stored: stored_sum(field, endian).unwrap_or_default(),
            });
        }
    }

    src.advance(header);
    Ok(Some(src.split_to(length).freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = b"hello, bytestream!";

        for flags in [Flags::empty(), Flags::ENDIAN, Flags::CHECKSUM, Flags::all()] {
            let size = encode_frame(payload, flags, &mut buf).unwrap();
            assert_eq!(size, header_size(flags) + payload.len());
            assert_eq!(buf.len(), size);

            let decoded = decode_frame(&mut buf, flags, usize::MAX).unwrap().unwrap();
            assert_eq!(decoded.as_ref(), payload);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_endian_header_layout() {
        let mut buf = BytesMut::new();
        encode_frame(&[0, 0, 0, 1], Flags::all(), &mut buf).unwrap();
        assert_eq!(
            buf.as_ref(),
            &[0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xFE, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_host_order_header_layout() {
        let mut buf = BytesMut::new();
        encode_frame(b"abc", Flags::empty(), &mut buf).unwrap();
        assert_eq!(&buf[..LENGTH_SIZE], &3u32.to_ne_bytes());
        assert_eq!(&buf[LENGTH_SIZE..], b"abc");
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00][..]);
        let result = decode_frame(&mut buf, Flags::ENDIAN, usize::MAX).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"hello", Flags::all(), &mut buf).unwrap();
        buf.truncate(header_size(Flags::all()) + 2);

        let result = decode_frame(&mut buf, Flags::all(), usize::MAX).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_frame_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32(1024 * 1024 * 32);

        let result = decode_frame(&mut buf, Flags::ENDIAN, 1024);
        assert!(matches!(
            result,
            Err(FrameError::FrameTooLarge { size: 33_554_432, max: 1024 })
        ));
    }

    #[test]
    fn test_decode_checksum_mismatch_leaves_buffer() {
        let mut buf = BytesMut::new();
        encode_frame(b"payload", Flags::all(), &mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] ^= 0x01;
        let before = buf.clone();

        let result = decode_frame(&mut buf, Flags::all(), usize::MAX);
        assert!(matches!(result, Err(FrameError::ChecksumMismatch { .. })));
        assert_eq!(buf, before);
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(b"first", Flags::CHECKSUM, &mut buf).unwrap();
        encode_frame(b"second", Flags::CHECKSUM, &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, Flags::CHECKSUM, usize::MAX).unwrap().unwrap();
        assert_eq!(f1.as_ref(), b"first");

        let f2 = decode_frame(&mut buf, Flags::CHECKSUM, usize::MAX).unwrap().unwrap();
        assert_eq!(f2.as_ref(), b"second");

        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = BytesMut::new();
        let size = encode_frame(b"", Flags::all(), &mut buf).unwrap();
        assert_eq!(size, LENGTH_SIZE + CHECKSUM_SIZE);

        let payload = decode_frame(&mut buf, Flags::all(), 0).unwrap().unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_read_length() {
        assert_eq!(read_length(&[0, 0, 1, 0, 9], true), Some(256));
        assert_eq!(read_length(&[0, 0, 1], true), None);
    }
}
