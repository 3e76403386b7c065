//! Lomont1: the universal integer code used by (almost) every header field
//! in every codec, parameterized by an initial chunk size and a signed
//! per-chunk delta.

use crate::bitstream::BitCursor;
use crate::error::DecodeError;

/// Decodes one Lomont1-coded value. `chunk_size` is clamped to at least 1
/// before the first chunk is read. After every chunk, if `delta_chunk != 0`,
/// the chunk size for the *next* chunk becomes `max(1, chunk_size +
/// delta_chunk)` — this is how `deltaChunk = -1` and `-7` both reach the
/// `chunk_size = 1` clamp and stay there.
pub fn read_lomont1(cursor: &mut BitCursor, chunk_size: u32, delta_chunk: i32) -> Result<u64, DecodeError> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut chunk_size = chunk_size.max(1);

    loop {
        let continues = cursor.read(1)?;
        if chunk_size > 32 {
            return Err(DecodeError::InvalidHeader);
        }
        let chunk = cursor.read(chunk_size)? as u64;
        if shift >= 64 {
            return Err(DecodeError::CorruptStream);
        }
        value = value.checked_add(chunk << shift).ok_or(DecodeError::CorruptStream)?;
        shift += chunk_size;

        if delta_chunk != 0 {
            chunk_size = (chunk_size as i64 + delta_chunk as i64).max(1) as u32;
        }

        if continues == 0 {
            break;
        }
    }

    Ok(value)
}

/// Test-only bit writer and Lomont1 encoder, used by every codec crate's
/// test suite to build fixtures. Not a production encoder — the paired
/// compressor is an external collaborator out of scope for this crate.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use alloc::vec::Vec;

    /// Accumulates individual bits MSB-first into a byte buffer, matching
    /// `BitCursor`'s read order exactly.
    #[derive(Default)]
    pub struct BitWriter {
        bytes: Vec<u8>,
        bit_count: usize,
    }

    impl BitWriter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn write_bit(&mut self, bit: bool) {
            let byte_index = self.bit_count / 8;
            if byte_index == self.bytes.len() {
                self.bytes.push(0);
            }
            if bit {
                self.bytes[byte_index] |= 1 << (7 - (self.bit_count % 8));
            }
            self.bit_count += 1;
        }

        /// Writes the low `count` bits of `value`, high-to-low, `count <= 32`.
        pub fn write_bits(&mut self, value: u32, count: u32) {
            for i in (0..count).rev() {
                self.write_bit((value >> i) & 1 != 0);
            }
        }

        /// Encodes `value` with the Lomont1 scheme, inverse of
        /// [`super::read_lomont1`] with the same parameters.
        pub fn write_lomont1(&mut self, value: u64, chunk_size: u32, delta_chunk: i32) {
            let mut value = value;
            let mut chunk_size = chunk_size.max(1);
            loop {
                let mask = if chunk_size >= 64 { u64::MAX } else { (1u64 << chunk_size) - 1 };
                let chunk = value & mask;
                value >>= chunk_size;
                let continues = value != 0;
                self.write_bit(continues);
                self.write_bits(chunk as u32, chunk_size);
                if delta_chunk != 0 {
                    chunk_size = (chunk_size as i64 + delta_chunk as i64).max(1) as u32;
                }
                if !continues {
                    break;
                }
            }
        }

        pub fn into_bytes(self) -> Vec<u8> {
            self.bytes
        }
    }
}

#[cfg(test)]
mod test {
    use super::test_support::BitWriter;
    use super::*;
    use crate::bitstream::BitCursor;

    fn round_trip(value: u64, chunk_size: u32, delta_chunk: i32) {
        let mut writer = BitWriter::new();
        writer.write_lomont1(value, chunk_size, delta_chunk);
        let bytes = writer.into_bytes();
        let mut cursor = BitCursor::new(&bytes);
        assert_eq!(read_lomont1(&mut cursor, chunk_size, delta_chunk).unwrap(), value);
    }

    #[test]
    fn round_trips_across_the_section_6_parameter_table() {
        let params: &[(u32, i32)] = &[(6, 0), (3, 0), (2, 0), (4, -1), (8, -1), (25, -10), (14, -7), (5, 0), (10, 0)];
        let values = [0u64, 1, 2, 7, 63, 64, 1000, 1 << 20, (1u64 << 40) - 1];
        for &(chunk_size, delta_chunk) in params {
            for &value in &values {
                round_trip(value, chunk_size, delta_chunk);
            }
        }
    }

    #[test]
    fn delta_minus_one_reaches_the_chunk_size_one_clamp() {
        // chunk_size starts at 5, delta -1: sizes go 5,4,3,2,1,1,1,... never below 1.
        round_trip(1_000_000, 5, -1);
    }

    #[test]
    fn delta_minus_seven_reaches_the_chunk_size_one_clamp_quickly() {
        // chunk_size starts at 8, delta -7: sizes go 8,1,1,1,...
        round_trip(500, 8, -7);
    }

    #[test]
    fn single_chunk_value_consumes_exactly_continuation_plus_chunk_bits() {
        let mut writer = BitWriter::new();
        writer.write_lomont1(5, 6, 0);
        let bytes = writer.into_bytes();
        let mut cursor = BitCursor::new(&bytes);
        assert_eq!(read_lomont1(&mut cursor, 6, 0).unwrap(), 5);
        assert_eq!(cursor.position(), 7); // 1 continuation bit + 6 chunk bits
    }
}
