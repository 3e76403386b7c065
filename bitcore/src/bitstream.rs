//! MSB-first bit cursor over an immutable byte slice.
//!
//! Grounded on `uefi_decompress::CodeIterator`'s `pop_bits`/`peek_bits`
//! pair, generalized per the spec's data model: the cursor supports
//! explicit save/restore (`position`/`seek`) and read-at-arbitrary-position
//! (`read_at`) without disturbing the live cursor, which the Huffman table
//! walk and the Arithmetic BASC re-scan both need.

use bitvec::field::BitField;
use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::view::BitView;

use crate::error::DecodeError;

/// Bits are indexed MSB-first within each byte: bit 0 is the top bit of
/// `data[0]`. `read`/`read_at` accept widths up to 32 bits.
///
/// `Copy` so callers needing a throwaway scan position (BASC table
/// rescans, Huffman's embedded sub-codec start) can take a cheap snapshot
/// instead of mutating an aliased cursor — see `read_at`.
#[derive(Clone, Copy)]
pub struct BitCursor<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { bits: data.view_bits::<Msb0>(), position: 0 }
    }

    /// Current bit offset from the start of the stream.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of bits addressable in the underlying source.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Moves the cursor to an already-computed bit position (explicit
    /// save/restore, used e.g. by LZCL to skip a sub-codec body by
    /// `bit_length`).
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Reads the next `count` bits (`count <= 32`) high-to-low and advances
    /// the cursor by `count`.
    pub fn read(&mut self, count: u32) -> Result<u32, DecodeError> {
        let (value, new_position) = self.read_at(self.position, count)?;
        self.position = new_position;
        Ok(value)
    }

    /// Reads `count` bits starting at `position` without touching `self`.
    /// Returns the value and the position just past the read, for the
    /// caller to thread through further peeks.
    pub fn read_at(&self, position: usize, count: u32) -> Result<(u32, usize), DecodeError> {
        if count == 0 {
            return Ok((0, position));
        }
        if count > 32 {
            return Err(DecodeError::InvalidHeader);
        }
        let end = position.checked_add(count as usize).ok_or(DecodeError::CorruptStream)?;
        let slice = self.bits.get(position..end).ok_or(DecodeError::CorruptStream)?;
        Ok((slice.load_be::<u32>(), end))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_msb_first() {
        let data = [0xA5u8];
        let mut cursor = BitCursor::new(&data);
        assert_eq!(cursor.read(8).unwrap(), 0xA5);
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn read_at_does_not_disturb_the_live_cursor() {
        let data = [0b1010_0000u8];
        let mut cursor = BitCursor::new(&data);
        let (peeked, new_pos) = cursor.read_at(0, 4).unwrap();
        assert_eq!(peeked, 0b1010);
        assert_eq!(new_pos, 4);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read(4).unwrap(), 0b1010);
    }

    #[test]
    fn out_of_bounds_read_is_corrupt_stream() {
        let data = [0xFFu8];
        let mut cursor = BitCursor::new(&data);
        assert!(matches!(cursor.read(16), Err(DecodeError::CorruptStream)));
    }

    #[test]
    fn zero_width_read_never_fails() {
        let data: [u8; 0] = [];
        let cursor = BitCursor::new(&data);
        assert_eq!(cursor.read_at(0, 0).unwrap(), (0, 0));
    }
}
