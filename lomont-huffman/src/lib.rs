//! Huffman decoder (spec §4.3): a canonical-style, length-sorted codebook
//! stored directly in the bitstream, decoded symbol-at-a-time without ever
//! materializing a decode tree in RAM — the table is re-walked from
//! `table_start_position` for every symbol, the same RAM-vs-CPU trade the
//! Arithmetic decoder's BASC table makes.
#![no_std]

use bitcore::{read_lomont1, BitCursor, DecodeError};

/// Sentinel for [`HuffmanState::bytes_remaining`] meaning "run until the
/// caller stops asking" — used when a Huffman codec is embedded as an LZCL
/// sub-codec, which has no byte-count field of its own.
pub const OPEN_ENDED: u32 = bitcore::END_TOKEN;

/// Huffman decoder state. Borrows the source bytes for its whole lifetime;
/// no heap allocation.
pub struct HuffmanState<'a> {
    cursor: BitCursor<'a>,
    table_start_position: usize,
    bytes_remaining: u32,
    bits_per_symbol: u32,
    min_len: u32,
    max_len: u32,
    bits_per_length_count: u32,
}

/// Parses the Huffman table header (`bits_per_symbol`, `bits_per_length_count`,
/// `min_len`, `max_len`) using an already-positioned cursor and skips the
/// cursor past the inline table to the start of the coded payload. Shared
/// between [`huffman_start`] and `lomont_lzcl`'s sub-codec reader, which
/// supplies its own `bytes_remaining` (forced to [`OPEN_ENDED`]).
pub fn huffman_header(mut cursor: BitCursor<'_>, bytes_remaining: u32) -> Result<HuffmanState<'_>, DecodeError> {
    let bits_per_symbol = 1 + read_lomont1(&mut cursor, 3, 0)? as u32;
    let bits_per_length_count = 1 + read_lomont1(&mut cursor, 3, 0)? as u32;
    let min_len = 1 + read_lomont1(&mut cursor, 2, 0)? as u32;
    let delta_len = 1 + read_lomont1(&mut cursor, 4, -1)? as u32;
    let max_len = min_len.checked_add(delta_len).ok_or(DecodeError::InvalidHeader)?;
    if min_len == 0 || max_len < min_len {
        return Err(DecodeError::InvalidHeader);
    }

    let table_start_position = cursor.position();

    // Skip over the inline table (count field + symbol array per length),
    // leaving the cursor positioned at the start of the coded payload.
    for _length in min_len..=max_len {
        let count = cursor.read(bits_per_length_count)?;
        for _ in 0..count {
            cursor.read(bits_per_symbol)?;
        }
    }

    Ok(HuffmanState {
        cursor,
        table_start_position,
        bytes_remaining,
        bits_per_symbol,
        min_len,
        max_len,
        bits_per_length_count,
    })
}

/// Starts a top-level Huffman stream: reads the leading `Lomont1(6,0)`
/// decompressed-byte-count field, then the table header.
pub fn huffman_start(source: &[u8]) -> Result<HuffmanState<'_>, DecodeError> {
    let mut cursor = BitCursor::new(source);
    let byte_length = read_lomont1(&mut cursor, 6, 0)?;
    let bytes_remaining = u32::try_from(byte_length).map_err(|_| DecodeError::InvalidHeader)?;
    huffman_header(cursor, bytes_remaining)
}

/// Decodes the next symbol via the canonical walk of spec §4.3, or
/// `Ok(bitcore::END_TOKEN)` once `bytes_remaining` (if tracked) reaches
/// zero.
pub fn huffman_next_symbol(state: &mut HuffmanState<'_>) -> Result<u32, DecodeError> {
    if state.bytes_remaining == 0 {
        return Ok(bitcore::END_TOKEN);
    }

    let mut acc = state.cursor.read(state.min_len)?;
    let mut first: u32 = 0;
    let mut row = state.table_start_position;

    for _length in state.min_len..=state.max_len {
        let (count, after_count) = state.cursor.read_at(row, state.bits_per_length_count)?;
        row = after_count;

        let remainder = acc.checked_sub(first).ok_or(DecodeError::CorruptStream)?;
        if count > 0 && remainder < count {
            let offset = row + (remainder * state.bits_per_symbol) as usize;
            let (symbol, _) = state.cursor.read_at(offset, state.bits_per_symbol)?;
            if state.bytes_remaining != OPEN_ENDED {
                state.bytes_remaining -= 1;
                if state.bytes_remaining == 0 {
                    log::trace!("huffman: bytes_remaining reached zero");
                }
            }
            return Ok(symbol);
        }

        first += count;
        row += (count * state.bits_per_symbol) as usize;
        let bit = state.cursor.read(1)?;
        acc = 2 * acc + bit;
        first <<= 1;
    }

    log::warn!("huffman: canonical walk exhausted max_len without a match");
    Err(DecodeError::CorruptStream)
}

/// One-shot Huffman decode: fills `dest` and returns the number of bytes
/// written.
pub fn decompress_huffman(source: &[u8], dest: &mut [u8]) -> Result<usize, DecodeError> {
    let mut state = huffman_start(source)?;
    let mut written = 0;
    loop {
        let symbol = huffman_next_symbol(&mut state)?;
        if symbol == bitcore::END_TOKEN {
            break;
        }
        let out = dest.get_mut(written).ok_or(DecodeError::InsufficientDestination)?;
        *out = symbol as u8;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod test {
    use super::*;
    use bitcore::lomont1::test_support::BitWriter;

    /// Builds the §8 test-6 fixture: min_len=2, max_len=4, counts=[0,2,4],
    /// symbols=[0,1,2,3,4,5], followed by those six symbols' codes in order.
    fn canonical_fixture() -> alloc::vec::Vec<u8> {
        let mut w = BitWriter::new();
        w.write_lomont1(6, 6, 0); // byte_length: 6 symbols follow
        w.write_lomont1(2, 3, 0); // bits_per_symbol - 1 = 2 -> 3
        w.write_lomont1(2, 3, 0); // bits_per_length_count - 1 = 2 -> 3
        w.write_lomont1(1, 2, 0); // min_len - 1 = 1 -> 2
        w.write_lomont1(1, 4, -1); // delta_len - 1 = 1 -> 2, max_len = 4

        w.write_bits(0, 3); // count_2 = 0
        w.write_bits(2, 3); // count_3 = 2
        w.write_bits(0, 3); // symbol
        w.write_bits(1, 3); // symbol
        w.write_bits(4, 3); // count_4 = 4
        w.write_bits(2, 3);
        w.write_bits(3, 3);
        w.write_bits(4, 3);
        w.write_bits(5, 3);

        // payload: codes for symbols 0,1,2,3,4,5 in order.
        w.write_bits(0b000, 3);
        w.write_bits(0b001, 3);
        w.write_bits(0b0100, 4);
        w.write_bits(0b0101, 4);
        w.write_bits(0b0110, 4);
        w.write_bits(0b0111, 4);

        w.into_bytes()
    }

    #[test]
    fn canonical_walk_decodes_every_symbol_with_documented_bit_counts() {
        let bytes = canonical_fixture();
        let mut state = huffman_start(&bytes).unwrap();
        let expected = [(0u32, 3u32), (1, 3), (2, 4), (3, 4), (4, 4), (5, 4)];
        for (symbol, bits) in expected {
            let before = state.cursor.position();
            assert_eq!(huffman_next_symbol(&mut state).unwrap(), symbol);
            assert_eq!(state.cursor.position() - before, bits as usize);
        }
        assert_eq!(huffman_next_symbol(&mut state).unwrap(), bitcore::END_TOKEN);
    }

    #[test]
    fn decompress_huffman_one_shot_matches_incremental() {
        let bytes = canonical_fixture();
        let mut dest = [0u8; 6];
        let written = decompress_huffman(&bytes, &mut dest).unwrap();
        assert_eq!(written, 6);
        assert_eq!(dest, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn open_ended_huffman_never_returns_end_token_from_bytes_remaining() {
        let mut w = BitWriter::new();
        w.write_lomont1(2, 3, 0);
        w.write_lomont1(2, 3, 0);
        w.write_lomont1(1, 2, 0);
        w.write_lomont1(1, 4, -1);
        w.write_bits(0, 3);
        w.write_bits(2, 3);
        w.write_bits(0, 3);
        w.write_bits(1, 3);
        w.write_bits(4, 3);
        w.write_bits(2, 3);
        w.write_bits(3, 3);
        w.write_bits(4, 3);
        w.write_bits(5, 3);
        // three thousand repeats of symbol 0's code to emulate "thousands of symbols"
        for _ in 0..3000 {
            w.write_bits(0b000, 3);
        }
        let bytes = w.into_bytes();
        let cursor = BitCursor::new(&bytes);
        let mut state = huffman_header(cursor, OPEN_ENDED).unwrap();
        for _ in 0..3000 {
            assert_eq!(huffman_next_symbol(&mut state).unwrap(), 0);
        }
    }

    #[test]
    fn insufficient_destination_is_reported() {
        let bytes = canonical_fixture();
        let mut dest = [0u8; 3];
        assert!(matches!(decompress_huffman(&bytes, &mut dest), Err(DecodeError::InsufficientDestination)));
    }
}

#[cfg(test)]
extern crate alloc;
