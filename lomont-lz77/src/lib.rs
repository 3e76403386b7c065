//! LZ77 decoder (spec §4.5): a literal/run-pair stream over a caller-supplied
//! circular output window. The copy loop is exposed as [`circular_copy`] so
//! `lomont_lzcl` can reuse it verbatim — the copy semantics of LZCL must be
//! bit-identical to LZ77's (spec §3 invariant).
#![no_std]

use bitcore::{read_lomont1, BitCursor, DecodeError};

/// LZ77 decoder state. `dest` is a caller-owned circular buffer; `byte_index`
/// is a monotonically increasing output position, wrapped mod `dest.len()`
/// on every access rather than ever being stored pre-wrapped.
pub struct Lz77State<'a, 'd> {
    cursor: BitCursor<'a>,
    byte_index: u32,
    byte_length: u32,
    dest: &'d mut [u8],
    max_distance: u32,
    min_length: u32,
    bits_per_symbol: u32,
    bits_per_token: u32,
}

impl<'a, 'd> Lz77State<'a, 'd> {
    /// Current output position, for parity with the reference's exposed
    /// `byte_index`/`byte_length` pair (spec §15: "the struct still exposes
    /// for parity").
    pub fn byte_index(&self) -> u32 {
        self.byte_index
    }

    pub fn byte_length(&self) -> u32 {
        self.byte_length
    }
}

/// Copies `length` bytes within a circular `dest` from `distance` bytes
/// behind the current write position, advancing `byte_index` by `length`.
/// Shared verbatim between `lomont_lz77` and `lomont_lzcl` so the "LZCL copy
/// semantics are bit-identical to LZ77's" invariant holds by construction.
pub fn circular_copy(dest: &mut [u8], byte_index: &mut u32, distance: u32, length: u32) -> Result<(), DecodeError> {
    let dest_length = dest.len() as u32;
    if dest_length == 0 || distance >= dest_length {
        return Err(DecodeError::InsufficientDestination);
    }
    let delta = dest_length - distance - 1;
    for _ in 0..length {
        let src = ((*byte_index + delta) % dest_length) as usize;
        let dst = (*byte_index % dest_length) as usize;
        dest[dst] = dest[src];
        *byte_index += 1;
    }
    Ok(())
}

/// Parses the LZ77 header using an already-positioned cursor. Shared between
/// [`lz77_start`] and `lomont_lzcl`'s token/distance/length sub-codec split,
/// which reuses `min_length`/`max_distance` directly from the parent LZCL
/// header rather than from a nested LZ77 header — this function is only the
/// top-level entry's own field layout.
pub fn lz77_header<'a, 'd>(mut cursor: BitCursor<'a>, dest: &'d mut [u8]) -> Result<Lz77State<'a, 'd>, DecodeError> {
    let byte_length = u32::try_from(read_lomont1(&mut cursor, 6, 0)?).map_err(|_| DecodeError::InvalidHeader)?;
    let bits_per_symbol = 1 + read_lomont1(&mut cursor, 3, 0)? as u32;
    let bits_per_token = 1 + read_lomont1(&mut cursor, 5, 0)? as u32;
    let min_length = read_lomont1(&mut cursor, 2, 0)? as u32;
    let _max_token = read_lomont1(&mut cursor, 25, -10)?;
    let max_distance = read_lomont1(&mut cursor, 14, -7)? as u32;

    Ok(Lz77State { cursor, byte_index: 0, byte_length, dest, max_distance, min_length, bits_per_symbol, bits_per_token })
}

/// Starts a top-level LZ77 stream.
pub fn lz77_start<'a, 'd>(source: &'a [u8], dest: &'d mut [u8]) -> Result<Lz77State<'a, 'd>, DecodeError> {
    let cursor = BitCursor::new(source);
    lz77_header(cursor, dest)
}

/// Decodes the next block (spec §4.5 "Block step"): either a single literal
/// or a back-reference copy. Returns the number of bytes written, or
/// `END_TOKEN` once `byte_index >= byte_length`.
pub fn lz77_next_block(state: &mut Lz77State<'_, '_>) -> Result<u32, DecodeError> {
    if state.byte_index >= state.byte_length {
        return Ok(bitcore::END_TOKEN);
    }

    let dest_length = state.dest.len() as u32;
    if dest_length == 0 {
        return Err(DecodeError::InsufficientDestination);
    }

    let decision = state.cursor.read(1)?;
    if decision == 0 {
        let symbol = state.cursor.read(state.bits_per_symbol)?;
        let slot = (state.byte_index % dest_length) as usize;
        state.dest[slot] = symbol as u8;
        state.byte_index += 1;
        return Ok(1);
    }

    let token = state.cursor.read(state.bits_per_token)? as u64;
    let modulus = state.max_distance as u64 + 1;
    let length = (token / modulus) as u32 + state.min_length;
    let distance = (token % modulus) as u32;

    circular_copy(state.dest, &mut state.byte_index, distance, length)?;
    if state.byte_index > state.byte_length {
        log::warn!("lz77: copy ran past byte_length");
    }
    Ok(length)
}

/// One-shot LZ77 decode: fills `dest` and returns the number of bytes
/// written. `dest` doubles as the circular window and the final output —
/// per spec §3, `dest_length` must be at least the largest back-reference
/// distance the compressor used.
pub fn decompress_lz77(source: &[u8], dest: &mut [u8]) -> Result<usize, DecodeError> {
    let mut state = lz77_start(source, dest)?;
    let mut written: usize = 0;
    loop {
        let count = lz77_next_block(&mut state)?;
        if count == bitcore::END_TOKEN {
            break;
        }
        written += count as usize;
    }
    Ok(written)
}


#[cfg(test)]
extern crate alloc;
