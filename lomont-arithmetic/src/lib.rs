//! Arithmetic decoder (spec §4.4): a 31-bit range coder with E1/E2/E3
//! renormalization, whose cumulative-frequency table is BASC-encoded
//! directly in the bitstream and re-scanned from scratch on every symbol —
//! a deliberate RAM-vs-CPU trade for MCUs with only tens of kilobytes of
//! RAM (see `basc_lookup`).
#![no_std]

use bitcore::{bits_required, read_lomont1, BitCursor, DecodeError};

const RANGE_25: u32 = 1 << 29;
const RANGE_50: u32 = 1 << 30;
const RANGE_75: u32 = 3 * (1 << 29);
const RANGE_100: u32 = 1 << 31;

/// Arithmetic decoder state. Per spec §3, `scaling` and other unused
/// reference fields are not carried — see Open Question 3.
pub struct ArithmeticState<'a> {
    cursor: BitCursor<'a>,
    low: u32,
    high: u32,
    total: u32,
    buffer: u32,
    bit_length: u32,
    bits_read: u32,
    symbol_min: u32,
    table_start_position: usize,
}

/// Reads the next compressed bit, or a deterministic zero once the
/// compressed region (`bit_length` bits) is exhausted. Always advances
/// `bits_read`.
fn read_arithmetic_bit(state: &mut ArithmeticState<'_>) -> Result<u32, DecodeError> {
    let bit = if state.bits_read < state.bit_length { state.cursor.read(1)? } else { 0 };
    state.bits_read += 1;
    Ok(bit)
}

/// Parses the Arithmetic header (`total`, `bit_length`, the BASC table
/// bounds) using an already-positioned cursor, and returns the state plus
/// `total` — the number of symbols the caller must request (spec §4.4:
/// "No explicit end token").
pub fn arithmetic_header(mut cursor: BitCursor<'_>) -> Result<(ArithmeticState<'_>, u32), DecodeError> {
    let total = read_lomont1(&mut cursor, 6, 0)? as u32;
    if total == 0 {
        return Err(DecodeError::InvalidHeader);
    }
    let bit_length = read_lomont1(&mut cursor, 8, -1)? as u32;
    let symbol_min = read_lomont1(&mut cursor, 6, 0)? as u32;
    let _symbol_max = read_lomont1(&mut cursor, 6, 0)? as u32;
    let table_bit_length = read_lomont1(&mut cursor, 6, 0)? as usize;

    let table_start_position = cursor.position();
    cursor.seek(table_start_position + table_bit_length);

    let mut state = ArithmeticState {
        cursor,
        low: 0,
        high: RANGE_100 - 1,
        total,
        buffer: 0,
        bit_length,
        bits_read: 0,
        symbol_min,
        table_start_position,
    };

    let mut buffer: u32 = 0;
    for _ in 0..31 {
        let bit = read_arithmetic_bit(&mut state)?;
        buffer = (buffer << 1) | bit;
    }
    state.buffer = buffer;

    Ok((state, total))
}

/// Starts a top-level Arithmetic stream: reads the leading byte-count
/// field, then the Arithmetic header.
pub fn arithmetic_start(source: &[u8]) -> Result<(ArithmeticState<'_>, u32), DecodeError> {
    let mut cursor = BitCursor::new(source);
    let _byte_length = read_lomont1(&mut cursor, 6, 0)?;
    arithmetic_header(cursor)
}

/// BASC table scan (spec §4.4 "BASC table lookup"). Operates on a
/// throwaway copy of the cursor positioned at `table_start_position`, so
/// the caller's live cursor is never disturbed — the spec's "restore the
/// original cursor" requirement is satisfied structurally rather than by
/// explicit save/restore bookkeeping.
fn basc_lookup(state: &ArithmeticState<'_>, cum_count: u32) -> Result<(u32, u32, u32), DecodeError> {
    let mut scan = state.cursor;
    scan.seek(state.table_start_position);

    let length = read_lomont1(&mut scan, 6, 0)?;
    if length == 0 {
        return Ok((0, 0, 0));
    }

    let mut b = read_lomont1(&mut scan, 6, 0)? as u32;
    let mut x = scan.read(b)?;

    let mut low_count: u32 = 0;
    let mut high_count: u32 = x;
    let mut symbol = state.symbol_min;
    let mut i = state.symbol_min;

    while high_count <= cum_count {
        let decision = scan.read(1)?;
        if decision == 0 {
            x = scan.read(b)?;
        } else {
            let mut delta: u32 = 0;
            loop {
                let bit = scan.read(1)?;
                if bit == 0 {
                    break;
                }
                delta += 1;
            }
            b += delta;
            if b == 0 {
                return Err(DecodeError::CorruptStream);
            }
            x = scan.read(b - 1)?;
            x |= 1 << (b - 1);
        }
        b = bits_required(x);

        low_count = high_count;
        high_count = high_count.checked_add(x).ok_or(DecodeError::CorruptStream)?;
        i = i.checked_add(1).ok_or(DecodeError::CorruptStream)?;
        if x != 0 {
            symbol = i;
        }
    }

    Ok((symbol, low_count, high_count))
}

fn renormalize(state: &mut ArithmeticState<'_>) -> Result<(), DecodeError> {
    loop {
        if state.high < RANGE_50 {
            // E1: window entirely in the lower half.
        } else if state.low >= RANGE_50 {
            // E2: window entirely in the upper half.
            state.low -= RANGE_50;
            state.high -= RANGE_50;
            state.buffer = state.buffer.wrapping_sub(RANGE_50);
        } else {
            break;
        }
        let bit = read_arithmetic_bit(state)?;
        state.low = state.low.wrapping_mul(2);
        state.high = state.high.wrapping_mul(2).wrapping_add(1);
        state.buffer = state.buffer.wrapping_mul(2).wrapping_add(bit);
    }

    while state.low >= RANGE_25 && state.high < RANGE_75 {
        // E3: window straddles the middle quartiles.
        state.low -= RANGE_25;
        state.high -= RANGE_25;
        state.buffer = state.buffer.wrapping_sub(RANGE_25);
        let bit = read_arithmetic_bit(state)?;
        state.low = state.low.wrapping_mul(2);
        state.high = state.high.wrapping_mul(2).wrapping_add(1);
        state.buffer = state.buffer.wrapping_mul(2).wrapping_add(bit);
    }

    Ok(())
}

/// Decodes the next symbol (spec §4.4 steps 1-5). There is no end token —
/// the caller requests exactly `total` symbols, as returned by
/// [`arithmetic_start`].
pub fn arithmetic_next_symbol(state: &mut ArithmeticState<'_>) -> Result<u32, DecodeError> {
    let range = (state.high - state.low + 1) as u64;
    let step = (range / state.total as u64) as u32;
    if step == 0 {
        log::warn!("arithmetic: degenerate step (total larger than the current range)");
        return Err(DecodeError::CorruptStream);
    }

    let cum_count = state.buffer.wrapping_sub(state.low) / step;
    let (symbol, low_count, high_count) = basc_lookup(state, cum_count)?;

    state.high = state.low.wrapping_add(step.wrapping_mul(high_count)).wrapping_sub(1);
    state.low = state.low.wrapping_add(step.wrapping_mul(low_count));

    renormalize(state)?;

    debug_assert!(state.low < state.high, "renormalization must restore low < high");
    debug_assert!(state.high - state.low + 1 > RANGE_25, "renormalization must restore range > 25%");

    Ok(symbol)
}

/// One-shot Arithmetic decode: fills `dest` with exactly `total` decoded
/// bytes and returns that count.
pub fn decompress_arithmetic(source: &[u8], dest: &mut [u8]) -> Result<usize, DecodeError> {
    let (mut state, total) = arithmetic_start(source)?;
    let total = total as usize;
    if dest.len() < total {
        return Err(DecodeError::InsufficientDestination);
    }
    for slot in dest.iter_mut().take(total) {
        *slot = arithmetic_next_symbol(&mut state)? as u8;
    }
    Ok(total)
}


#[cfg(test)]
extern crate alloc;
