//! The four LZCL sub-codec backends (spec §4.6/§4.7/§9 "Shared sub-codec
//! variant"): a tagged enum over {Fixed, Arithmetic, Huffman, Golomb}, each
//! exposing a uniform `next_symbol`. Arithmetic and Huffman are the same
//! `ArithmeticState`/`HuffmanState` used at the top level, started via their
//! cursor-driven `*_header` constructors so they can live inside a larger
//! stream instead of owning their own leading byte-count field.
use bitcore::{bits_required, read_lomont1, BitCursor, DecodeError};

/// Fixed sub-coder (spec §4.6): every symbol is a flat `bits_per_symbol`-wide
/// field, no entropy coding at all.
pub struct FixedState<'a> {
    cursor: BitCursor<'a>,
    bits_per_symbol: u32,
}

impl FixedState<'_> {
    fn next_symbol(&mut self) -> Result<u32, DecodeError> {
        self.cursor.read(self.bits_per_symbol)
    }
}

/// Golomb sub-coder (spec §4.6): unary quotient, truncated-binary remainder.
pub struct GolombState<'a> {
    cursor: BitCursor<'a>,
    parameter: u32,
    k: u32,
    u: u32,
}

impl GolombState<'_> {
    fn next_symbol(&mut self) -> Result<u32, DecodeError> {
        let mut q: u32 = 0;
        loop {
            let bit = self.cursor.read(1)?;
            if bit == 0 {
                break;
            }
            q = q.checked_add(1).ok_or(DecodeError::CorruptStream)?;
        }

        if self.parameter == 0 {
            return Ok(0);
        }

        let mut x = self.cursor.read(self.k - 1)?;
        if x >= self.u {
            let b = self.cursor.read(1)?;
            x = 2 * x + b - self.u;
        }

        q.checked_mul(self.parameter).and_then(|base| base.checked_add(x)).ok_or(DecodeError::CorruptStream)
    }
}

/// A sub-codec, tagged by the 2-bit `codec_type` read in [`read_sub_codec`].
/// Modeled as a sum type per the Design Notes ("the original's tag +
/// overlapping in-place storage is an embedded-C micro-optimization, not
/// part of the contract") rather than reproducing that in-place union.
pub enum SubCodec<'a> {
    Fixed(FixedState<'a>),
    Arithmetic(lomont_arithmetic::ArithmeticState<'a>),
    Huffman(lomont_huffman::HuffmanState<'a>),
    Golomb(GolombState<'a>),
}

impl SubCodec<'_> {
    pub fn next_symbol(&mut self) -> Result<u32, DecodeError> {
        match self {
            SubCodec::Fixed(state) => state.next_symbol(),
            SubCodec::Arithmetic(state) => lomont_arithmetic::arithmetic_next_symbol(state),
            SubCodec::Huffman(state) => lomont_huffman::huffman_next_symbol(state),
            SubCodec::Golomb(state) => state.next_symbol(),
        }
    }
}

/// Reads a sub-codec descriptor (spec §4.7 "A sub-codec read"): a 2-bit
/// type tag, a `Lomont1(6,0)` `bit_length`, then that codec's own header
/// parsed from a throwaway cursor snapshot — so the sub-codec keeps its own
/// internal cursor into the embedded body, while `cursor` (the caller's
/// structural-header cursor) is advanced by exactly `bit_length` bits to
/// reach the next field, regardless of how many bits the header actually
/// consumed from the snapshot.
pub fn read_sub_codec<'a>(cursor: &mut BitCursor<'a>) -> Result<SubCodec<'a>, DecodeError> {
    let codec_type = cursor.read(2)?;
    let bit_length = read_lomont1(cursor, 6, 0)? as usize;
    let sub_start = cursor.position();
    let mut sub_cursor = *cursor;

    let sub_codec = match codec_type {
        0 => {
            let bits_per_symbol = 1 + read_lomont1(&mut sub_cursor, 3, 0)? as u32;
            SubCodec::Fixed(FixedState { cursor: sub_cursor, bits_per_symbol })
        }
        1 => {
            let (state, _total) = lomont_arithmetic::arithmetic_header(sub_cursor)?;
            SubCodec::Arithmetic(state)
        }
        2 => {
            let state = lomont_huffman::huffman_header(sub_cursor, lomont_huffman::OPEN_ENDED)?;
            SubCodec::Huffman(state)
        }
        3 => {
            let parameter = read_lomont1(&mut sub_cursor, 6, 0)? as u32;
            let k = bits_required(parameter);
            let u = if k == 0 {
                0
            } else {
                (1u32.checked_shl(k).ok_or(DecodeError::InvalidHeader)?).wrapping_sub(parameter)
            };
            SubCodec::Golomb(GolombState { cursor: sub_cursor, parameter, k, u })
        }
        _ => unreachable!("a 2-bit read is always in 0..=3"),
    };

    cursor.seek(sub_start + bit_length);
    Ok(sub_codec)
}

#[cfg(test)]
mod test {
    use super::*;
    use bitcore::lomont1::test_support::BitWriter;

    #[test]
    fn fixed_sub_codec_reads_flat_fields_and_advances_by_bit_length() {
        let mut w = BitWriter::new();
        w.write_bits(0, 2); // codec_type = Fixed
        let mut body = BitWriter::new();
        body.write_lomont1(7, 3, 0); // bits_per_symbol - 1 = 7 -> 8
        body.write_bits(0x42, 8);
        let body_bytes = body.into_bytes();
        w.write_lomont1((body_bytes.len() * 8) as u64, 6, 0);
        for byte in &body_bytes {
            w.write_bits(*byte as u32, 8);
        }
        w.write_bits(0b1111, 4); // trailing structural field, must survive untouched
        let bytes = w.into_bytes();

        let mut cursor = BitCursor::new(&bytes);
        let mut codec = read_sub_codec(&mut cursor).unwrap();
        assert_eq!(codec.next_symbol().unwrap(), 0x42);
        assert_eq!(cursor.read(4).unwrap(), 0b1111);
    }

    #[test]
    fn golomb_truncated_binary_matches_the_worked_example() {
        // parameter = 5: k = bits_required(5) = 3, u = 2^3 - 5 = 3.
        let mut w = BitWriter::new();
        w.write_bits(3, 2); // codec_type = Golomb
        let mut body = BitWriter::new();
        body.write_lomont1(5, 6, 0); // parameter
        body.write_bit(true); // q = 1 (one leading 1 bit)
        body.write_bit(false); // terminate unary
        body.write_bits(0b10, 2); // x=2 (k-1=2 bits), 2 < u=3, so r = 2
        let body_bytes = body.into_bytes();
        w.write_lomont1((body_bytes.len() * 8) as u64, 6, 0);
        for byte in &body_bytes {
            w.write_bits(*byte as u32, 8);
        }
        let bytes = w.into_bytes();

        let mut cursor = BitCursor::new(&bytes);
        let mut codec = read_sub_codec(&mut cursor).unwrap();
        // symbol = q * parameter + r = 1*5 + 2 = 7
        assert_eq!(codec.next_symbol().unwrap(), 7);
    }
}
