//! Shared primitives for the `lomont_codec` decoder family: the bitstream
//! cursor, the Lomont1 universal integer code, small bit utilities, and the
//! error/sentinel types every codec crate builds on.
#![no_std]

#[cfg(any(test, feature = "test-support"))]
extern crate alloc;

pub mod bits;
pub mod bitstream;
pub mod error;
pub mod lomont1;

pub use bits::{bits_required, floor_log2, ones_count};
pub use bitstream::BitCursor;
pub use error::DecodeError;
pub use lomont1::read_lomont1;

/// Sentinel returned by incremental decoders once all output has been produced.
pub const END_TOKEN: u32 = 0xFFFF_FFFF;

/// Reads the decompressed byte count that every codec stream starts with
/// (`Lomont1(6, 0)`), without otherwise touching the stream. Side-effect-free.
pub fn get_decompressed_size(source: &[u8]) -> Result<u32, DecodeError> {
    let mut cursor = BitCursor::new(source);
    let size = read_lomont1(&mut cursor, 6, 0)?;
    u32::try_from(size).map_err(|_| DecodeError::InvalidHeader)
}
