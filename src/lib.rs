//! Self-describing decompressors for memory-constrained targets: Huffman,
//! Arithmetic, LZ77, and the composite LZCL codec, each compiled in behind
//! its own Cargo feature so a firmware image only links the decoders it
//! ships a codec for. `lzcl` re-enables the other three, since LZCL embeds
//! them as sub-codec backends.
#![no_std]

pub use bitcore::{get_decompressed_size, DecodeError, END_TOKEN};

#[cfg(feature = "huffman")]
pub use lomont_huffman;

#[cfg(feature = "arithmetic")]
pub use lomont_arithmetic;

#[cfg(feature = "lz77")]
pub use lomont_lz77;

#[cfg(feature = "lzcl")]
pub use lomont_lzcl;
