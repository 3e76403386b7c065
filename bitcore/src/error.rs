//! Decoder error type shared by every codec crate.
//!
//! Grounded on `uefi_decompress::DecompressError`: a plain enum, no
//! `thiserror`, one variant per failure class named in the format contract
//! rather than per call site.

/// A decode failed. Per the format contract, a failed decode leaves state
/// and output buffers in an unspecified-but-memory-safe condition; callers
/// discard them rather than attempting partial recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The cursor ran past the end of the source, a Huffman canonical walk
    /// overflowed its table, or a BASC scan reached an impossible state.
    CorruptStream,
    /// `dest` is smaller than a back-reference requires.
    InsufficientDestination,
    /// A header field decoded to a value outside its documented range.
    InvalidHeader,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            DecodeError::CorruptStream => "corrupt or truncated bitstream",
            DecodeError::InsufficientDestination => "destination buffer too small for back-reference",
            DecodeError::InvalidHeader => "header field outside its valid range",
        };
        f.write_str(msg)
    }
}
