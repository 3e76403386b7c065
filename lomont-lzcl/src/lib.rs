//! LZCL decoder (spec §4.7): an LZ77-style decision/literal/copy stream
//! whose three roles — decision (or decision-run), literal, and
//! distance/length (or combined token) — are each delegated to an
//! independently-typed sub-codec (`subcodec::SubCodec`). The copy step
//! reuses `lomont_lz77::circular_copy` verbatim so LZCL's copy semantics
//! stay bit-identical to plain LZ77's (spec §3 invariant).
#![no_std]

pub mod subcodec;

use bitcore::{read_lomont1, BitCursor, DecodeError};
use lomont_lz77::circular_copy;
use subcodec::{read_sub_codec, SubCodec};

/// How a 0/1 copy-vs-literal decision is produced for each output byte.
enum DecisionSource<'a> {
    /// One symbol per decision, decoded directly from `decision_codec`.
    PerByte(SubCodec<'a>),
    /// Run-length-encoded decisions: `decision_run_codec` emits alternating
    /// run lengths, starting from `initial_value`. See [`LzclState::decode_decision`].
    RunLength { codec: SubCodec<'a>, initial_value: u32 },
}

/// How a copy's length and distance are produced.
enum TokenSource<'a> {
    /// A single combined `token`, split as in LZ77 (spec §4.5).
    Combined(SubCodec<'a>),
    /// `distance` and `length` decoded from independent sub-codecs.
    Split { distance: SubCodec<'a>, length: SubCodec<'a> },
}

/// LZCL decoder state (spec §3). `dest` is the same kind of caller-supplied
/// circular buffer LZ77 uses. Unlike `Lz77State`, no top-level cursor is
/// retained after [`lzcl_start`]: every subsequent read goes through one of
/// the sub-codecs' own internal cursors, since the structural header is the
/// only thing ever read from the shared stream position directly.
pub struct LzclState<'a, 'd> {
    byte_index: u32,
    byte_length: u32,
    dest: &'d mut [u8],
    min_length: u32,
    max_distance: u32,
    decision: DecisionSource<'a>,
    literal_codec: SubCodec<'a>,
    token: TokenSource<'a>,
    cur_run: i32,
    runs_left: u32,
}

impl<'a, 'd> LzclState<'a, 'd> {
    pub fn byte_index(&self) -> u32 {
        self.byte_index
    }

    pub fn byte_length(&self) -> u32 {
        self.byte_length
    }

    /// Spec §4.7 step 1: produce the next copy-vs-literal decision.
    fn decode_decision(&mut self) -> Result<u32, DecodeError> {
        match &mut self.decision {
            DecisionSource::PerByte(codec) => codec.next_symbol(),
            DecisionSource::RunLength { codec, initial_value } => {
                if self.cur_run == -1 {
                    self.cur_run = *initial_value as i32;
                    self.runs_left = codec.next_symbol()?;
                }
                if self.runs_left == 0 {
                    self.cur_run ^= 1;
                    self.runs_left = codec.next_symbol()?;
                }
                self.runs_left -= 1;
                Ok(self.cur_run as u32)
            }
        }
    }
}

/// Parses the LZCL structural header (spec §4.7) from an already-positioned
/// cursor.
pub fn lzcl_header<'a, 'd>(mut cursor: BitCursor<'a>, dest: &'d mut [u8]) -> Result<LzclState<'a, 'd>, DecodeError> {
    let byte_length = u32::try_from(read_lomont1(&mut cursor, 6, 0)?).map_err(|_| DecodeError::InvalidHeader)?;
    let max_distance = read_lomont1(&mut cursor, 10, 0)? as u32;
    let min_length = read_lomont1(&mut cursor, 2, 0)? as u32;

    let use_decision_runs = cursor.read(1)? != 0;
    let decision = if !use_decision_runs {
        DecisionSource::PerByte(read_sub_codec(&mut cursor)?)
    } else {
        let initial_value = cursor.read(1)?;
        DecisionSource::RunLength { codec: read_sub_codec(&mut cursor)?, initial_value }
    };

    let literal_codec = read_sub_codec(&mut cursor)?;

    let use_tokens = cursor.read(1)? != 0;
    let token = if !use_tokens {
        TokenSource::Combined(read_sub_codec(&mut cursor)?)
    } else {
        let distance = read_sub_codec(&mut cursor)?;
        let length = read_sub_codec(&mut cursor)?;
        TokenSource::Split { distance, length }
    };

    Ok(LzclState {
        byte_index: 0,
        byte_length,
        dest,
        min_length,
        max_distance,
        decision,
        literal_codec,
        token,
        cur_run: -1,
        runs_left: 0,
    })
}

/// Starts a top-level LZCL stream.
pub fn lzcl_start<'a, 'd>(source: &'a [u8], dest: &'d mut [u8]) -> Result<LzclState<'a, 'd>, DecodeError> {
    let cursor = BitCursor::new(source);
    lzcl_header(cursor, dest)
}

/// Decodes the next output byte or copy (spec §4.7 "Decoding one output
/// byte"). Returns the number of bytes written this step, or `END_TOKEN`
/// once `byte_index >= byte_length`.
pub fn lzcl_next_block(state: &mut LzclState<'_, '_>) -> Result<u32, DecodeError> {
    if state.byte_index >= state.byte_length {
        return Ok(bitcore::END_TOKEN);
    }

    let dest_length = state.dest.len() as u32;
    if dest_length == 0 {
        return Err(DecodeError::InsufficientDestination);
    }

    let decision = state.decode_decision()?;
    if decision == 0 {
        let symbol = state.literal_codec.next_symbol()?;
        let slot = (state.byte_index % dest_length) as usize;
        state.dest[slot] = symbol as u8;
        state.byte_index += 1;
        return Ok(1);
    }

    let (distance, length) = match &mut state.token {
        TokenSource::Combined(codec) => {
            let token = codec.next_symbol()? as u64;
            let modulus = state.max_distance as u64 + 1;
            let length = (token / modulus) as u32 + state.min_length;
            let distance = (token % modulus) as u32;
            (distance, length)
        }
        TokenSource::Split { distance, length } => {
            let distance = distance.next_symbol()?;
            let length = length.next_symbol()? + state.min_length;
            (distance, length)
        }
    };

    circular_copy(state.dest, &mut state.byte_index, distance, length)?;
    if state.byte_index > state.byte_length {
        log::warn!("lzcl: copy ran past byte_length");
    }
    Ok(length)
}

/// One-shot LZCL decode: fills `dest` and returns the number of bytes
/// written.
pub fn decompress_lzcl(source: &[u8], dest: &mut [u8]) -> Result<usize, DecodeError> {
    let mut state = lzcl_start(source, dest)?;
    let mut written: usize = 0;
    loop {
        let count = lzcl_next_block(&mut state)?;
        if count == bitcore::END_TOKEN {
            break;
        }
        written += count as usize;
    }
    Ok(written)
}
