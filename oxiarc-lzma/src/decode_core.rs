//! Shared bit-level LZMA decode loop.
//!
//! The standalone LZMA decoder ([`crate::decoder`]) and each LZMA2 chunk
//! ([`crate::lzma2`]) decode the exact same is_match/literal/is_rep/rep
//! event stream; the only difference between them is where `state`, `rep`
//! and `model` live (owned for one call vs. persisted across chunks) and
//! whether decoding stops at a declared byte count or at the stream's own
//! end-of-stream marker. [`decode_events`] is the one implementation both
//! callers drive.

use crate::model::{
    DIST_ALIGN_BITS, END_POS_MODEL_INDEX, LEN_HIGH_BITS, LEN_LOW_BITS, LEN_MID_BITS, LengthModel,
    LzmaModel, MATCH_LEN_MIN, State,
};
use crate::range_coder::RangeDecoder;
use crate::window::Window;
use oxiarc_core::error::{OxiArcError, Result};
use std::io::Read;

/// Why [`decode_events`] stopped producing bytes.
pub(crate) enum Stop {
    /// `byte_limit` bytes were produced.
    ByteLimit,
    /// The end-of-stream marker (rep distance `0xFFFF_FFFF`) was read.
    Eos,
}

/// Decode a length value (low/mid/high tiers), keyed by `pos_state`.
pub(crate) fn decode_length<R: Read>(
    rc: &mut RangeDecoder<R>,
    len_model: &mut LengthModel,
    pos_state: usize,
) -> Result<u32> {
    if rc.decode_bit(&mut len_model.choice)? == 0 {
        let len = rc.decode_bit_tree(&mut len_model.low[pos_state], LEN_LOW_BITS)?;
        Ok(len + MATCH_LEN_MIN as u32)
    } else if rc.decode_bit(&mut len_model.choice2)? == 0 {
        let len = rc.decode_bit_tree(&mut len_model.mid[pos_state], LEN_MID_BITS)?;
        Ok(len + MATCH_LEN_MIN as u32 + (1 << LEN_LOW_BITS))
    } else {
        let len = rc.decode_bit_tree(&mut len_model.high, LEN_HIGH_BITS)?;
        Ok(len + MATCH_LEN_MIN as u32 + (1 << LEN_LOW_BITS) + (1 << LEN_MID_BITS))
    }
}

/// Decode a match distance for a match of length `len`.
fn decode_distance<R: Read>(
    rc: &mut RangeDecoder<R>,
    model: &mut LzmaModel,
    len: u32,
) -> Result<u32> {
    let len_state = ((len - MATCH_LEN_MIN as u32).min(3)) as usize;

    let slot = rc.decode_bit_tree(&mut model.distance.slot[len_state], 6)?;
    if slot < 4 {
        return Ok(slot);
    }

    let num_direct_bits = ((slot >> 1) - 1) as u32;
    let mut dist = (2 | (slot & 1)) << num_direct_bits;

    if slot < END_POS_MODEL_INDEX as u32 {
        let base_idx = (slot as usize) - (slot as usize >> 1) - 1;
        let mut result = 0u32;
        let mut m = 1usize;
        for i in 0..num_direct_bits {
            let bit = rc.decode_bit(&mut model.distance.special[base_idx + m - 1])?;
            m = (m << 1) | bit as usize;
            result |= bit << i;
        }
        dist += result;
    } else {
        let num_align_bits = DIST_ALIGN_BITS;
        let num_direct = num_direct_bits - num_align_bits;
        let direct = rc.decode_direct_bits(num_direct)?;
        dist += direct << num_align_bits;
        let align = rc.decode_bit_tree_reverse(&mut model.distance.align, num_align_bits)?;
        dist += align;
    }

    Ok(dist)
}

/// Decode a literal byte, given the byte preceding it and (when the
/// previous event was a match) the byte at the current rep0 distance.
fn decode_literal<R: Read>(
    rc: &mut RangeDecoder<R>,
    model: &mut LzmaModel,
    state: &State,
    produced: u64,
    prev_byte: u8,
    match_byte: u8,
) -> Result<u8> {
    let lit_state = model
        .literal
        .get_state(produced, prev_byte, model.props.lc, model.props.lp);

    if state.is_literal() {
        let mut symbol = 1usize;
        loop {
            let bit = rc.decode_bit(&mut model.literal.probs[lit_state][symbol])?;
            symbol = (symbol << 1) | bit as usize;
            if symbol >= 0x100 {
                break;
            }
        }
        Ok((symbol - 0x100) as u8)
    } else {
        let mut symbol = 1usize;
        let mut match_byte = match_byte as usize;
        loop {
            let match_bit = (match_byte >> 7) & 1;
            match_byte <<= 1;

            let prob_idx = 0x100 + (match_bit << 8) + symbol;
            let bit = rc.decode_bit(&mut model.literal.probs[lit_state][prob_idx])?;
            symbol = (symbol << 1) | bit as usize;

            if symbol >= 0x100 {
                break;
            }

            if bit as usize != match_bit {
                while symbol < 0x100 {
                    let bit = rc.decode_bit(&mut model.literal.probs[lit_state][symbol])?;
                    symbol = (symbol << 1) | bit as usize;
                }
                break;
            }
        }
        Ok((symbol - 0x100) as u8)
    }
}

/// Decode literal/match/rep events into `window`, appending each produced
/// byte to `output`, until either `byte_limit` bytes have been produced
/// (the LZMA2 per-chunk case) or the end-of-stream marker is read (the
/// standalone, unknown-size case, which passes `byte_limit = None`).
///
/// `state`/`rep`/`model` are threaded through by the caller so they can
/// persist across LZMA2 chunk boundaries or be owned fresh for a single
/// standalone stream. The position-state counter used to index per-position
/// probability tables (`pos_state`) is always local to this call, resetting
/// to zero every invocation — this matches the encoder, which also resets
/// its own position counter once per LZMA2 chunk. Distance and match-byte
/// validity, by contrast, are checked against `window`, which holds the
/// full cross-chunk history.
pub(crate) fn decode_events<R: Read>(
    rc: &mut RangeDecoder<R>,
    model: &mut LzmaModel,
    state: &mut State,
    rep: &mut [u32; 4],
    window: &mut Window,
    output: &mut Vec<u8>,
    byte_limit: Option<u64>,
) -> Result<Stop> {
    let mut produced: u64 = 0;

    loop {
        if let Some(limit) = byte_limit {
            if produced >= limit {
                return Ok(Stop::ByteLimit);
            }
        }

        let pos_state = (produced as usize) & (model.props.num_pos_states() - 1);
        let state_idx = state.value();

        let is_match = rc.decode_bit(&mut model.is_match[state_idx][pos_state])?;

        if is_match == 0 {
            let prev_byte = if window.is_empty() { 0 } else { window.byte_at(0) };
            let match_byte = if !state.is_literal() && (rep[0] as u64) < window.len() as u64 {
                window.byte_at(rep[0] as usize)
            } else {
                0
            };

            let byte = decode_literal(rc, model, state, produced, prev_byte, match_byte)?;

            window.put(byte);
            output.push(byte);
            produced += 1;
            state.update_literal();
            continue;
        }

        let is_rep = rc.decode_bit(&mut model.is_rep[state_idx])?;

        let (len, dist) = if is_rep == 0 {
            let len = decode_length(rc, &mut model.match_len, pos_state)?;
            let dist = decode_distance(rc, model, len)?;

            rep[3] = rep[2];
            rep[2] = rep[1];
            rep[1] = rep[0];
            rep[0] = dist;

            if dist == 0xFFFF_FFFF {
                return Ok(Stop::Eos);
            }

            state.update_match();
            (len, dist)
        } else {
            let is_rep0 = rc.decode_bit(&mut model.is_rep0[state_idx])?;

            if is_rep0 == 0 {
                let is_rep0_long = rc.decode_bit(&mut model.is_rep0_long[state_idx][pos_state])?;

                if is_rep0_long == 0 {
                    let dist = rep[0];
                    if dist as u64 >= window.len() as u64 {
                        return Err(OxiArcError::corrupted(
                            produced,
                            "short rep references distance beyond decoded data",
                        ));
                    }
                    let byte = window.byte_at(dist as usize);
                    window.put(byte);
                    output.push(byte);
                    produced += 1;
                    state.update_short_rep();
                    continue;
                }

                state.update_long_rep();
                let len = decode_length(rc, &mut model.rep_len, pos_state)?;
                (len, rep[0])
            } else {
                let is_rep1 = rc.decode_bit(&mut model.is_rep1[state_idx])?;

                let dist = if is_rep1 == 0 {
                    rep.swap(0, 1);
                    rep[0]
                } else {
                    let is_rep2 = rc.decode_bit(&mut model.is_rep2[state_idx])?;
                    if is_rep2 == 0 {
                        let d = rep[2];
                        rep[2] = rep[1];
                        rep[1] = rep[0];
                        rep[0] = d;
                        d
                    } else {
                        let d = rep[3];
                        rep[3] = rep[2];
                        rep[2] = rep[1];
                        rep[1] = rep[0];
                        rep[0] = d;
                        d
                    }
                };

                state.update_long_rep();
                let len = decode_length(rc, &mut model.rep_len, pos_state)?;
                (len, dist)
            }
        };

        if dist as u64 >= window.len() as u64 {
            return Err(OxiArcError::corrupted(
                produced,
                "match distance exceeds decoded data",
            ));
        }

        for _ in 0..len {
            let byte = window.byte_at(dist as usize);
            window.put(byte);
            output.push(byte);
            produced += 1;
        }
    }
}
