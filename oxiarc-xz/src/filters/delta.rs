//! Delta filter: byte-wise difference against a fixed lookback distance.
//!
//! Encoding computes `out[i] = in[i] - in[i-d]` (wrapping); decoding
//! reconstructs the original bytes with a running prefix sum over a
//! `d`-byte history buffer. Both directions process in place.

use oxiarc_core::error::{OxiArcError, Result};

/// Valid range for the delta distance parameter.
pub const DISTANCE_MIN: u8 = 1;
/// Valid range for the delta distance parameter (inclusive).
pub const DISTANCE_MAX: u16 = 256;

/// Delta filter state: the lookback distance and a small history ring.
#[derive(Debug, Clone)]
pub struct Delta {
    distance: usize,
    history: [u8; 256],
    pos: u8,
}

impl Delta {
    /// Create a delta filter for distance `d` in `1..=256`.
    pub fn new(distance: u16) -> Result<Self> {
        if distance < DISTANCE_MIN as u16 || distance > DISTANCE_MAX {
            return Err(OxiArcError::argument_error(format!(
                "delta distance {distance} out of range 1..=256"
            )));
        }
        Ok(Self {
            distance: distance as usize,
            history: [0u8; 256],
            pos: 0,
        })
    }

    /// The encoded distance byte stored in filter properties (`d - 1`).
    pub fn property_byte(&self) -> u8 {
        (self.distance - 1) as u8
    }

    /// Build a filter from a raw property byte (`d = byte + 1`).
    pub fn from_property_byte(byte: u8) -> Self {
        Self {
            distance: byte as usize + 1,
            history: [0u8; 256],
            pos: 0,
        }
    }

    /// Encode `buf` in place: `out[i] = in[i] - history[i-d]`.
    pub fn encode(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            let idx = (self.pos as usize + (256 - self.distance)) & 0xFF;
            let past = self.history[idx];
            let original = *b;
            *b = original.wrapping_sub(past);
            self.history[self.pos as usize] = original;
            self.pos = self.pos.wrapping_add(1);
        }
    }

    /// Decode `buf` in place: prefix-sum reconstruction.
    pub fn decode(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            let idx = (self.pos as usize + (256 - self.distance)) & 0xFF;
            let past = self.history[idx];
            let original = b.wrapping_add(past);
            *b = original;
            self.history[self.pos as usize] = original;
            self.pos = self.pos.wrapping_add(1);
        }
    }
}
