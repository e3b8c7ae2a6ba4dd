//! LZMA decompression.
//!
//! This module implements LZMA decompression as used in 7z, xz, and lzma files.

use crate::decode_core::{self, Stop};
use crate::model::{LzmaModel, LzmaProperties, State};
use crate::range_coder::RangeDecoder;
use crate::window::Window;
use oxiarc_core::error::{OxiArcError, Result};
use std::io::Read;

/// Maximum dictionary size (4 GB).
pub const DICT_SIZE_MAX: u32 = 0xFFFF_FFFF;

/// LZMA decoder.
pub struct LzmaDecoder<R: Read> {
    /// Range decoder.
    rc: RangeDecoder<R>,
    /// LZMA model.
    model: LzmaModel,
    /// Sliding window dictionary.
    window: Window,
    /// Current state.
    state: State,
    /// Rep distances.
    rep: [u32; 4],
    /// Uncompressed size (if known).
    uncompressed_size: Option<u64>,
}

impl<R: Read> LzmaDecoder<R> {
    /// Create a new LZMA decoder.
    pub fn new(reader: R, props: LzmaProperties, dict_size: u32) -> Result<Self> {
        let dict_size = dict_size.max(4096) as usize;

        Ok(Self {
            rc: RangeDecoder::new(reader)?,
            model: LzmaModel::new(props),
            window: Window::new(dict_size),
            state: State::new(),
            rep: [0; 4],
            uncompressed_size: None,
        })
    }

    /// Create decoder from LZMA header.
    pub fn from_header(mut reader: R) -> Result<Self> {
        // Read properties byte
        let mut props_buf = [0u8; 1];
        reader.read_exact(&mut props_buf)?;

        let props = LzmaProperties::from_byte(props_buf[0])
            .ok_or_else(|| OxiArcError::invalid_header("Invalid LZMA properties"))?;

        // Read dictionary size (4 bytes, little-endian)
        let mut dict_buf = [0u8; 4];
        reader.read_exact(&mut dict_buf)?;
        let dict_size = u32::from_le_bytes(dict_buf);

        // Read uncompressed size (8 bytes, little-endian)
        let mut size_buf = [0u8; 8];
        reader.read_exact(&mut size_buf)?;
        let uncompressed_size = u64::from_le_bytes(size_buf);

        let mut decoder = Self::new(reader, props, dict_size)?;

        if uncompressed_size != u64::MAX {
            decoder.uncompressed_size = Some(uncompressed_size);
        }

        Ok(decoder)
    }

    /// Decompress all data.
    pub fn decompress(mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let byte_limit = self.uncompressed_size;

        let stop = decode_core::decode_events(
            &mut self.rc,
            &mut self.model,
            &mut self.state,
            &mut self.rep,
            &mut self.window,
            &mut output,
            byte_limit,
        )?;

        // A stream with a declared size should exhaust that size before
        // ever reaching the end-of-stream marker; an early marker means the
        // data doesn't match its own declared length.
        if matches!(stop, Stop::Eos) && byte_limit.is_some() {
            return Err(OxiArcError::corrupted(
                output.len() as u64,
                "Invalid LZMA data",
            ));
        }

        Ok(output)
    }
}

/// Decompress LZMA data with header.
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    let decoder = LzmaDecoder::from_header(reader)?;
    decoder.decompress()
}

/// Decompress raw LZMA data (no header).
pub fn decompress_raw<R: Read>(
    reader: R,
    props: LzmaProperties,
    dict_size: u32,
    uncompressed_size: Option<u64>,
) -> Result<Vec<u8>> {
    let mut decoder = LzmaDecoder::new(reader, props, dict_size)?;
    decoder.uncompressed_size = uncompressed_size;
    decoder.decompress()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decoder_creation() {
        let props = LzmaProperties::default();
        // Minimal valid LZMA stream (just header bytes for range decoder)
        let data = vec![0x00, 0x00, 0x00, 0x00, 0x00];
        let cursor = Cursor::new(data);

        let result = LzmaDecoder::new(cursor, props, 4096);
        assert!(result.is_ok());
    }

    #[test]
    fn test_properties_round_trip() {
        let props = LzmaProperties::new(3, 0, 2);
        let byte = props.to_byte();
        let decoded = LzmaProperties::from_byte(byte).unwrap();

        assert_eq!(decoded.lc, 3);
        assert_eq!(decoded.lp, 0);
        assert_eq!(decoded.pb, 2);
    }
}
