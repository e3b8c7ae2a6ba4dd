//! LZMA2 codec for XZ files.
//!
//! LZMA2 is a container format around LZMA that provides:
//! - Support for uncompressible chunks (stored as-is)
//! - Dictionary/state reset capability
//! - Chunk-based format for better streaming
//!
//! ## Chunk Format
//!
//! Each chunk starts with a control byte:
//! - 0x00: End of LZMA2 stream
//! - 0x01: Uncompressed chunk, dictionary reset
//! - 0x02: Uncompressed chunk, no reset
//! - 0x80-0xFF: LZMA compressed chunk (with various reset flags)

use crate::decode_core;
use crate::encoder::LzmaEncoder;
use crate::model::{LzmaModel, LzmaProperties, State};
use crate::window::Window;
use crate::{LzmaLevel, RangeDecoder};
use oxiarc_core::error::{OxiArcError, Result};
use std::io::{Read, Write};

/// Maximum uncompressed size for a single LZMA chunk (2 MiB), per the LZMA2 format.
pub const LZMA_CHUNK_MAX_UNCOMPRESSED: usize = 1 << 21;

/// Maximum compressed size for a single LZMA chunk (64 KiB).
pub const LZMA_CHUNK_MAX_COMPRESSED: usize = 1 << 16;

/// Maximum uncompressed size for an uncompressed chunk (64 KiB).
pub const UNCOMPRESSED_CHUNK_MAX: usize = 1 << 16;

/// Default chunk size used by the encoder when splitting input.
pub const DEFAULT_CHUNK_SIZE: usize = LZMA_CHUNK_MAX_UNCOMPRESSED;

/// Control byte constants and helpers for LZMA2 chunk headers.
pub mod control {
    /// End of stream marker.
    pub const EOS: u8 = 0x00;

    /// Uncompressed chunk with dictionary reset.
    pub const UNCOMPRESSED_RESET: u8 = 0x01;

    /// Uncompressed chunk without reset.
    pub const UNCOMPRESSED: u8 = 0x02;

    /// LZMA chunk mask (bit 7 set).
    pub const LZMA_MASK: u8 = 0x80;

    /// Dictionary reset flag (bit 5).
    pub const DICT_RESET: u8 = 0x20;

    /// State/properties reset flag (bit 6).
    pub const STATE_RESET: u8 = 0x40;

    /// High bits of uncompressed size mask (bits 0-4).
    pub const SIZE_HIGH_MASK: u8 = 0x1F;

    /// Check if control byte indicates an LZMA chunk.
    #[inline]
    pub const fn is_lzma(ctrl: u8) -> bool {
        ctrl & LZMA_MASK != 0
    }

    /// Check if control byte indicates dictionary reset.
    #[inline]
    pub const fn has_dict_reset(ctrl: u8) -> bool {
        ctrl & DICT_RESET != 0
    }

    /// Check if control byte indicates state/properties reset.
    #[inline]
    pub const fn has_state_reset(ctrl: u8) -> bool {
        ctrl & STATE_RESET != 0
    }

    /// Build an LZMA chunk control byte.
    #[inline]
    pub const fn build_lzma(uncompressed_size_high: u8, reset_dict: bool, reset_state: bool) -> u8 {
        let mut ctrl = LZMA_MASK | (uncompressed_size_high & SIZE_HIGH_MASK);
        if reset_dict {
            ctrl |= DICT_RESET;
        }
        if reset_state {
            ctrl |= STATE_RESET;
        }
        ctrl
    }
}

/// Chunk type parsed from a control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    /// End of stream.
    EndOfStream,
    /// Uncompressed chunk.
    Uncompressed {
        /// Whether to reset dictionary.
        reset_dict: bool,
    },
    /// LZMA compressed chunk.
    Lzma {
        /// Whether to reset dictionary.
        reset_dict: bool,
        /// Whether to reset state and read new properties.
        reset_state: bool,
    },
}

impl ChunkType {
    /// Parse a control byte into a chunk type.
    pub fn from_control_byte(ctrl: u8) -> Self {
        match ctrl {
            control::EOS => Self::EndOfStream,
            control::UNCOMPRESSED_RESET => Self::Uncompressed { reset_dict: true },
            control::UNCOMPRESSED => Self::Uncompressed { reset_dict: false },
            c if control::is_lzma(c) => Self::Lzma {
                reset_dict: control::has_dict_reset(c),
                reset_state: control::has_state_reset(c),
            },
            _ => Self::EndOfStream,
        }
    }
}

/// LZMA2 decoder.
///
/// Chunk-scoped entropy decoding is delegated entirely to
/// [`decode_core::decode_events`] — the same routine the standalone decoder
/// uses — so this type only owns what must persist across chunk
/// boundaries: the sliding window, the probability model, and the state
/// machine/rep distances, all of which a reset flag in a chunk header may
/// clear.
pub struct Lzma2Decoder {
    /// Sliding window dictionary (persisted across chunks unless reset).
    window: Window,
    /// LZMA properties (may change between chunks).
    props: Option<LzmaProperties>,
    /// LZMA model state (preserved across chunks unless reset).
    model: Option<LzmaModel>,
    /// Decoder state (preserved across chunks unless reset).
    state: State,
    /// Rep distances (preserved across chunks unless reset).
    rep: [u32; 4],
    /// Whether decoding is finished.
    finished: bool,
}

impl Lzma2Decoder {
    /// Create a new LZMA2 decoder with the given dictionary size.
    pub fn new(dict_size: u32) -> Self {
        let dict_size = dict_size.max(4096);
        Self {
            window: Window::new(dict_size as usize),
            props: None,
            model: None,
            state: State::new(),
            rep: [0; 4],
            finished: false,
        }
    }

    /// Decode an LZMA2 stream.
    pub fn decode<R: Read>(&mut self, reader: &mut R) -> Result<Vec<u8>> {
        let mut output = Vec::new();

        loop {
            // Read control byte
            let mut control = [0u8; 1];
            if reader.read_exact(&mut control).is_err() {
                break;
            }
            let control = control[0];

            if control == 0x00 {
                // End of stream
                self.finished = true;
                break;
            }

            if control == 0x01 || control == 0x02 {
                // Uncompressed chunk
                let reset_dict = control == 0x01;
                self.decode_uncompressed_chunk(reader, &mut output, reset_dict)?;
            } else if control >= 0x80 {
                // LZMA compressed chunk
                self.decode_lzma_chunk(reader, &mut output, control)?;
            } else {
                return Err(OxiArcError::invalid_header(format!(
                    "Invalid LZMA2 control byte: 0x{:02X}",
                    control
                )));
            }
        }

        Ok(output)
    }

    /// Decode an uncompressed chunk.
    fn decode_uncompressed_chunk<R: Read>(
        &mut self,
        reader: &mut R,
        output: &mut Vec<u8>,
        reset_dict: bool,
    ) -> Result<()> {
        // Read size (big-endian, 16-bit) + 1
        let mut size_bytes = [0u8; 2];
        reader.read_exact(&mut size_bytes)?;
        let size = u16::from_be_bytes(size_bytes) as usize + 1;

        if reset_dict {
            self.window.reset();
        }

        // Read uncompressed data
        let start = output.len();
        output.resize(start + size, 0);
        reader.read_exact(&mut output[start..])?;

        for &byte in &output[start..] {
            self.window.put(byte);
        }

        Ok(())
    }

    /// Decode an LZMA compressed chunk.
    fn decode_lzma_chunk<R: Read>(
        &mut self,
        reader: &mut R,
        output: &mut Vec<u8>,
        control: u8,
    ) -> Result<()> {
        // Parse control byte
        let reset_dict = (control & 0x20) != 0;
        let reset_state = (control & 0x40) != 0 || reset_dict;
        let new_props = (control & 0x40) != 0;

        // Read uncompressed size (high 5 bits from control + 16-bit)
        let uncompressed_hi = ((control & 0x1F) as usize) << 16;
        let mut size_bytes = [0u8; 2];
        reader.read_exact(&mut size_bytes)?;
        let uncompressed_size = (uncompressed_hi | (u16::from_be_bytes(size_bytes) as usize)) + 1;

        // Read compressed size (16-bit) + 1
        reader.read_exact(&mut size_bytes)?;
        let compressed_size = u16::from_be_bytes(size_bytes) as usize + 1;

        // Read properties byte if needed
        if new_props {
            let mut props_byte = [0u8; 1];
            reader.read_exact(&mut props_byte)?;
            self.props = Some(
                LzmaProperties::from_byte(props_byte[0])
                    .ok_or_else(|| OxiArcError::invalid_header("Invalid LZMA properties"))?,
            );
        }

        if reset_dict {
            self.window.reset();
        }

        if reset_state {
            self.state = State::new();
            self.rep = [0; 4];
            // Reset model with new properties
            if let Some(props) = self.props {
                self.model = Some(LzmaModel::new(props));
            }
        }

        // Read compressed data
        let mut compressed = vec![0u8; compressed_size];
        reader.read_exact(&mut compressed)?;

        let props = self
            .props
            .ok_or_else(|| OxiArcError::invalid_header("LZMA2 chunk requires properties"))?;
        if self.model.is_none() {
            self.model = Some(LzmaModel::new(props));
        }
        let model = self
            .model
            .as_mut()
            .ok_or_else(|| OxiArcError::corrupted(0, "LZMA model not initialized"))?;

        let mut cursor = std::io::Cursor::new(&compressed);
        let mut rc = RangeDecoder::new(&mut cursor)?;

        // A chunk never contains more than its declared uncompressed size;
        // an end-of-stream marker inside a chunk is tolerated rather than
        // treated as corruption, matching the permissive framing LZMA2
        // chunks already use elsewhere in this decoder.
        decode_core::decode_events(
            &mut rc,
            model,
            &mut self.state,
            &mut self.rep,
            &mut self.window,
            output,
            Some(uncompressed_size as u64),
        )?;

        Ok(())
    }

    /// Check if decoding is finished.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// LZMA2 encoder configuration.
#[derive(Debug, Clone)]
pub struct Lzma2Config {
    /// Chunk size used to split input (clamped to [`LZMA_CHUNK_MAX_UNCOMPRESSED`]).
    pub chunk_size: usize,
    /// LZMA properties.
    pub props: LzmaProperties,
    /// Compression level.
    pub level: LzmaLevel,
    /// Dictionary size.
    pub dict_size: u32,
}

impl Default for Lzma2Config {
    fn default() -> Self {
        Self::with_level(LzmaLevel::DEFAULT)
    }
}

impl Lzma2Config {
    /// Create a new configuration for the given compression level.
    pub fn with_level(level: LzmaLevel) -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            props: LzmaProperties::default(),
            level,
            dict_size: level.dict_size(),
        }
    }

    /// Set the chunk size (clamped to the max LZMA chunk uncompressed size).
    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.min(LZMA_CHUNK_MAX_UNCOMPRESSED);
        self
    }

    /// Set LZMA properties.
    #[must_use]
    pub fn properties(mut self, props: LzmaProperties) -> Self {
        self.props = props;
        self
    }

    /// Set dictionary size.
    #[must_use]
    pub fn dict_size(mut self, size: u32) -> Self {
        self.dict_size = size;
        self
    }
}

/// Encoder-side state carried across chunks (dictionary contents and the
/// properties currently in force). The probability model itself is
/// rebuilt fresh per chunk (see [`Lzma2Encoder::encode_chunk`]), so it is
/// not part of this state.
struct EncoderDictState {
    props: LzmaProperties,
    dictionary: Vec<u8>,
    dict_pos: usize,
    first_chunk: bool,
}

impl EncoderDictState {
    fn new(props: LzmaProperties, dict_size: u32) -> Self {
        Self {
            props,
            dictionary: vec![0u8; dict_size.max(1) as usize],
            dict_pos: 0,
            first_chunk: true,
        }
    }

    fn update_dictionary(&mut self, data: &[u8]) {
        let dict_capacity = self.dictionary.len();
        for &byte in data {
            self.dictionary[self.dict_pos] = byte;
            self.dict_pos = (self.dict_pos + 1) % dict_capacity;
        }
    }
}

/// LZMA2 encoder.
///
/// Splits input into chunks no larger than [`LZMA_CHUNK_MAX_UNCOMPRESSED`]
/// bytes of uncompressed data each, falling back to uncompressed chunks
/// (and, when an individual chunk still compresses over
/// [`LZMA_CHUNK_MAX_COMPRESSED`], further sub-chunking) so that every
/// emitted chunk respects the format's size limits. A single-chunk
/// encoding is only ever produced for inputs that are themselves small
/// enough to fit in one chunk.
pub struct Lzma2Encoder {
    config: Lzma2Config,
    dict_state: EncoderDictState,
}

impl Lzma2Encoder {
    /// Create a new encoder for the given compression level.
    pub fn new(level: LzmaLevel) -> Self {
        Self::with_config(Lzma2Config::with_level(level))
    }

    /// Create a new encoder with a custom configuration.
    pub fn with_config(config: Lzma2Config) -> Self {
        let dict_state = EncoderDictState::new(config.props, config.dict_size);
        Self {
            config,
            dict_state,
        }
    }

    /// Encode data to LZMA2 format, splitting into multiple chunks as needed.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();

        if data.is_empty() {
            output.push(control::EOS);
            return Ok(output);
        }

        let mut offset = 0;
        while offset < data.len() {
            let remaining = data.len() - offset;
            let chunk_size = remaining.min(self.config.chunk_size);
            let chunk = &data[offset..offset + chunk_size];

            self.encode_chunk(&mut output, chunk)?;
            offset += chunk_size;
        }

        output.push(control::EOS);
        Ok(output)
    }

    /// Encode a single top-level chunk, further splitting it if the
    /// compressed result would exceed the per-chunk compressed size limit.
    fn encode_chunk(&mut self, output: &mut Vec<u8>, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let reset_dict = self.dict_state.first_chunk;
        // Every chunk is encoded with a freshly-initialized probability
        // model (this encoder does not carry model state across chunks),
        // so the decoder must reset its state and re-read properties too.
        let reset_state = true;

        let encoder = LzmaEncoder::new(self.config.level, self.config.dict_size);
        let compressed = encoder.compress(data)?;

        if compressed.len() >= data.len() {
            self.write_uncompressed_chunks(output, data, reset_dict)?;
        } else {
            self.write_lzma_chunks(output, data, &compressed, reset_dict, reset_state)?;
        }

        self.dict_state.update_dictionary(data);
        self.dict_state.first_chunk = false;
        Ok(())
    }

    fn write_uncompressed_chunks(
        &mut self,
        output: &mut Vec<u8>,
        data: &[u8],
        mut reset_dict: bool,
    ) -> Result<()> {
        let mut offset = 0;
        while offset < data.len() {
            let remaining = data.len() - offset;
            let chunk_size = remaining.min(UNCOMPRESSED_CHUNK_MAX);
            let chunk = &data[offset..offset + chunk_size];

            let ctrl = if reset_dict {
                control::UNCOMPRESSED_RESET
            } else {
                control::UNCOMPRESSED
            };
            output.write_all(&[ctrl])?;
            output.write_all(&((chunk_size - 1) as u16).to_be_bytes())?;
            output.write_all(chunk)?;

            offset += chunk_size;
            reset_dict = false;
        }
        Ok(())
    }

    fn write_lzma_chunks(
        &mut self,
        output: &mut Vec<u8>,
        uncompressed: &[u8],
        compressed: &[u8],
        reset_dict: bool,
        reset_state: bool,
    ) -> Result<()> {
        if compressed.len() > LZMA_CHUNK_MAX_COMPRESSED {
            return self.write_lzma_chunks_split(output, uncompressed, reset_dict);
        }
        self.write_single_lzma_chunk(
            output,
            uncompressed.len(),
            compressed,
            reset_dict,
            reset_state,
        )
    }

    fn write_single_lzma_chunk(
        &mut self,
        output: &mut Vec<u8>,
        uncompressed_size: usize,
        compressed: &[u8],
        reset_dict: bool,
        reset_state: bool,
    ) -> Result<()> {
        let uncompressed_minus_1 = uncompressed_size - 1;
        let size_high = ((uncompressed_minus_1 >> 16) & 0x1F) as u8;
        let size_low = (uncompressed_minus_1 & 0xFFFF) as u16;

        output.write_all(&[control::build_lzma(size_high, reset_dict, reset_state)])?;
        output.write_all(&size_low.to_be_bytes())?;

        let compressed_size = (compressed.len() - 1) as u16;
        output.write_all(&compressed_size.to_be_bytes())?;

        if reset_state {
            output.write_all(&[self.dict_state.props.to_byte()])?;
        }

        output.write_all(compressed)?;
        Ok(())
    }

    /// Split a chunk that compressed over the 64 KiB limit into smaller
    /// sub-chunks, each compressed independently.
    fn write_lzma_chunks_split(
        &mut self,
        output: &mut Vec<u8>,
        data: &[u8],
        mut reset_dict: bool,
    ) -> Result<()> {
        let sub_chunk_size = 16 * 1024;
        let mut offset = 0;

        while offset < data.len() {
            let remaining = data.len() - offset;
            let chunk_size = remaining.min(sub_chunk_size);
            let chunk = &data[offset..offset + chunk_size];

            let encoder = LzmaEncoder::new(self.config.level, self.config.dict_size);
            let compressed = encoder.compress(chunk)?;

            if compressed.len() >= chunk.len() || compressed.len() > LZMA_CHUNK_MAX_COMPRESSED {
                let mut unc_offset = 0;
                while unc_offset < chunk.len() {
                    let unc_remaining = chunk.len() - unc_offset;
                    let unc_size = unc_remaining.min(UNCOMPRESSED_CHUNK_MAX);
                    let unc_chunk = &chunk[unc_offset..unc_offset + unc_size];

                    let ctrl = if reset_dict {
                        control::UNCOMPRESSED_RESET
                    } else {
                        control::UNCOMPRESSED
                    };
                    output.write_all(&[ctrl])?;
                    output.write_all(&((unc_size - 1) as u16).to_be_bytes())?;
                    output.write_all(unc_chunk)?;

                    reset_dict = false;
                    unc_offset += unc_size;
                }
            } else {
                self.write_single_lzma_chunk(output, chunk.len(), &compressed, reset_dict, true)?;
                reset_dict = false;
            }

            offset += chunk_size;
        }

        Ok(())
    }

    /// Get the dictionary size for this encoder.
    pub fn dict_size(&self) -> u32 {
        self.config.dict_size
    }

    /// Change LZMA properties mid-stream; takes effect from the next chunk.
    pub fn set_properties(&mut self, props: LzmaProperties) {
        self.dict_state.props = props;
        self.config.props = props;
    }

    /// Get the properties currently in force.
    pub fn properties(&self) -> LzmaProperties {
        self.dict_state.props
    }
}

/// Decode LZMA2 data.
pub fn decode_lzma2(data: &[u8], dict_size: u32) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(data);
    let mut decoder = Lzma2Decoder::new(dict_size);
    decoder.decode(&mut cursor)
}

/// Encode data to LZMA2 format, using the default chunking configuration.
pub fn encode_lzma2(data: &[u8], level: LzmaLevel) -> Result<Vec<u8>> {
    let mut encoder = Lzma2Encoder::new(level);
    encoder.encode(data)
}

/// Encode data to LZMA2 format with a custom configuration.
pub fn encode_lzma2_with_config(data: &[u8], config: Lzma2Config) -> Result<Vec<u8>> {
    let mut encoder = Lzma2Encoder::with_config(config);
    encoder.encode(data)
}

/// Get dictionary size from an LZMA2 properties byte.
///
/// Formula (props 0..=39): `(2 | (props & 1)) << (props / 2 + 11)`.
/// Props value 40 is the spec-defined maximum and decodes to `0xFFFF_FFFF`
/// (not a sentinel — this is the literal dictionary size the format
/// assigns to that value). Values above 40 are invalid.
pub fn dict_size_from_props(props: u8) -> Result<u32> {
    if props > 40 {
        return Err(OxiArcError::invalid_header(format!(
            "invalid LZMA2 dictionary size property: {props}"
        )));
    }
    if props == 40 {
        return Ok(0xFFFF_FFFF);
    }
    let base = 2 | (props & 1);
    let shift = (props / 2) + 11;
    Ok((base as u32) << shift)
}

/// Encode dictionary size to an LZMA2 properties byte.
pub fn props_from_dict_size(dict_size: u32) -> u8 {
    // Find the smallest properties byte that gives at least dict_size.
    for props in 0..=40 {
        if dict_size_from_props(props).is_ok_and(|size| size >= dict_size) {
            return props;
        }
    }
    40 // Max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_byte_constants() {
        assert_eq!(control::EOS, 0x00);
        assert_eq!(control::UNCOMPRESSED_RESET, 0x01);
        assert_eq!(control::UNCOMPRESSED, 0x02);
        assert_eq!(control::LZMA_MASK, 0x80);
        assert_eq!(control::DICT_RESET, 0x20);
        assert_eq!(control::STATE_RESET, 0x40);
    }

    #[test]
    fn test_control_byte_building() {
        assert_eq!(control::build_lzma(0, false, false), 0x80);
        assert_eq!(control::build_lzma(0, true, false), 0xA0);
        assert_eq!(control::build_lzma(0, false, true), 0xC0);
        assert_eq!(control::build_lzma(0, true, true), 0xE0);
        assert_eq!(control::build_lzma(0x1F, true, true), 0xFF);
    }

    #[test]
    fn test_chunk_type_parsing() {
        assert_eq!(ChunkType::from_control_byte(0x00), ChunkType::EndOfStream);
        assert_eq!(
            ChunkType::from_control_byte(0x01),
            ChunkType::Uncompressed { reset_dict: true }
        );
        assert_eq!(
            ChunkType::from_control_byte(0xE0),
            ChunkType::Lzma {
                reset_dict: true,
                reset_state: true
            }
        );
    }

    #[test]
    fn test_dict_size_props() {
        assert_eq!(dict_size_from_props(0).unwrap(), 2 << 11); // 4 KB
        assert_eq!(dict_size_from_props(1).unwrap(), 3 << 11); // 6 KB
        assert_eq!(dict_size_from_props(2).unwrap(), 2 << 12); // 8 KB
        assert_eq!(dict_size_from_props(3).unwrap(), 3 << 12); // 12 KB
        assert_eq!(dict_size_from_props(14).unwrap(), 2 << 18); // 512 KB
        assert_eq!(dict_size_from_props(15).unwrap(), 3 << 18); // 768 KB
        assert_eq!(dict_size_from_props(40).unwrap(), 0xFFFF_FFFF);
        assert!(dict_size_from_props(41).is_err());
    }

    #[test]
    fn test_props_roundtrip() {
        for size in [4096, 8192, 65536, 1 << 20, 1 << 24] {
            let props = props_from_dict_size(size);
            let decoded = dict_size_from_props(props).unwrap();
            assert!(
                decoded >= size,
                "props {} gave {} < {}",
                props,
                decoded,
                size
            );
        }
    }

    #[test]
    fn test_lzma2_empty() {
        let original: &[u8] = b"";
        let encoded = encode_lzma2(original, LzmaLevel::DEFAULT).unwrap();
        assert_eq!(encoded, vec![0x00]);
    }

    #[test]
    fn test_lzma2_uncompressed_roundtrip() {
        let original = b"ABCD";
        let encoded = encode_lzma2(original, LzmaLevel::FAST).unwrap();
        let decoded = decode_lzma2(&encoded, 4096).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_lzma2_compressed_roundtrip() {
        let original: Vec<u8> = vec![b'A'; 1000];
        let encoded = encode_lzma2(&original, LzmaLevel::DEFAULT).unwrap();
        let decoded = decode_lzma2(&encoded, 1 << 20).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_chunked_compressible_data() {
        let original: Vec<u8> = vec![b'A'; 10000];
        let encoded = encode_lzma2(&original, LzmaLevel::DEFAULT).expect("encode failed");
        let decoded = decode_lzma2(&encoded, 1 << 20).expect("decode failed");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_chunked_with_small_chunk_size() {
        let original: Vec<u8> = vec![b'B'; 50_000];
        let config = Lzma2Config::with_level(LzmaLevel::DEFAULT).chunk_size(8 * 1024);
        let encoded = encode_lzma2_with_config(&original, config).expect("encode failed");
        let decoded = decode_lzma2(&encoded, 1 << 20).expect("decode failed");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_chunked_various_sizes() {
        for size in [1, 10, 100, 1000, 10000] {
            let original: Vec<u8> = vec![b'X'; size];
            let encoded = encode_lzma2(&original, LzmaLevel::FAST).expect("encode failed");
            let decoded = decode_lzma2(&encoded, 1 << 20).expect("decode failed");
            assert_eq!(
                decoded,
                original,
                "failed for size {size} - decoded len: {}",
                decoded.len()
            );
        }
    }

    #[test]
    fn test_chunked_mixed_patterns() {
        let original: Vec<u8> = vec![b'M'; 30_000];
        let config = Lzma2Config::with_level(LzmaLevel::DEFAULT).chunk_size(4 * 1024);
        let encoded = encode_lzma2_with_config(&original, config).expect("encode failed");
        let decoded = decode_lzma2(&encoded, 1 << 20).expect("decode failed");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encoder_property_change() {
        let original: Vec<u8> = vec![b'Z'; 20_000];
        let mut encoder = Lzma2Encoder::new(LzmaLevel::DEFAULT);

        let new_props = LzmaProperties::new(2, 1, 2);
        encoder.set_properties(new_props);

        let encoded = encoder.encode(&original).expect("encode failed");
        let decoded = decode_lzma2(&encoded, 1 << 20).expect("decode failed");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_lzma2_chunk_max_uncompressed_size_boundary() {
        // The format's own control byte only has room for a 21-bit
        // (uncompressed_size - 1) field, so exactly 2 MiB is the largest
        // value a single top-level chunk may ever declare; requesting a
        // chunk size at that exact limit must be honored unclamped...
        let at_max = Lzma2Config::with_level(LzmaLevel::FAST).chunk_size(LZMA_CHUNK_MAX_UNCOMPRESSED);
        assert_eq!(at_max.chunk_size, LZMA_CHUNK_MAX_UNCOMPRESSED);

        // ...while one byte past it must be rejected by clamping down to
        // the max rather than ever being handed to the chunk writer, which
        // would otherwise overflow the 5-bit/16-bit size-high/size-low split.
        let over_max = Lzma2Config::with_level(LzmaLevel::FAST).chunk_size(LZMA_CHUNK_MAX_UNCOMPRESSED + 1);
        assert_eq!(over_max.chunk_size, LZMA_CHUNK_MAX_UNCOMPRESSED);

        // Drive data of exactly that size through the encoder and back; the
        // top-level chunking loop must treat it as a single chunk request
        // (it never sees a remaining-length large enough to split twice),
        // whatever further sub-chunking the 64 KiB compressed-size cap forces.
        let data_at_max: Vec<u8> = (0..LZMA_CHUNK_MAX_UNCOMPRESSED).map(|i| (i % 251) as u8).collect();
        let encoded_at_max = encode_lzma2_with_config(&data_at_max, at_max).expect("encode failed");
        let decoded_at_max = decode_lzma2(&encoded_at_max, 1 << 22).expect("decode failed");
        assert_eq!(decoded_at_max, data_at_max);

        // One byte over the boundary must force a second top-level chunk
        // rather than ever emitting a chunk whose declared size exceeds
        // the format's 2 MiB ceiling.
        let data_over_max: Vec<u8> =
            (0..LZMA_CHUNK_MAX_UNCOMPRESSED + 1).map(|i| (i % 251) as u8).collect();
        let encoded_over_max =
            encode_lzma2_with_config(&data_over_max, over_max).expect("encode failed");
        let decoded_over_max = decode_lzma2(&encoded_over_max, 1 << 22).expect("decode failed");
        assert_eq!(decoded_over_max, data_over_max);
    }

    #[test]
    fn test_chunk_splits_large_input() {
        // Input larger than one chunk must round-trip across multiple chunks,
        // including a dictionary reset only on the first one.
        let original: Vec<u8> = (0..300_000).map(|i| (i % 251) as u8).collect();
        let config = Lzma2Config::with_level(LzmaLevel::FAST).chunk_size(64 * 1024);
        let encoded = encode_lzma2_with_config(&original, config).expect("encode failed");
        assert!(encoded.len() > 1);
        let decoded = decode_lzma2(&encoded, 1 << 20).expect("decode failed");
        assert_eq!(decoded, original);
    }
}
