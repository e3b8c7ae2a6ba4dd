//! XZ file format reader/writer.
//!
//! Thin adapter over [`oxiarc_xz`] (the full stream container: header/footer
//! framing, filter chains, index, multi-stream support) exposing the
//! `Read`/`Write`-oriented `XzReader`/`XzWriter` shape this crate's other
//! format modules use.
//!
//! Based on the XZ file format specification:
//! <https://tukaani.org/xz/xz-file-format.txt>

use oxiarc_core::error::Result;
use oxiarc_lzma::LzmaLevel;
use oxiarc_xz::{CheckType, XzOptions};
use std::io::{Read, Write};

/// XZ magic bytes: 0xFD, '7', 'z', 'X', 'Z', 0x00
pub const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// XZ footer magic bytes: 'Y', 'Z'
pub const XZ_FOOTER_MAGIC: [u8; 2] = [0x59, 0x5A];

/// XZ reader for decompressing XZ streams.
///
/// Buffers the whole underlying reader since [`oxiarc_xz::decompress`]
/// operates on a complete byte slice; only a single concatenated stream
/// is consumed (the container's own multi-stream support is left to
/// direct `oxiarc_xz` callers that want it).
pub struct XzReader<R: Read> {
    reader: R,
}

impl<R: Read> XzReader<R> {
    /// Create a new XZ reader. Header validation happens on [`Self::decompress`].
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self { reader })
    }

    /// Decompress the XZ stream.
    pub fn decompress(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        oxiarc_xz::decompress(&buf)
    }
}

/// XZ writer for creating XZ compressed files.
pub struct XzWriter {
    level: LzmaLevel,
    check_type: CheckType,
}

impl XzWriter {
    /// Create a new XZ writer at the given LZMA2 level (default check: CRC64).
    pub fn new(level: LzmaLevel) -> Self {
        Self { level, check_type: CheckType::Crc64 }
    }

    /// Set the check type.
    #[must_use]
    pub fn with_check_type(mut self, check_type: CheckType) -> Self {
        self.check_type = check_type;
        self
    }

    /// Compress data to a single-stream, single-block XZ container.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let opts = XzOptions::with_level(self.level.level()).check(self.check_type);
        oxiarc_xz::compress(data, &opts)
    }
}

/// Decompress XZ data from a reader.
pub fn decompress<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    oxiarc_xz::decompress(&buf)
}

/// Compress data to XZ format at the given LZMA2 level (CRC64 check).
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    XzWriter::new(LzmaLevel::new(level)).compress(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompress_slice(data: &[u8]) -> Result<Vec<u8>> {
        decompress(&mut std::io::Cursor::new(data))
    }

    #[test]
    fn xz_magic_matches_the_container_format() {
        assert_eq!(XZ_MAGIC, [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]);
        assert_eq!(XZ_FOOTER_MAGIC, [0x59, 0x5A]);
    }

    #[test]
    fn xz_roundtrip_empty() {
        let original: Vec<u8> = vec![];
        let compressed = compress(&original, 6).unwrap();
        assert_eq!(&compressed[0..6], XZ_MAGIC);
        let decompressed = decompress_slice(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn xz_roundtrip_hello() {
        let original = b"Hello, World!";
        let compressed = compress(original, 6).unwrap();
        assert_eq!(&compressed[0..6], XZ_MAGIC);
        let decompressed = decompress_slice(&compressed).unwrap();
        assert_eq!(&decompressed, original);
    }

    #[test]
    fn xz_roundtrip_single_byte() {
        let original = [0x42u8];
        let compressed = compress(&original, 6).unwrap();
        let decompressed = decompress_slice(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn xz_roundtrip_repeated_pattern() {
        let original: Vec<u8> = (0..1000).map(|_| b'A').collect();
        let compressed = compress(&original, 6).unwrap();
        assert!(compressed.len() < original.len());
        let decompressed = decompress_slice(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn xz_roundtrip_with_sha256_check() {
        let original = b"exercise the SHA-256 check path end to end";
        let compressed = XzWriter::new(LzmaLevel::new(6)).with_check_type(CheckType::Sha256).compress(original).unwrap();
        let decompressed = decompress_slice(&compressed).unwrap();
        assert_eq!(&decompressed, original);
    }
}
