//! # OxiArc XZ
//!
//! The `.xz` stream container: variable-length integers, BCJ/Delta filter
//! chains, and block/index/footer framing around the `oxiarc-lzma` LZMA2
//! coder.
//!
//! ## Usage
//!
//! ```ignore
//! use oxiarc_xz::{compress, decompress, XzOptions};
//!
//! let data = b"Hello, World!";
//! let xz = compress(data, &XzOptions::default())?;
//! let back = decompress(&xz)?;
//! assert_eq!(back, data);
//! ```
//!
//! ## Format
//!
//! A stream is `header | block... | index | footer`, each block framed
//! with its own header (filter chain, optional declared sizes), a
//! filtered+compressed payload padded to a 4-byte boundary, and an
//! integrity check of the uncompressed data. See [`stream`] for the full
//! encode/decode implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod check;
pub mod filters;
pub mod options;
pub mod stream;
pub mod vli;

pub use check::CheckType;
pub use filters::bcj::{Bcj, BcjArch};
pub use filters::delta::Delta;
pub use filters::Filter;
pub use options::XzOptions;
use oxiarc_core::error::Result;

/// Compress `data` into a single-stream, single-block XZ container.
pub fn compress(data: &[u8], options: &XzOptions) -> Result<Vec<u8>> {
    options.validate()?;
    stream::compress(data, options.check, &options.pre_filters, options.level)
}

/// Compress `chunks` into a multi-block XZ stream, one block per chunk.
pub fn compress_blocks(chunks: &[&[u8]], options: &XzOptions) -> Result<Vec<u8>> {
    options.validate()?;
    stream::compress_blocks(
        chunks,
        options.check,
        &options.pre_filters,
        options.level,
        options.include_block_sizes,
    )
}

/// Decompress the first stream in `data`.
///
/// If multiple streams are concatenated with zero-padding, only the first
/// is returned; use [`decompress_one`] to iterate over all of them.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    stream::decompress(data)
}

/// Decompress the first stream in `data`, also returning how many bytes
/// (including trailing stream padding) it occupied.
pub fn decompress_one(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    stream::decompress_one(data)
}

/// Decompress every concatenated stream in `data`, returning their outputs joined.
pub fn decompress_all(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let (chunk, consumed) = stream::decompress_one(&data[pos..])?;
        out.extend_from_slice(&chunk);
        if consumed == 0 {
            break;
        }
        pos += consumed;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_round_trip() {
        let data = b"Hello, World! This exercises the default XZ options end to end.";
        let out = compress(data, &XzOptions::default()).unwrap();
        let back = decompress(&out).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn decompress_all_joins_concatenated_streams() {
        let opts = XzOptions::with_level(1);
        let s1 = compress(b"first", &opts).unwrap();
        let s2 = compress(b"second", &opts).unwrap();
        let mut combined = s1;
        combined.extend_from_slice(&s2);
        let out = decompress_all(&combined).unwrap();
        assert_eq!(out, b"firstsecond");
    }

    #[test]
    fn bcj_and_delta_can_be_combined() {
        use filters::bcj::{Bcj, BcjArch};
        use filters::delta::Delta;
        let opts = XzOptions::with_level(3).pre_filters(vec![
            Filter::Delta(Delta::new(2).unwrap()),
            Filter::Bcj(Bcj::new(BcjArch::X86, 0)),
        ]);
        let mut data = Vec::new();
        for i in 0..40u8 {
            data.extend_from_slice(&[0xE8, i, 0, 0, 0]);
        }
        let out = compress(&data, &opts).unwrap();
        let back = decompress(&out).unwrap();
        assert_eq!(back, data);
    }
}
