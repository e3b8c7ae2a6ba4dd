//! Encoder-facing option surface for the XZ container, mirroring the
//! clamp-on-construction style of [`oxiarc_core::traits::CompressionLevel`].

use crate::check::CheckType;
use crate::filters::{self, Filter, FILTER_ID_LZMA2};
use oxiarc_core::error::Result;
use oxiarc_lzma::LzmaLevel;

/// Options controlling how [`crate::compress`] builds a stream.
#[derive(Debug, Clone)]
pub struct XzOptions {
    /// LZMA2 compression level (0..9, default 5 per the recognized-options table).
    pub level: LzmaLevel,
    /// Integrity check applied to each block (default CRC64).
    pub check: CheckType,
    /// Pre-filters applied before LZMA2 (Delta and/or one BCJ filter), at most 3.
    pub pre_filters: Vec<Filter>,
    /// Whether block headers should record compressed/uncompressed sizes up front.
    pub include_block_sizes: bool,
}

impl Default for XzOptions {
    fn default() -> Self {
        Self {
            level: LzmaLevel::new(5),
            check: CheckType::Crc64,
            pre_filters: Vec::new(),
            include_block_sizes: false,
        }
    }
}

impl XzOptions {
    /// Start from defaults with the given compression level.
    pub fn with_level(level: u8) -> Self {
        Self { level: LzmaLevel::new(level), ..Self::default() }
    }

    /// Set the integrity check type.
    #[must_use]
    pub fn check(mut self, check: CheckType) -> Self {
        self.check = check;
        self
    }

    /// Set the pre-filter chain (not including the terminal LZMA2 coder).
    #[must_use]
    pub fn pre_filters(mut self, filters: Vec<Filter>) -> Self {
        self.pre_filters = filters;
        self
    }

    /// Enable recording compressed/uncompressed sizes in block headers.
    #[must_use]
    pub fn include_block_sizes(mut self, yes: bool) -> Self {
        self.include_block_sizes = yes;
        self
    }

    /// Validate the option set (filter chain length, id uniqueness of the
    /// LZMA2 terminator) before it's handed to the stream encoder.
    pub fn validate(&self) -> Result<()> {
        let mut ids: Vec<u64> = self.pre_filters.iter().map(|f| f.id()).collect();
        ids.push(FILTER_ID_LZMA2);
        filters::validate_chain_ids(&ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recognized_options() {
        let opts = XzOptions::default();
        assert_eq!(opts.level.level(), 5);
        assert_eq!(opts.check, CheckType::Crc64);
        assert!(opts.pre_filters.is_empty());
        assert!(!opts.include_block_sizes);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn too_many_pre_filters_fails_validation() {
        use crate::filters::delta::Delta;
        let opts = XzOptions::default().pre_filters(vec![
            Filter::Delta(Delta::new(1).unwrap()),
            Filter::Delta(Delta::new(2).unwrap()),
            Filter::Delta(Delta::new(3).unwrap()),
            Filter::Delta(Delta::new(4).unwrap()),
        ]);
        assert!(opts.validate().is_err());
    }
}
