//! Filter chain: the BCJ and delta preprocessors that may sit in front of
//! the LZMA2 coder inside an XZ block.

pub mod bcj;
pub mod delta;

use bcj::{Bcj, BcjArch};
use delta::Delta;
use oxiarc_core::error::{OxiArcError, Result};

/// LZMA2 filter ID, always last in a chain.
pub const FILTER_ID_LZMA2: u64 = 0x21;
/// Delta filter ID.
pub const FILTER_ID_DELTA: u64 = 0x03;

/// Maximum number of filters (including the terminal LZMA2 coder) in one chain.
pub const MAX_FILTERS: usize = 4;

/// One entry in a block's filter chain, fully resolved from its ID and properties.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Byte-wise delta preprocessor.
    Delta(Delta),
    /// A BCJ executable-branch preprocessor.
    Bcj(Bcj),
}

impl Filter {
    /// Resolve a filter from its XZ filter ID and raw properties bytes.
    pub fn from_id_and_properties(id: u64, props: &[u8]) -> Result<Self> {
        if id == FILTER_ID_DELTA {
            if props.len() != 1 {
                return Err(OxiArcError::format_error(
                    None,
                    format!("delta filter properties must be 1 byte, got {}", props.len()),
                ));
            }
            return Ok(Filter::Delta(Delta::from_property_byte(props[0])));
        }
        if let Some(arch) = BcjArch::from_filter_id(id) {
            return Ok(Filter::Bcj(Bcj::from_properties(arch, props)?));
        }
        Err(OxiArcError::format_error(
            None,
            format!("unrecognized filter id {id:#x}"),
        ))
    }

    /// XZ filter ID for this filter.
    pub fn id(&self) -> u64 {
        match self {
            Filter::Delta(_) => FILTER_ID_DELTA,
            Filter::Bcj(bcj) => bcj.arch().filter_id(),
        }
    }

    /// Serialized properties bytes for this filter.
    pub fn properties(&self) -> Vec<u8> {
        match self {
            Filter::Delta(d) => vec![d.property_byte()],
            Filter::Bcj(bcj) => bcj.properties(),
        }
    }

    /// Apply this filter's forward (encode) transform in place.
    pub fn encode(&mut self, buf: &mut [u8]) {
        match self {
            Filter::Delta(d) => d.encode(buf),
            Filter::Bcj(bcj) => bcj.encode(buf),
        }
    }

    /// Apply this filter's inverse (decode) transform in place.
    pub fn decode(&mut self, buf: &mut [u8]) {
        match self {
            Filter::Delta(d) => d.decode(buf),
            Filter::Bcj(bcj) => bcj.decode(buf),
        }
    }
}

/// Run a full filter chain forward over `buf`, in the order filters are
/// listed (the order they'd appear before the terminal LZMA2 coder).
pub fn encode_chain(filters: &mut [Filter], buf: &mut [u8]) {
    for f in filters.iter_mut() {
        f.encode(buf);
    }
}

/// Undo a full filter chain: filters are applied in reverse of encode order.
pub fn decode_chain(filters: &mut [Filter], buf: &mut [u8]) {
    for f in filters.iter_mut().rev() {
        f.decode(buf);
    }
}

/// Validate a filter-id chain against XZ's structural rules: at most
/// [`MAX_FILTERS`] entries, and the last one must be LZMA2.
pub fn validate_chain_ids(ids: &[u64]) -> Result<()> {
    if ids.is_empty() || ids.len() > MAX_FILTERS {
        return Err(OxiArcError::format_error(
            None,
            format!("filter chain must have 1..={MAX_FILTERS} entries, got {}", ids.len()),
        ));
    }
    if *ids.last().unwrap() != FILTER_ID_LZMA2 {
        return Err(OxiArcError::format_error(
            None,
            "filter chain must end with the LZMA2 filter",
        ));
    }
    for &id in &ids[..ids.len() - 1] {
        if id == FILTER_ID_LZMA2 {
            return Err(OxiArcError::format_error(
                None,
                "LZMA2 filter may only appear last in the chain",
            ));
        }
    }
    Ok(())
}
