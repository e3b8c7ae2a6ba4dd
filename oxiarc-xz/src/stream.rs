//! XZ stream container: header, blocks, index, and footer framing.
//!
//! Layout (see the format's own terminology): `header | block... | index |
//! footer`, optionally followed by zero-padding and another concatenated
//! stream. Every block carries its own header, filtered+compressed
//! payload, zero padding to a 4-byte boundary, and an integrity check of
//! the uncompressed data. The index records `(unpadded_size,
//! uncompressed_size)` for every block so the stream can be parsed
//! without decompressing it, and the footer lets a reader locate the
//! index by walking backward from EOF.

use crate::check::CheckType;
use crate::filters::{self, Filter, FILTER_ID_LZMA2, MAX_FILTERS};
use crate::vli::{decode_vli, encode_vli, VLI_MAX};
use log::{debug, warn};
use oxiarc_core::crc::Crc32;
use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_lzma::lzma2::{dict_size_from_props, props_from_dict_size, Lzma2Config, Lzma2Decoder, Lzma2Encoder};
use oxiarc_lzma::LzmaLevel;

const STREAM_HEADER_MAGIC: [u8; 6] = [0xFD, b'7', b'z', b'X', b'Z', 0x00];
const STREAM_FOOTER_MAGIC: [u8; 2] = [0x59, 0x5A];
const INDEX_INDICATOR: u8 = 0x00;

/// One entry in a filter chain's ID/properties list, as it appears on the wire.
#[derive(Debug, Clone)]
struct FilterEntry {
    id: u64,
    properties: Vec<u8>,
}

/// A fully decoded block: its pre-LZMA2 filter chain plus the decompressed payload.
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    /// Decompressed (and un-filtered) block content.
    pub data: Vec<u8>,
}

struct BlockRecord {
    unpadded_size: u64,
    uncompressed_size: u64,
}

/// Encode `data` as a single-stream, single-block XZ container.
pub fn compress(data: &[u8], check: CheckType, pre_filters: &[Filter], level: LzmaLevel) -> Result<Vec<u8>> {
    compress_blocks(&[data], check, pre_filters, level, true)
}

/// Encode `chunks` as a multi-block XZ stream, one block per chunk.
///
/// `include_block_sizes` controls whether each block header records its
/// compressed/uncompressed sizes up front (required for efficient seeking,
/// optional otherwise).
pub fn compress_blocks(
    chunks: &[&[u8]],
    check: CheckType,
    pre_filters: &[Filter],
    level: LzmaLevel,
    include_block_sizes: bool,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&STREAM_HEADER_MAGIC);
    let flags = [0x00u8, check.flags_nibble()];
    out.extend_from_slice(&flags);
    out.extend_from_slice(&Crc32::compute(&flags).to_le_bytes());

    let dict_size = level.dict_size();
    let mut filter_ids: Vec<u64> = pre_filters.iter().map(|f| f.id()).collect();
    filter_ids.push(FILTER_ID_LZMA2);
    filters::validate_chain_ids(&filter_ids)?;

    let mut records = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let mut filtered = chunk.to_vec();
        let mut encode_filters: Vec<Filter> = pre_filters.to_vec();
        filters::encode_chain(&mut encode_filters, &mut filtered);

        let mut lzma2 = Lzma2Encoder::with_config(Lzma2Config::with_level(level).dict_size(dict_size));
        let compressed = lzma2.encode(&filtered)?;

        let entries: Vec<FilterEntry> = pre_filters
            .iter()
            .map(|f| FilterEntry { id: f.id(), properties: f.properties() })
            .chain(std::iter::once(FilterEntry {
                id: FILTER_ID_LZMA2,
                properties: vec![props_from_dict_size(dict_size)],
            }))
            .collect();

        let block_header = encode_block_header(
            &entries,
            include_block_sizes.then_some(compressed.len() as u64),
            include_block_sizes.then_some(chunk.len() as u64),
        )?;

        let check_digest = check.digest(chunk);

        let mut block_bytes = Vec::new();
        block_bytes.extend_from_slice(&block_header);
        block_bytes.extend_from_slice(&compressed);
        // Padding is computed against header+compressed only (the check is
        // appended after padding, not included in the 4-byte alignment).
        let pre_check_len = block_header.len() + compressed.len();
        let pad = (4 - (pre_check_len % 4)) % 4;
        block_bytes.resize(pre_check_len + pad, 0);
        block_bytes.extend_from_slice(&check_digest);

        out.extend_from_slice(&block_bytes);

        records.push(BlockRecord {
            unpadded_size: (block_header.len() + compressed.len() + check_digest.len()) as u64,
            uncompressed_size: chunk.len() as u64,
        });
    }

    debug!("encoded {} block(s), {} byte(s) total payload", records.len(), out.len());

    let index = encode_index(&records);
    out.extend_from_slice(&index);

    let backward_size = (index.len() / 4) as u32 - 1;
    let mut footer_tail = Vec::with_capacity(6);
    footer_tail.extend_from_slice(&backward_size.to_le_bytes());
    footer_tail.extend_from_slice(&flags);
    out.extend_from_slice(&Crc32::compute(&footer_tail).to_le_bytes());
    out.extend_from_slice(&footer_tail);
    out.extend_from_slice(&STREAM_FOOTER_MAGIC);

    Ok(out)
}

fn encode_block_header(
    entries: &[FilterEntry],
    compressed_size: Option<u64>,
    uncompressed_size: Option<u64>,
) -> Result<Vec<u8>> {
    if entries.is_empty() || entries.len() > MAX_FILTERS {
        return Err(OxiArcError::format_error(None, "filter chain length out of range"));
    }

    let mut body = Vec::new();
    let mut flags = (entries.len() as u8 - 1) & 0x03;
    if compressed_size.is_some() {
        flags |= 0x40;
    }
    if uncompressed_size.is_some() {
        flags |= 0x80;
    }
    body.push(flags);

    if let Some(size) = compressed_size {
        encode_vli(size, &mut body);
    }
    if let Some(size) = uncompressed_size {
        encode_vli(size, &mut body);
    }

    for entry in entries {
        encode_vli(entry.id, &mut body);
        encode_vli(entry.properties.len() as u64, &mut body);
        body.extend_from_slice(&entry.properties);
    }

    // Total header length (size byte + body + padding + CRC32) must be a
    // multiple of 4; the size byte itself encodes `total/4 - 1`.
    let content_before_crc = 1 + body.len();
    let total_len = (content_before_crc + 4).div_ceil(4) * 4;

    let mut header = vec![0u8]; // placeholder for size byte
    header.extend_from_slice(&body);
    header.resize(total_len - 4, 0);
    header[0] = (total_len / 4 - 1) as u8;

    let mut framed = header.clone();
    let crc = Crc32::compute(&header);
    framed.extend_from_slice(&crc.to_le_bytes());
    Ok(framed)
}

fn encode_index(records: &[BlockRecord]) -> Vec<u8> {
    let mut body = vec![INDEX_INDICATOR];
    encode_vli(records.len() as u64, &mut body);
    for r in records {
        encode_vli(r.unpadded_size, &mut body);
        encode_vli(r.uncompressed_size, &mut body);
    }
    let pad = (4 - (body.len() % 4)) % 4;
    body.resize(body.len() + pad, 0);
    let crc = Crc32::compute(&body);
    body.extend_from_slice(&crc.to_le_bytes());
    body
}

/// Decode the first stream in `data`, returning its decompressed content.
///
/// If multiple streams are concatenated (separated by zero-padding), only
/// the first is decoded; callers that want every stream should advance
/// past the returned consumed length and call again.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let (out, _) = decompress_one(data)?;
    Ok(out)
}

/// Decode the first stream in `data`, returning its content and the number
/// of bytes consumed (including any trailing stream padding that was
/// validated as part of delimiting this stream).
pub fn decompress_one(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    if data.len() < 12 {
        return Err(OxiArcError::format_error(None, "stream too short for header"));
    }
    if data[0..6] != STREAM_HEADER_MAGIC {
        return Err(OxiArcError::format_error(Some(0), "bad stream header magic"));
    }
    let flags = [data[6], data[7]];
    if flags[0] != 0 || flags[1] & 0xF0 != 0 {
        return Err(OxiArcError::format_error(Some(6), "reserved stream flags bits set"));
    }
    let check = CheckType::from_flags_nibble(flags[1] & 0x0F)?;
    let stored_crc = u32::from_le_bytes(data[8..12].try_into().unwrap());
    if Crc32::compute(&flags) != stored_crc {
        return Err(OxiArcError::format_error(Some(8), "stream header CRC32 mismatch"));
    }

    let mut pos = 12usize;
    let mut out = Vec::new();
    let mut records = Vec::new();

    while pos < data.len() && data[pos] != INDEX_INDICATOR {
        let (block_data, block_record, consumed) = decode_block(&data[pos..], check)?;
        out.extend_from_slice(&block_data);
        records.push(block_record);
        pos += consumed;
    }

    if pos >= data.len() {
        return Err(OxiArcError::format_error(Some(pos as u64), "missing index indicator"));
    }

    let index_start = pos;
    let (index_records, index_len) = decode_index(&data[pos..])?;
    pos += index_len;

    if index_records.len() != records.len() {
        return Err(OxiArcError::format_error(
            Some(index_start as u64),
            "index record count does not match block count",
        ));
    }
    for (parsed, actual) in index_records.iter().zip(records.iter()) {
        if parsed.unpadded_size != actual.unpadded_size || parsed.uncompressed_size != actual.uncompressed_size {
            return Err(OxiArcError::format_error(
                Some(index_start as u64),
                "index record does not match the block it describes",
            ));
        }
    }

    if pos + 12 > data.len() {
        return Err(OxiArcError::format_error(Some(pos as u64), "stream too short for footer"));
    }
    let footer_crc = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
    let backward_size_raw = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().unwrap());
    let footer_flags = [data[pos + 8], data[pos + 9]];
    let footer_tail = &data[pos + 4..pos + 10];
    if Crc32::compute(footer_tail) != footer_crc {
        return Err(OxiArcError::format_error(Some(pos as u64), "stream footer CRC32 mismatch"));
    }
    if footer_flags != flags {
        return Err(OxiArcError::format_error(
            Some(pos as u64),
            "stream footer flags do not match header flags",
        ));
    }
    let backward_size = (backward_size_raw as u64 + 1) * 4;
    if backward_size != index_len as u64 {
        return Err(OxiArcError::format_error(
            Some(pos as u64),
            "stream footer backward-size does not match the actual index length",
        ));
    }
    if data[pos + 10..pos + 12] != STREAM_FOOTER_MAGIC {
        return Err(OxiArcError::format_error(Some(pos as u64), "bad stream footer magic"));
    }
    pos += 12;

    // Optional stream padding (multiples of 4 zero bytes) before EOF or the next stream.
    while pos < data.len() && data[pos] == 0 && pos + 4 <= data.len() && data[pos..pos + 4] == [0, 0, 0, 0] {
        pos += 4;
    }

    Ok((out, pos))
}

fn decode_block(data: &[u8], check: CheckType) -> Result<(Vec<u8>, BlockRecord, usize)> {
    if data.is_empty() {
        return Err(OxiArcError::format_error(None, "truncated block header"));
    }
    let header_size = (data[0] as usize + 1) * 4;
    if header_size > data.len() {
        return Err(OxiArcError::format_error(None, "block header exceeds available data"));
    }
    let header = &data[..header_size];
    let stored_crc = u32::from_le_bytes(header[header_size - 4..header_size].try_into().unwrap());
    if Crc32::compute(&header[..header_size - 4]) != stored_crc {
        warn!("block header CRC32 mismatch, header_size={header_size}");
        return Err(OxiArcError::format_error(None, "block header CRC32 mismatch"));
    }

    let flags = header[1];
    let num_filters = (flags & 0x03) as usize + 1;
    let has_compressed_size = flags & 0x40 != 0;
    let has_uncompressed_size = flags & 0x80 != 0;
    if flags & 0x3C != 0 {
        return Err(OxiArcError::format_error(None, "reserved block flags bits set"));
    }

    let mut cursor = 2usize;
    let compressed_size = if has_compressed_size {
        let (v, n) = decode_vli(&header[cursor..])?;
        cursor += n;
        Some(v)
    } else {
        None
    };
    let uncompressed_size = if has_uncompressed_size {
        let (v, n) = decode_vli(&header[cursor..])?;
        cursor += n;
        Some(v)
    } else {
        None
    };

    let mut entries = Vec::with_capacity(num_filters);
    for _ in 0..num_filters {
        let (id, n) = decode_vli(&header[cursor..])?;
        cursor += n;
        let (prop_len, n) = decode_vli(&header[cursor..])?;
        cursor += n;
        let prop_len = prop_len as usize;
        if cursor + prop_len > header.len() - 4 {
            return Err(OxiArcError::format_error(None, "filter properties exceed block header"));
        }
        entries.push(FilterEntry { id, properties: header[cursor..cursor + prop_len].to_vec() });
        cursor += prop_len;
    }
    if header[cursor..header_size - 4].iter().any(|&b| b != 0) {
        return Err(OxiArcError::format_error(None, "non-zero block header padding"));
    }

    let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
    filters::validate_chain_ids(&ids)?;

    let mut pre_filters = Vec::with_capacity(entries.len() - 1);
    for entry in &entries[..entries.len() - 1] {
        pre_filters.push(Filter::from_id_and_properties(entry.id, &entry.properties)?);
    }
    let lzma2_entry = entries.last().unwrap();
    if lzma2_entry.properties.len() != 1 {
        return Err(OxiArcError::format_error(None, "LZMA2 filter properties must be 1 byte"));
    }
    let dict_size = dict_size_from_props(lzma2_entry.properties[0])?;

    let payload_start = header_size;
    let payload_len = if let Some(n) = compressed_size {
        n as usize
    } else {
        // No declared size: the LZMA2 decoder itself reports how much it consumed.
        data.len() - payload_start
    };
    if payload_start + payload_len > data.len() {
        return Err(OxiArcError::format_error(None, "block payload exceeds available data"));
    }
    let payload = &data[payload_start..payload_start + payload_len];

    let mut decoder = Lzma2Decoder::new(dict_size);
    let mut cursor_reader = std::io::Cursor::new(payload);
    let mut filtered = decoder.decode(&mut cursor_reader)?;
    let consumed_compressed = cursor_reader.position() as usize;
    let actual_compressed_len = if compressed_size.is_some() { payload_len } else { consumed_compressed };

    let mut decode_filters = pre_filters.clone();
    filters::decode_chain(&mut decode_filters, &mut filtered);

    if let Some(expected) = uncompressed_size {
        if expected as usize != filtered.len() {
            return Err(OxiArcError::decompression_error(
                None,
                "block uncompressed size disagrees with declared value",
            ));
        }
    }

    let pre_check_len = header_size + actual_compressed_len;
    let pad = (4 - (pre_check_len % 4)) % 4;
    let check_start = pre_check_len + pad;
    let check_len = check.digest_len();
    if check_start + check_len > data.len() {
        return Err(OxiArcError::format_error(None, "truncated block check value"));
    }
    if data[pre_check_len..check_start].iter().any(|&b| b != 0) {
        return Err(OxiArcError::format_error(None, "non-zero block padding"));
    }
    check.verify(&filtered, &data[check_start..check_start + check_len])?;

    let unpadded_size = (header_size + actual_compressed_len + check_len) as u64;
    let record = BlockRecord { unpadded_size, uncompressed_size: filtered.len() as u64 };
    let consumed = check_start + check_len;

    Ok((filtered, record, consumed))
}

fn decode_index(data: &[u8]) -> Result<(Vec<BlockRecord>, usize)> {
    if data.is_empty() || data[0] != INDEX_INDICATOR {
        return Err(OxiArcError::format_error(None, "expected index indicator"));
    }
    let (count, mut cursor) = decode_vli(&data[1..])?;
    cursor += 1;
    const MAX_REASONABLE_BLOCKS: u64 = 1 << 32;
    if count > MAX_REASONABLE_BLOCKS {
        return Err(OxiArcError::format_error(None, "index block count is absurdly large"));
    }

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (unpadded_size, n) = decode_vli(&data[cursor..])?;
        cursor += n;
        if unpadded_size < 5 || unpadded_size > VLI_MAX & !3 {
            return Err(OxiArcError::format_error(None, "index unpadded_size out of range"));
        }
        let (uncompressed_size, n) = decode_vli(&data[cursor..])?;
        cursor += n;
        if uncompressed_size > VLI_MAX {
            return Err(OxiArcError::format_error(None, "index uncompressed_size out of range"));
        }
        records.push(BlockRecord { unpadded_size, uncompressed_size });
    }

    let pad = (4 - (cursor % 4)) % 4;
    if cursor + pad + 4 > data.len() {
        return Err(OxiArcError::format_error(None, "truncated index"));
    }
    if data[cursor..cursor + pad].iter().any(|&b| b != 0) {
        return Err(OxiArcError::format_error(None, "non-zero index padding"));
    }
    let crc_start = cursor + pad;
    let stored_crc = u32::from_le_bytes(data[crc_start..crc_start + 4].try_into().unwrap());
    if Crc32::compute(&data[..crc_start]) != stored_crc {
        return Err(OxiArcError::format_error(None, "index CRC32 mismatch"));
    }

    Ok((records, crc_start + 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_round_trips() {
        let out = compress(b"", CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();
        let back = decompress(&out).unwrap();
        assert_eq!(back, b"");
    }

    #[test]
    fn small_input_round_trips_with_each_check_type() {
        let data = b"Hello, World!";
        for check in [CheckType::None, CheckType::Crc32, CheckType::Crc64, CheckType::Sha256] {
            let out = compress(data, check, &[], LzmaLevel::new(1)).unwrap();
            let back = decompress(&out).unwrap();
            assert_eq!(back, data, "check={check:?}");
        }
    }

    #[test]
    fn multi_block_round_trips() {
        let a = vec![b'A'; 100];
        let b = vec![b'B'; 200];
        let out = compress_blocks(&[&a, &b], CheckType::Crc64, &[], LzmaLevel::new(1), true).unwrap();
        let back = decompress(&out).unwrap();
        let mut expected = a.clone();
        expected.extend_from_slice(&b);
        assert_eq!(back, expected);
    }

    #[test]
    fn bcj_x86_plus_lzma2_round_trips() {
        use crate::filters::bcj::{Bcj, BcjArch};
        let mut data = Vec::new();
        for _ in 0..64 {
            data.extend_from_slice(&[0xE8, 0x00, 0x00, 0x00, 0x00]);
        }
        let pre_filters = vec![Filter::Bcj(Bcj::new(BcjArch::X86, 0))];
        let out = compress(&data, CheckType::Crc64, &pre_filters, LzmaLevel::new(6)).unwrap();
        let back = decompress(&out).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn concatenated_streams_decode_first_by_default() {
        let s1 = vec![b'A'; 100];
        let s2 = vec![b'B'; 100];
        let out1 = compress(&s1, CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();
        let out2 = compress(&s2, CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();

        let mut combined = out1.clone();
        combined.extend_from_slice(&[0u8; 4]);
        combined.extend_from_slice(&out2);

        let (first, consumed) = decompress_one(&combined).unwrap();
        assert_eq!(first, s1);

        let (second, _) = decompress_one(&combined[consumed..]).unwrap();
        assert_eq!(second, s2);
    }

    #[test]
    fn non_zero_byte_between_streams_is_rejected() {
        let s1 = vec![b'A'; 50];
        let s2 = vec![b'B'; 50];
        let out1 = compress(&s1, CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();
        let out2 = compress(&s2, CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();
        let mut combined = out1;
        combined.push(0x01);
        combined.extend_from_slice(&out2);

        // The first stream itself still parses fine...
        let (first, consumed) = decompress_one(&combined).unwrap();
        assert_eq!(first, s1);
        // ...but a caller scanning past it for the next stream (the same
        // `decompress_one` call `decompress_all` makes in a loop) must
        // reject the stray non-zero byte instead of treating it as either
        // padding or the start of the next stream's header.
        let err = decompress_one(&combined[consumed..]).unwrap_err();
        assert!(matches!(err, OxiArcError::FormatError { .. }));
    }

    #[test]
    fn corrupted_block_header_crc_is_rejected() {
        let data = b"payload";
        let mut out = compress(data, CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();
        // Flip a byte inside the block header (right after the stream header).
        out[13] ^= 0xFF;
        let err = decompress(&out).unwrap_err();
        assert!(matches!(err, OxiArcError::FormatError { .. }));
    }

    #[test]
    fn bad_header_magic_is_rejected() {
        let mut out = compress(b"x", CheckType::Crc32, &[], LzmaLevel::new(1)).unwrap();
        out[0] = 0x00;
        assert!(decompress(&out).is_err());
    }
}
