//! PAR2 packet I/O: the self-describing, scan-for-magic record format
//! that both the main `.par2` index file and `.vol*.par2` recovery
//! volumes are built from.

use md5::{Digest, Md5};
use oxiarc_core::error::{OxiArcError, Result};

/// Packet magic, the first 8 bytes of every packet.
pub const PACKET_MAGIC: [u8; 8] = *b"PAR2\0PKT";

/// Packet type tag for the Main packet.
pub const TYPE_MAIN: [u8; 16] = *b"PAR 2.0\0Main\0\0\0\0";
/// Packet type tag for a File Description packet.
pub const TYPE_FILE_DESC: [u8; 16] = *b"PAR 2.0\0FileDesc";
/// Packet type tag for an Input File Slice Checksum packet.
pub const TYPE_IFSC: [u8; 16] = *b"PAR 2.0\0IFSC\0\0\0\0";
/// Packet type tag for a Recovery Slice packet.
pub const TYPE_RECOVERY: [u8; 16] = *b"PAR 2.0\0RecvSlic";
/// Packet type tag for a Creator packet.
pub const TYPE_CREATOR: [u8; 16] = *b"PAR 2.0\0Creator\0";

/// A packet as it appears on the wire, with its envelope validated but body unparsed.
#[derive(Debug, Clone)]
pub struct RawPacket {
    /// MD5 hash identifying the recovery set this packet belongs to.
    pub set_id: [u8; 16],
    /// Packet type tag (one of the `TYPE_*` constants, or unrecognized).
    pub packet_type: [u8; 16],
    /// Packet body bytes.
    pub body: Vec<u8>,
}

/// Serialize one packet: magic, length, MD5-of-body, set-ID, type tag, body.
pub fn write_packet(out: &mut Vec<u8>, set_id: &[u8; 16], packet_type: &[u8; 16], body: &[u8]) {
    let header_len = 8 + 8 + 16 + 16 + 16; // magic + length + body-md5 + set-id + type
    let total_len = header_len + body.len();
    let padded_len = total_len.div_ceil(4) * 4;
    let padding = padded_len - total_len;

    let mut padded_body = body.to_vec();
    padded_body.resize(body.len() + padding, 0);

    let mut hasher = Md5::new();
    hasher.update(set_id);
    hasher.update(packet_type);
    hasher.update(&padded_body);
    let body_md5: [u8; 16] = hasher.finalize().into();

    out.extend_from_slice(&PACKET_MAGIC);
    out.extend_from_slice(&(padded_len as u64).to_le_bytes());
    out.extend_from_slice(&body_md5);
    out.extend_from_slice(set_id);
    out.extend_from_slice(packet_type);
    out.extend_from_slice(&padded_body);
}

/// Scan `data`, skipping to the next magic match, and parse every valid
/// packet found. Malformed bytes between packets (or trailing partial
/// data) are silently skipped, matching the format's self-describing,
/// resynchronizing design.
pub fn read_packets(data: &[u8]) -> Result<Vec<RawPacket>> {
    let mut packets = Vec::new();
    let mut pos = 0usize;

    while pos + 8 <= data.len() {
        if data[pos..pos + 8] != PACKET_MAGIC {
            pos += 1;
            continue;
        }

        let header_len = 8 + 8 + 16 + 16 + 16;
        if pos + header_len > data.len() {
            break;
        }

        let length = u64::from_le_bytes(data[pos + 8..pos + 16].try_into().unwrap());
        if length < header_len as u64 || length % 4 != 0 {
            pos += 1;
            continue;
        }
        let length = length as usize;
        if pos + length > data.len() {
            pos += 1;
            continue;
        }

        let stored_md5: [u8; 16] = data[pos + 16..pos + 32].try_into().unwrap();
        let mut set_id = [0u8; 16];
        set_id.copy_from_slice(&data[pos + 32..pos + 48]);
        let mut packet_type = [0u8; 16];
        packet_type.copy_from_slice(&data[pos + 48..pos + 64]);
        let body = data[pos + 64..pos + length].to_vec();

        let mut hasher = Md5::new();
        hasher.update(set_id);
        hasher.update(packet_type);
        hasher.update(&body);
        let computed: [u8; 16] = hasher.finalize().into();

        if computed != stored_md5 {
            pos += 1;
            continue;
        }

        packets.push(RawPacket { set_id, packet_type, body });
        pos += length;
    }

    Ok(packets)
}

/// Main packet: global recovery-set parameters.
#[derive(Debug, Clone)]
pub struct MainPacket {
    /// Slice ("block") size in bytes.
    pub slice_size: u64,
    /// File IDs (16-byte MD5-derived identifiers) of every protected file.
    pub file_ids: Vec<[u8; 16]>,
}

impl MainPacket {
    /// Serialize into a packet body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.slice_size.to_le_bytes());
        body.extend_from_slice(&(self.file_ids.len() as u32).to_le_bytes());
        for id in &self.file_ids {
            body.extend_from_slice(id);
        }
        body
    }

    /// Parse from a packet body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.len() < 12 {
            return Err(OxiArcError::format_error(None, "truncated Main packet"));
        }
        let slice_size = u64::from_le_bytes(body[0..8].try_into().unwrap());
        let count = u32::from_le_bytes(body[8..12].try_into().unwrap()) as usize;
        if body.len() < 12 + count * 16 {
            return Err(OxiArcError::format_error(None, "truncated Main packet file list"));
        }
        let file_ids = (0..count)
            .map(|i| {
                let start = 12 + i * 16;
                body[start..start + 16].try_into().unwrap()
            })
            .collect();
        Ok(Self { slice_size, file_ids })
    }
}

/// File Description packet: identity and whole-file hashes of one protected file.
#[derive(Debug, Clone)]
pub struct FileDescriptionPacket {
    /// This file's ID.
    pub file_id: [u8; 16],
    /// MD5 of the entire file.
    pub file_md5: [u8; 16],
    /// Length of the file in bytes.
    pub file_length: u64,
    /// File name (UTF-8, not null-padded in memory).
    pub filename: String,
}

impl FileDescriptionPacket {
    /// Serialize into a packet body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.file_id);
        body.extend_from_slice(&self.file_md5);
        body.extend_from_slice(&self.file_length.to_le_bytes());
        let name_bytes = self.filename.as_bytes();
        body.extend_from_slice(&(name_bytes.len() as u32).to_le_bytes());
        body.extend_from_slice(name_bytes);
        body
    }

    /// Parse from a packet body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.len() < 44 {
            return Err(OxiArcError::format_error(None, "truncated FileDescription packet"));
        }
        let file_id: [u8; 16] = body[0..16].try_into().unwrap();
        let file_md5: [u8; 16] = body[16..32].try_into().unwrap();
        let file_length = u64::from_le_bytes(body[32..40].try_into().unwrap());
        let name_len = u32::from_le_bytes(body[40..44].try_into().unwrap()) as usize;
        if body.len() < 44 + name_len {
            return Err(OxiArcError::format_error(None, "truncated FileDescription filename"));
        }
        let filename = String::from_utf8(body[44..44 + name_len].to_vec())
            .map_err(|e| OxiArcError::encoding_error(e.to_string()))?;
        Ok(Self { file_id, file_md5, file_length, filename })
    }
}

/// Per-slice checksum pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceChecksum {
    /// CRC32 of the slice (before padding zeroes, if any).
    pub crc32: u32,
    /// MD5 of the slice.
    pub md5: [u8; 16],
}

/// Input File Slice Checksum packet: per-slice CRC32+MD5 for one protected file.
#[derive(Debug, Clone)]
pub struct InputFileSliceChecksumPacket {
    /// The file this packet describes.
    pub file_id: [u8; 16],
    /// One entry per slice, in slice order.
    pub checksums: Vec<SliceChecksum>,
}

impl InputFileSliceChecksumPacket {
    /// Serialize into a packet body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.file_id);
        for c in &self.checksums {
            body.extend_from_slice(&c.md5);
            body.extend_from_slice(&c.crc32.to_le_bytes());
        }
        body
    }

    /// Parse from a packet body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.len() < 16 {
            return Err(OxiArcError::format_error(None, "truncated IFSC packet"));
        }
        let file_id: [u8; 16] = body[0..16].try_into().unwrap();
        let rest = &body[16..];
        if rest.len() % 20 != 0 {
            return Err(OxiArcError::format_error(None, "malformed IFSC checksum list"));
        }
        let checksums = rest
            .chunks_exact(20)
            .map(|c| SliceChecksum {
                md5: c[0..16].try_into().unwrap(),
                crc32: u32::from_le_bytes(c[16..20].try_into().unwrap()),
            })
            .collect();
        Ok(Self { file_id, checksums })
    }
}

/// Recovery Slice packet: one Galois-encoded recovery slice at a given exponent.
#[derive(Debug, Clone)]
pub struct RecoverySlicePacket {
    /// Recovery exponent this slice was computed at.
    pub exponent: u32,
    /// Encoded recovery data (slice-size bytes).
    pub data: Vec<u8>,
}

impl RecoverySlicePacket {
    /// Serialize into a packet body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(4 + self.data.len());
        body.extend_from_slice(&self.exponent.to_le_bytes());
        body.extend_from_slice(&self.data);
        body
    }

    /// Parse from a packet body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.len() < 4 {
            return Err(OxiArcError::format_error(None, "truncated RecoverySlice packet"));
        }
        let exponent = u32::from_le_bytes(body[0..4].try_into().unwrap());
        Ok(Self { exponent, data: body[4..].to_vec() })
    }
}

/// Creator packet: free-form client identification string.
#[derive(Debug, Clone)]
pub struct CreatorPacket {
    /// Client identification text.
    pub client: String,
}

impl CreatorPacket {
    /// Serialize into a packet body.
    pub fn encode(&self) -> Vec<u8> {
        self.client.as_bytes().to_vec()
    }

    /// Parse from a packet body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let client = String::from_utf8_lossy(body).into_owned();
        Ok(Self { client })
    }
}
