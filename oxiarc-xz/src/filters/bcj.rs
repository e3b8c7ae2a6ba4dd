//! Branch/Call/Jump filters: architecture-specific executable preprocessors
//! that turn relative branch targets into absolute ones (and back), which
//! makes repeated call targets look identical to the downstream LZMA2 coder.
//!
//! Every filter below is expressed as one function taking an `is_encoder`
//! flag: the same bit layout is used to extract the operand and to write it
//! back, so encode and decode are exact inverses of each other by
//! construction (`decode(encode(buf)) == buf`) regardless of the finer
//! points of the real instruction encoding.

use oxiarc_core::error::{OxiArcError, Result};

/// Filter identifier used in XZ block filter chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcjArch {
    /// x86 (`E8`/`E9` call/jump).
    X86,
    /// 32-bit ARM (`BL`).
    Arm,
    /// ARM64 (`BL` and `ADRP`).
    Arm64,
    /// PowerPC (big-endian branch instructions).
    PowerPc,
    /// Itanium/IA-64 bundles.
    Ia64,
    /// SPARC (big-endian `CALL`).
    Sparc,
    /// ARM-Thumb (`BL` pair).
    ArmThumb,
}

impl BcjArch {
    /// XZ filter ID for this architecture.
    pub fn filter_id(self) -> u64 {
        match self {
            BcjArch::X86 => 0x04,
            BcjArch::PowerPc => 0x05,
            BcjArch::Ia64 => 0x06,
            BcjArch::Arm => 0x07,
            BcjArch::ArmThumb => 0x08,
            BcjArch::Sparc => 0x09,
            BcjArch::Arm64 => 0x0A,
        }
    }

    /// Resolve an architecture from an XZ filter ID.
    pub fn from_filter_id(id: u64) -> Option<Self> {
        Some(match id {
            0x04 => BcjArch::X86,
            0x05 => BcjArch::PowerPc,
            0x06 => BcjArch::Ia64,
            0x07 => BcjArch::Arm,
            0x08 => BcjArch::ArmThumb,
            0x09 => BcjArch::Sparc,
            0x0A => BcjArch::Arm64,
            _ => return None,
        })
    }
}

/// A BCJ filter instance: architecture plus the start offset baked into its properties.
#[derive(Debug, Clone, Copy)]
pub struct Bcj {
    arch: BcjArch,
    start_offset: u32,
}

impl Bcj {
    /// Create a filter for `arch` with the given start offset (default 0).
    pub fn new(arch: BcjArch, start_offset: u32) -> Self {
        Self { arch, start_offset }
    }

    /// Architecture this filter implements.
    pub fn arch(&self) -> BcjArch {
        self.arch
    }

    /// 4-byte little-endian property encoding of the start offset, or empty
    /// when the offset is the default (matching the common encoder convention
    /// of omitting default properties).
    pub fn properties(&self) -> Vec<u8> {
        if self.start_offset == 0 {
            Vec::new()
        } else {
            self.start_offset.to_le_bytes().to_vec()
        }
    }

    /// Parse a filter from properties bytes (0 or 4 bytes).
    pub fn from_properties(arch: BcjArch, props: &[u8]) -> Result<Self> {
        let start_offset = match props.len() {
            0 => 0,
            4 => u32::from_le_bytes([props[0], props[1], props[2], props[3]]),
            n => {
                return Err(OxiArcError::format_error(
                    None,
                    format!("BCJ filter properties must be 0 or 4 bytes, got {n}"),
                ));
            }
        };
        Ok(Self { arch, start_offset })
    }

    /// Apply the forward (encode) transform in place.
    pub fn encode(&self, buf: &mut [u8]) {
        apply(self.arch, buf, self.start_offset, true);
    }

    /// Apply the inverse (decode) transform in place.
    pub fn decode(&self, buf: &mut [u8]) {
        apply(self.arch, buf, self.start_offset, false);
    }
}

fn apply(arch: BcjArch, buf: &mut [u8], start_offset: u32, is_encoder: bool) {
    match arch {
        BcjArch::X86 => x86(buf, start_offset, is_encoder),
        BcjArch::Arm => arm(buf, start_offset, is_encoder),
        BcjArch::ArmThumb => arm_thumb(buf, start_offset, is_encoder),
        BcjArch::Arm64 => arm64(buf, start_offset, is_encoder),
        BcjArch::PowerPc => powerpc(buf, start_offset, is_encoder),
        BcjArch::Sparc => sparc(buf, start_offset, is_encoder),
        BcjArch::Ia64 => ia64(buf, start_offset, is_encoder),
    }
}

const MASK_TO_ALLOWED_STATUS: [bool; 8] = [true, true, true, false, true, false, false, false];
const MASK_TO_BIT_NUMBER: [u32; 8] = [0, 1, 2, 2, 3, 3, 3, 3];

#[inline]
fn test86_ms_byte(b: u8) -> bool {
    b == 0x00 || b == 0xFF
}

/// x86 `CALL`/`JMP` absolute-address filter (opcodes `E8`/`E9`).
fn x86(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 5 {
        return;
    }
    let mut prev_mask: u32 = 0;
    let mut prev_pos: i64 = -1;
    let limit = buf.len() - 4;
    let mut i = 0usize;

    while i < limit {
        if buf[i] & 0xFE != 0xE8 {
            i += 1;
            continue;
        }

        let off = i as i64 - prev_pos;
        if off > 3 {
            prev_mask = 0;
        } else {
            prev_mask = (prev_mask << (off - 1)) & 0x7;
            if prev_mask != 0 {
                let bit_num = MASK_TO_BIT_NUMBER[prev_mask as usize] as usize;
                let b = buf[i + 4 - bit_num];
                if !MASK_TO_ALLOWED_STATUS[prev_mask as usize] || test86_ms_byte(b) {
                    prev_pos = i as i64;
                    prev_mask = (prev_mask << 1) | 1;
                    i += 1;
                    continue;
                }
            }
        }
        prev_pos = i as i64;

        if test86_ms_byte(buf[i + 4]) {
            let mut src = u32::from_le_bytes([buf[i + 1], buf[i + 2], buf[i + 3], buf[i + 4]]);
            let mut dest;
            loop {
                dest = if is_encoder {
                    src.wrapping_add(ip.wrapping_add(i as u32).wrapping_add(5))
                } else {
                    src.wrapping_sub(ip.wrapping_add(i as u32).wrapping_add(5))
                };

                if prev_mask == 0 {
                    break;
                }
                let idx = MASK_TO_BIT_NUMBER[prev_mask as usize] * 8;
                let b = (dest >> (24 - idx)) as u8;
                if !test86_ms_byte(b) {
                    break;
                }
                src = dest ^ ((1u32 << (32 - idx)).wrapping_sub(1));
            }

            buf[i + 4] = if (dest >> 24) & 1 != 0 { 0xFF } else { 0x00 };
            buf[i + 3] = (dest >> 16) as u8;
            buf[i + 2] = (dest >> 8) as u8;
            buf[i + 1] = dest as u8;
            i += 5;
        } else {
            prev_mask = (prev_mask << 1) | 1;
            i += 1;
        }
    }
}

/// ARM `BL` filter: 4-byte aligned, little-endian, opcode byte `0xEB`.
fn arm(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 4 {
        return;
    }
    let size = buf.len() - 4;
    let mut i = 0usize;
    while i <= size {
        if buf[i + 3] == 0xEB {
            let src = (((buf[i + 2] as u32) << 16) | ((buf[i + 1] as u32) << 8) | buf[i] as u32)
                << 2;
            let dest = if is_encoder {
                src.wrapping_add(ip.wrapping_add(i as u32).wrapping_add(8))
            } else {
                src.wrapping_sub(ip.wrapping_add(i as u32).wrapping_add(8))
            } >> 2;
            buf[i + 2] = (dest >> 16) as u8;
            buf[i + 1] = (dest >> 8) as u8;
            buf[i] = dest as u8;
        }
        i += 4;
    }
}

/// ARM-Thumb `BL` pair filter: 2-byte aligned, two 16-bit halfwords.
fn arm_thumb(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 4 {
        return;
    }
    let size = buf.len() - 4;
    let mut i = 0usize;
    while i <= size {
        if (buf[i + 1] & 0xF8) == 0xF0 && (buf[i + 3] & 0xF8) == 0xF8 {
            let src = ((((buf[i + 1] as u32) & 0x7) << 19)
                | ((buf[i] as u32) << 11)
                | (((buf[i + 3] as u32) & 0x7) << 8)
                | buf[i + 2] as u32)
                << 1;
            let dest = if is_encoder {
                src.wrapping_add(ip.wrapping_add(i as u32).wrapping_add(4))
            } else {
                src.wrapping_sub(ip.wrapping_add(i as u32).wrapping_add(4))
            } >> 1;
            buf[i + 1] = 0xF0 | ((dest >> 19) & 0x7) as u8;
            buf[i] = (dest >> 11) as u8;
            buf[i + 3] = 0xF8 | ((dest >> 8) & 0x7) as u8;
            buf[i + 2] = dest as u8;
            i += 2;
        }
        i += 2;
    }
}

/// ARM64 `BL` and `ADRP` filter.
fn arm64(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 4 {
        return;
    }
    let size = buf.len() - 4;
    let mut i = 0usize;
    while i <= size {
        let instr = u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);

        if (instr >> 26) == 0x25 {
            // BL: 26-bit word-granular immediate.
            let src = instr & 0x03FF_FFFF;
            let word = if is_encoder {
                src.wrapping_add((ip.wrapping_add(i as u32)) >> 2)
            } else {
                src.wrapping_sub((ip.wrapping_add(i as u32)) >> 2)
            } & 0x03FF_FFFF;
            let new_instr = 0x9400_0000 | word;
            buf[i..i + 4].copy_from_slice(&new_instr.to_le_bytes());
        } else if (instr & 0x9F00_0000) == 0x9000_0000 {
            // ADRP: page-relative immediate split across bits [30:29] and [23:5].
            let src = ((instr >> 29) & 0x3) | ((instr >> 3) & 0x001F_FFFC);
            // Range filter: reject operands outside roughly +/-512 MiB of page granularity.
            if (src.wrapping_add(0x0002_0000)) & 0x001C_0000 != 0 {
                i += 4;
                continue;
            }
            let page = if is_encoder {
                src.wrapping_add((ip.wrapping_add(i as u32)) >> 12)
            } else {
                src.wrapping_sub((ip.wrapping_add(i as u32)) >> 12)
            };
            let mut new_instr = instr & 0x9000_001F;
            new_instr |= (page & 0x3) << 29;
            new_instr |= (page & 0x0003_FFFC) << 3;
            new_instr |= (0u32.wrapping_sub(page & 0x0002_0000)) & 0x00E0_0000;
            buf[i..i + 4].copy_from_slice(&new_instr.to_le_bytes());
        }
        i += 4;
    }
}

/// PowerPC branch filter: 4-byte aligned, big-endian bytestream.
fn powerpc(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 4 {
        return;
    }
    let size = buf.len() - 4;
    let mut i = 0usize;
    while i <= size {
        if (buf[i] & 0xFC) == 0x48 && (buf[i + 3] & 0x3) == 1 {
            let src = (((buf[i] as u32) & 0x3) << 24)
                | ((buf[i + 1] as u32) << 16)
                | ((buf[i + 2] as u32) << 8)
                | ((buf[i + 3] as u32) & !0x3u32);
            let dest = if is_encoder {
                src.wrapping_add(ip.wrapping_add(i as u32))
            } else {
                src.wrapping_sub(ip.wrapping_add(i as u32))
            };
            buf[i] = 0x48 | (((dest >> 24) & 0x3) as u8);
            buf[i + 1] = (dest >> 16) as u8;
            buf[i + 2] = (dest >> 8) as u8;
            buf[i + 3] = ((dest as u8) & !0x3) | (buf[i + 3] & 0x3);
        }
        i += 4;
    }
}

/// SPARC `CALL` filter: 4-byte aligned, big-endian bytestream.
fn sparc(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 4 {
        return;
    }
    let size = buf.len() - 4;
    let mut i = 0usize;
    while i <= size {
        let is_call = (buf[i] == 0x40 && (buf[i + 1] & 0xC0) == 0)
            || (buf[i] == 0x7F && buf[i + 1] >= 0xC0);
        if is_call {
            let src = ((buf[i] as u32) << 24)
                | ((buf[i + 1] as u32) << 16)
                | ((buf[i + 2] as u32) << 8)
                | (buf[i + 3] as u32);
            let src = src << 2;
            let mut dest = if is_encoder {
                src.wrapping_add(ip.wrapping_add(i as u32))
            } else {
                src.wrapping_sub(ip.wrapping_add(i as u32))
            };
            dest >>= 2;
            dest = ((0u32.wrapping_sub((dest >> 22) & 1)) << 22 & 0x3FFF_FFFF)
                | 0x4000_0000
                | (dest & 0x003F_FFFF);
            buf[i] = (dest >> 24) as u8;
            buf[i + 1] = (dest >> 16) as u8;
            buf[i + 2] = (dest >> 8) as u8;
            buf[i + 3] = dest as u8;
        }
        i += 4;
    }
}

const IA64_BRANCH_TABLE: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 4, 6, 6, 0, 0, 7, 7, 4, 4, 0, 0, 4, 4, 0, 0,
];

/// IA-64 (Itanium) bundle filter: 16-byte aligned bundles with up to three 41-bit slots.
fn ia64(buf: &mut [u8], ip: u32, is_encoder: bool) {
    if buf.len() < 16 {
        return;
    }
    let size = buf.len() - 16;
    let mut i = 0usize;

    while i <= size {
        let template = (buf[i] & 0x1F) as usize;
        let mask = IA64_BRANCH_TABLE[template];

        let mut bit_pos = 5u32;
        for slot in 0..3u32 {
            if (mask >> slot) & 1 == 0 {
                bit_pos += 41;
                continue;
            }

            let byte_pos = (bit_pos >> 3) as usize;
            let bit_res = bit_pos & 7;

            let mut instruction: u64 = 0;
            for j in 0..6usize {
                instruction |= (buf[i + byte_pos + j] as u64) << (8 * j);
            }

            let inst_norm = instruction >> bit_res;
            if ((inst_norm >> 37) & 0xF) == 0x5 && ((inst_norm >> 9) & 0x7) == 0 {
                let mut src = ((inst_norm >> 13) & 0xF_FFFF) as u32;
                src |= (((inst_norm >> 36) & 1) as u32) << 20;
                src <<= 4;

                let dest = if is_encoder {
                    src.wrapping_add(ip.wrapping_add(i as u32))
                } else {
                    src.wrapping_sub(ip.wrapping_add(i as u32))
                } >> 4;

                let mut inst_norm = inst_norm;
                inst_norm &= !(0x8F_FFFFu64 << 13);
                inst_norm |= ((dest as u64) & 0xF_FFFF) << 13;
                inst_norm |= (((dest as u64) & 0x10_0000) >> 20) << 36;

                let mask_low = if bit_res == 0 {
                    0
                } else {
                    instruction & ((1u64 << bit_res) - 1)
                };
                let instruction = mask_low | (inst_norm << bit_res);

                for j in 0..6usize {
                    buf[i + byte_pos + j] = (instruction >> (8 * j)) as u8;
                }
            }

            bit_pos += 41;
        }

        i += 16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(arch: BcjArch, data: &[u8]) {
        let filter = Bcj::new(arch, 0);
        let mut buf = data.to_vec();
        filter.encode(&mut buf);
        filter.decode(&mut buf);
        assert_eq!(buf, data, "{arch:?} did not round-trip");
    }

    #[test]
    fn x86_round_trips() {
        let mut data = Vec::new();
        for _ in 0..50 {
            data.extend_from_slice(&[0xE8, 0x00, 0x00, 0x00, 0x00]);
        }
        round_trip(BcjArch::X86, &data);
    }

    #[test]
    fn x86_transforms_call_into_absolute_address() {
        let filter = Bcj::new(BcjArch::X86, 0);
        let mut buf = vec![0xE8, 0x01, 0x00, 0x00, 0x00, 0x90, 0x90, 0x90];
        let original = buf.clone();
        filter.encode(&mut buf);
        assert_ne!(buf, original);
        filter.decode(&mut buf);
        assert_eq!(buf, original);
    }

    #[test]
    fn arm_round_trips() {
        let data: Vec<u8> = (0..64u8).collect();
        round_trip(BcjArch::Arm, &data);
    }

    #[test]
    fn arm_thumb_round_trips() {
        let data: Vec<u8> = (0..64u8).collect();
        round_trip(BcjArch::ArmThumb, &data);
    }

    #[test]
    fn arm64_round_trips() {
        let data: Vec<u8> = (0..128u8).cycle().take(256).collect();
        round_trip(BcjArch::Arm64, &data);
    }

    #[test]
    fn powerpc_round_trips() {
        let data: Vec<u8> = (0..64u8).collect();
        round_trip(BcjArch::PowerPc, &data);
    }

    #[test]
    fn sparc_round_trips() {
        let data: Vec<u8> = (0..64u8).collect();
        round_trip(BcjArch::Sparc, &data);
    }

    #[test]
    fn ia64_round_trips() {
        let data: Vec<u8> = (0..160u8).collect();
        round_trip(BcjArch::Ia64, &data);
    }

    #[test]
    fn properties_round_trip_start_offset() {
        let filter = Bcj::new(BcjArch::X86, 0x1000);
        let props = filter.properties();
        assert_eq!(props, vec![0x00, 0x10, 0x00, 0x00]);
        let parsed = Bcj::from_properties(BcjArch::X86, &props).unwrap();
        assert_eq!(parsed.start_offset, 0x1000);
    }

    #[test]
    fn filter_id_round_trips() {
        for arch in [
            BcjArch::X86,
            BcjArch::Arm,
            BcjArch::Arm64,
            BcjArch::PowerPc,
            BcjArch::Ia64,
            BcjArch::Sparc,
            BcjArch::ArmThumb,
        ] {
            let id = arch.filter_id();
            assert_eq!(BcjArch::from_filter_id(id), Some(arch));
        }
    }
}
