//! Stream integrity checks: the four check types an XZ stream header may declare.

use oxiarc_core::crc::{Crc32, Crc64};
use oxiarc_core::error::{OxiArcError, Result};
use sha2::{Digest, Sha256};

/// Integrity check selected for a stream (stored in the 4-bit check-type field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    /// No integrity check.
    None,
    /// CRC-32 (IEEE) of the uncompressed block data.
    Crc32,
    /// CRC-64 (ECMA-182) of the uncompressed block data.
    Crc64,
    /// SHA-256 of the uncompressed block data.
    Sha256,
}

impl CheckType {
    /// Decode the 4-bit check-type field from a stream header's flags byte.
    pub fn from_flags_nibble(nibble: u8) -> Result<Self> {
        match nibble {
            0 => Ok(CheckType::None),
            1 => Ok(CheckType::Crc32),
            4 => Ok(CheckType::Crc64),
            10 => Ok(CheckType::Sha256),
            n => Err(OxiArcError::format_error(
                None,
                format!("unsupported or reserved check type {n}"),
            )),
        }
    }

    /// The 4-bit value stored in the stream header/footer flags.
    pub fn flags_nibble(self) -> u8 {
        match self {
            CheckType::None => 0,
            CheckType::Crc32 => 1,
            CheckType::Crc64 => 4,
            CheckType::Sha256 => 10,
        }
    }

    /// Size in bytes of this check's digest.
    pub fn digest_len(self) -> usize {
        match self {
            CheckType::None => 0,
            CheckType::Crc32 => 4,
            CheckType::Crc64 => 8,
            CheckType::Sha256 => 32,
        }
    }

    /// Compute the digest of `data` under this check type.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            CheckType::None => Vec::new(),
            CheckType::Crc32 => Crc32::compute(data).to_le_bytes().to_vec(),
            CheckType::Crc64 => Crc64::compute(data).to_le_bytes().to_vec(),
            CheckType::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
        }
    }

    /// Verify `data` against an expected digest, raising [`OxiArcError::IntegrityError`] on mismatch.
    pub fn verify(self, data: &[u8], expected: &[u8]) -> Result<()> {
        let computed = self.digest(data);
        if computed != expected {
            return Err(OxiArcError::integrity_error(
                self.name(),
                hex(expected),
                hex(&computed),
            ));
        }
        Ok(())
    }

    fn name(self) -> &'static str {
        match self {
            CheckType::None => "none",
            CheckType::Crc32 => "crc32",
            CheckType::Crc64 => "crc64",
            CheckType::Sha256 => "sha256",
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_digest_round_trips() {
        let data = b"hello xz";
        let digest = CheckType::Crc32.digest(data);
        assert_eq!(digest.len(), 4);
        assert!(CheckType::Crc32.verify(data, &digest).is_ok());
    }

    #[test]
    fn crc64_digest_round_trips() {
        let data = b"hello xz";
        let digest = CheckType::Crc64.digest(data);
        assert_eq!(digest.len(), 8);
        assert!(CheckType::Crc64.verify(data, &digest).is_ok());
    }

    #[test]
    fn sha256_digest_round_trips() {
        let data = b"hello xz";
        let digest = CheckType::Sha256.digest(data);
        assert_eq!(digest.len(), 32);
        assert!(CheckType::Sha256.verify(data, &digest).is_ok());
    }

    #[test]
    fn mismatched_digest_is_rejected() {
        let data = b"hello xz";
        let mut digest = CheckType::Crc32.digest(data);
        digest[0] ^= 0xFF;
        assert!(CheckType::Crc32.verify(data, &digest).is_err());
    }

    #[test]
    fn unknown_nibble_is_rejected() {
        assert!(CheckType::from_flags_nibble(2).is_err());
    }

    #[test]
    fn nibble_round_trips() {
        for ct in [CheckType::None, CheckType::Crc32, CheckType::Crc64, CheckType::Sha256] {
            assert_eq!(CheckType::from_flags_nibble(ct.flags_nibble()).unwrap(), ct);
        }
    }
}
