//! # OxiArc PAR2
//!
//! PAR2 parity file creation, verification, and repair: a GF(2¹⁶)
//! Reed-Solomon engine wrapped in the PAR2 packet format.
//!
//! ## Usage
//!
//! ```ignore
//! use oxiarc_par2::{par2_create, Par2Options, ProtectedFile};
//!
//! let files = vec![ProtectedFile { name: "a.txt".into(), data: b"hello".to_vec() }];
//! let options = Par2Options::new(50, 256)?;
//! let archive = par2_create(&files, &options)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gf;
pub mod packet;
pub mod rs;

use log::{debug, warn};
use md5::{Digest, Md5};
use oxiarc_core::crc::Crc32;
use oxiarc_core::error::{OxiArcError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use packet::{
    read_packets, write_packet, CreatorPacket, FileDescriptionPacket, InputFileSliceChecksumPacket,
    MainPacket, RecoverySlicePacket, SliceChecksum, TYPE_CREATOR, TYPE_FILE_DESC, TYPE_IFSC,
    TYPE_MAIN, TYPE_RECOVERY,
};

/// Smallest block size accepted for small-file protection (bytes).
pub const MIN_BLOCK_SIZE: usize = 512;

/// Options controlling recovery-data generation, mirroring the
/// clamp-and-validate style of `oxiarc_core::traits::CompressionLevel::new`.
#[derive(Debug, Clone, Copy)]
pub struct Par2Options {
    /// Recovery data as a percentage of protected data (0..=1000, i.e. up to 10x).
    pub redundancy_percent: u32,
    /// Slice size in bytes; must be a multiple of 4 and at least [`MIN_BLOCK_SIZE`].
    pub block_size: usize,
}

impl Par2Options {
    /// Construct options, validating `block_size`.
    pub fn new(redundancy_percent: u32, block_size: usize) -> Result<Self> {
        if block_size % 4 != 0 || block_size < MIN_BLOCK_SIZE {
            return Err(OxiArcError::argument_error(format!(
                "block_size must be a multiple of 4 and at least {MIN_BLOCK_SIZE}, got {block_size}"
            )));
        }
        Ok(Self { redundancy_percent, block_size })
    }
}

/// A file to be protected by a new PAR2 recovery set.
#[derive(Debug, Clone)]
pub struct ProtectedFile {
    /// File name as recorded in the File Description packet.
    pub name: String,
    /// File contents.
    pub data: Vec<u8>,
}

/// The packet bytes produced by [`par2_create`]: a main index file and a
/// recovery volume, as they would be written to `name.par2` and
/// `name.vol000+N.par2` respectively.
#[derive(Debug, Clone)]
pub struct Par2Archive {
    /// Recovery-set identifier shared by every packet.
    pub set_id: [u8; 16],
    /// Main packet + File Description + Input File Slice Checksum + Creator packets.
    pub index_file: Vec<u8>,
    /// Recovery Slice packets.
    pub volume_file: Vec<u8>,
}

fn md5_of(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn derive_file_id(name: &str, data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(name.as_bytes());
    hasher.update((data.len() as u64).to_le_bytes());
    hasher.update(md5_of(data));
    hasher.finalize().into()
}

fn derive_set_id(file_ids: &[[u8; 16]]) -> [u8; 16] {
    let mut hasher = Md5::new();
    let mut sorted = file_ids.to_vec();
    sorted.sort();
    for id in &sorted {
        hasher.update(id);
    }
    hasher.finalize().into()
}

fn slice_file(data: &[u8], block_size: usize) -> Vec<Vec<u8>> {
    let n_slices = data.len().div_ceil(block_size).max(1);
    (0..n_slices)
        .map(|i| {
            let start = i * block_size;
            let end = (start + block_size).min(data.len());
            let mut slice = data[start..end].to_vec();
            slice.resize(block_size, 0);
            slice
        })
        .collect()
}

/// Create a PAR2 recovery set for `files`.
pub fn par2_create(files: &[ProtectedFile], options: &Par2Options) -> Result<Par2Archive> {
    let block_size = options.block_size;

    let mut file_ids = Vec::with_capacity(files.len());
    let mut file_descs = Vec::with_capacity(files.len());
    let mut ifsc_packets = Vec::with_capacity(files.len());
    let mut all_slices: Vec<Vec<u8>> = Vec::new();

    for file in files {
        let file_id = derive_file_id(&file.name, &file.data);
        let slices = slice_file(&file.data, block_size);
        let checksums: Vec<SliceChecksum> = slices
            .iter()
            .map(|s| SliceChecksum { crc32: Crc32::compute(s), md5: md5_of(s) })
            .collect();

        file_descs.push(FileDescriptionPacket {
            file_id,
            file_md5: md5_of(&file.data),
            file_length: file.data.len() as u64,
            filename: file.name.clone(),
        });
        ifsc_packets.push(InputFileSliceChecksumPacket { file_id, checksums });
        all_slices.extend(slices);
        file_ids.push(file_id);
    }

    let set_id = derive_set_id(&file_ids);

    debug!("slicing {} file(s) into {} input slice(s)", files.len(), all_slices.len());

    let recovery_count =
        ((all_slices.len() as f64 * options.redundancy_percent as f64) / 100.0).ceil() as usize;
    let exponents: Vec<u64> = (0..recovery_count as u64).collect();
    let input_refs: Vec<&[u8]> = all_slices.iter().map(|s| s.as_slice()).collect();
    let recovery_data = if exponents.is_empty() {
        Vec::new()
    } else {
        rs::encode(&input_refs, &exponents, rs::DEFAULT_CHUNK_SIZE)?
    };

    let mut index_file = Vec::new();
    let main = MainPacket { slice_size: block_size as u64, file_ids: file_ids.clone() };
    write_packet(&mut index_file, &set_id, &TYPE_MAIN, &main.encode());
    for fd in &file_descs {
        write_packet(&mut index_file, &set_id, &TYPE_FILE_DESC, &fd.encode());
    }
    for ifsc in &ifsc_packets {
        write_packet(&mut index_file, &set_id, &TYPE_IFSC, &ifsc.encode());
    }
    let creator = CreatorPacket { client: "oxiarc-par2".to_string() };
    write_packet(&mut index_file, &set_id, &TYPE_CREATOR, &creator.encode());

    let mut volume_file = Vec::new();
    for (&exp, data) in exponents.iter().zip(recovery_data.iter()) {
        let rec = RecoverySlicePacket { exponent: exp as u32, data: data.clone() };
        write_packet(&mut volume_file, &set_id, &TYPE_RECOVERY, &rec.encode());
    }

    Ok(Par2Archive { set_id, index_file, volume_file })
}

/// A parsed, ready-to-verify recovery set assembled from one or more
/// `.par2` files' packets.
#[derive(Debug, Clone)]
pub struct Par2Verifier {
    /// Recovery-set identifier.
    pub set_id: [u8; 16],
    /// Slice size in bytes.
    pub slice_size: u64,
    /// Per-file metadata, in the order they appear in the Main packet.
    pub files: Vec<FileRecord>,
    /// Recovery slices keyed by exponent.
    pub recovery: Vec<(u32, Vec<u8>)>,
}

/// Metadata for one protected file, reconstructed from its File
/// Description and Input File Slice Checksum packets.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// This file's ID.
    pub file_id: [u8; 16],
    /// File name.
    pub filename: String,
    /// Length of the original file in bytes.
    pub file_length: u64,
    /// MD5 of the whole file.
    pub file_md5: [u8; 16],
    /// Per-slice CRC32+MD5, in slice order.
    pub checksums: Vec<SliceChecksum>,
}

impl Par2Verifier {
    /// Parse a recovery set from the concatenation of every `.par2` file's
    /// raw bytes (main index file plus any recovery volumes).
    pub fn parse(par2_files: &[&[u8]]) -> Result<Self> {
        let mut main: Option<MainPacket> = None;
        let mut set_id: Option<[u8; 16]> = None;
        let mut descs: std::collections::HashMap<[u8; 16], FileDescriptionPacket> = Default::default();
        let mut ifscs: std::collections::HashMap<[u8; 16], InputFileSliceChecksumPacket> = Default::default();
        let mut recovery = Vec::new();

        for bytes in par2_files {
            for raw in read_packets(bytes)? {
                if let Some(expected) = set_id {
                    if raw.set_id != expected {
                        continue; // packet belongs to a different recovery set
                    }
                } else {
                    set_id = Some(raw.set_id);
                }

                match raw.packet_type {
                    TYPE_MAIN => main = Some(MainPacket::decode(&raw.body)?),
                    TYPE_FILE_DESC => {
                        let fd = FileDescriptionPacket::decode(&raw.body)?;
                        descs.insert(fd.file_id, fd);
                    }
                    TYPE_IFSC => {
                        let ifsc = InputFileSliceChecksumPacket::decode(&raw.body)?;
                        ifscs.insert(ifsc.file_id, ifsc);
                    }
                    TYPE_RECOVERY => {
                        let rec = RecoverySlicePacket::decode(&raw.body)?;
                        recovery.push((rec.exponent, rec.data));
                    }
                    _ => {}
                }
            }
        }

        let main = main.ok_or_else(|| OxiArcError::format_error(None, "no Main packet found"))?;
        let set_id = set_id.ok_or_else(|| OxiArcError::format_error(None, "no packets found"))?;

        let mut files = Vec::with_capacity(main.file_ids.len());
        for file_id in &main.file_ids {
            let fd = descs
                .remove(file_id)
                .ok_or_else(|| OxiArcError::format_error(None, "missing FileDescription packet"))?;
            let ifsc = ifscs
                .remove(file_id)
                .ok_or_else(|| OxiArcError::format_error(None, "missing InputFileSliceChecksum packet"))?;
            files.push(FileRecord {
                file_id: *file_id,
                filename: fd.filename,
                file_length: fd.file_length,
                file_md5: fd.file_md5,
                checksums: ifsc.checksums,
            });
        }

        recovery.sort_by_key(|(exp, _)| *exp);
        Ok(Self { set_id, slice_size: main.slice_size, files, recovery })
    }

    fn slice_ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges = Vec::with_capacity(self.files.len());
        let mut offset = 0;
        for f in &self.files {
            let n = f.checksums.len();
            ranges.push((offset, n));
            offset += n;
        }
        ranges
    }
}

/// Result of verifying one protected file against its recorded checksums.
#[derive(Debug, Clone)]
pub struct FileVerifyResult {
    /// File name.
    pub filename: String,
    /// Whether the file was found at all.
    pub present: bool,
    /// Indices (within this file) of slices whose data didn't match.
    pub damaged_slices: Vec<usize>,
    /// Total slice count for this file.
    pub total_slices: usize,
}

/// Outcome of a verification pass across an entire recovery set.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// Per-file results, in recovery-set order.
    pub files: Vec<FileVerifyResult>,
    /// Whether every damaged/missing slice can be covered by available recovery slices.
    pub repairable: bool,
}

/// Verify `current_files` (name, contents-or-None-if-missing) against the
/// checksums recorded in `verifier`.
pub fn par2_verify(verifier: &Par2Verifier, current_files: &[(String, Option<Vec<u8>>)]) -> VerifyReport {
    let mut results = Vec::with_capacity(verifier.files.len());
    let mut total_damaged = 0usize;

    for file in &verifier.files {
        let found = current_files.iter().find(|(name, _)| name == &file.filename);
        let total_slices = file.checksums.len();

        match found.and_then(|(_, data)| data.as_ref()) {
            None => {
                results.push(FileVerifyResult {
                    filename: file.filename.clone(),
                    present: false,
                    damaged_slices: (0..total_slices).collect(),
                    total_slices,
                });
                total_damaged += total_slices;
            }
            Some(data) => {
                let slices = slice_file(data, verifier.slice_size as usize);
                let mut damaged = Vec::new();
                for (i, expected) in file.checksums.iter().enumerate() {
                    let actual_md5 = slices.get(i).map(|s| md5_of(s));
                    if actual_md5 != Some(expected.md5) {
                        damaged.push(i);
                    }
                }
                total_damaged += damaged.len();
                results.push(FileVerifyResult {
                    filename: file.filename.clone(),
                    present: true,
                    damaged_slices: damaged,
                    total_slices,
                });
            }
        }
    }

    let repairable = total_damaged <= verifier.recovery.len();
    VerifyReport { files: results, repairable }
}

/// Outcome of a repair pass.
#[derive(Debug, Clone)]
pub struct RepairResult {
    /// Reconstructed file contents, keyed by filename.
    pub recovered: Vec<(String, Vec<u8>)>,
    /// Files that could not be fully reconstructed.
    pub unrecoverable: Vec<String>,
    /// Whether every damaged/missing file was fully reconstructed.
    pub success: bool,
}

/// Repair damaged or missing files using the recovery slices in `verifier`.
pub fn par2_repair(verifier: &Par2Verifier, current_files: &[(String, Option<Vec<u8>>)]) -> Result<RepairResult> {
    let report = par2_verify(verifier, current_files);
    let ranges = verifier.slice_ranges();
    let slice_size = verifier.slice_size as usize;

    let mut present: Vec<(usize, Vec<u8>)> = Vec::new();
    let mut missing_global: Vec<usize> = Vec::new();
    let mut per_file_missing: Vec<Vec<usize>> = Vec::with_capacity(verifier.files.len());

    for (fidx, (file, result)) in verifier.files.iter().zip(report.files.iter()).enumerate() {
        let data = current_files
            .iter()
            .find(|(name, _)| name == &file.filename)
            .and_then(|(_, d)| d.clone());
        let (offset, n) = ranges[fidx];
        let mut local_missing = Vec::new();

        match data {
            Some(bytes) if result.present => {
                let slices = slice_file(&bytes, slice_size);
                for i in 0..n {
                    if result.damaged_slices.contains(&i) {
                        missing_global.push(offset + i);
                        local_missing.push(i);
                    } else if let Some(s) = slices.get(i) {
                        present.push((offset + i, s.clone()));
                    }
                }
            }
            _ => {
                for i in 0..n {
                    missing_global.push(offset + i);
                    local_missing.push(i);
                }
            }
        }
        per_file_missing.push(local_missing);
    }

    let mut recovered = Vec::new();
    let mut unrecoverable = Vec::new();

    if !missing_global.is_empty() {
        if verifier.recovery.len() < missing_global.len() {
            warn!(
                "{} damaged/missing slice(s) but only {} recovery slice(s) available",
                missing_global.len(),
                verifier.recovery.len()
            );
            for file in &verifier.files {
                unrecoverable.push(file.filename.clone());
            }
            return Ok(RepairResult { recovered, unrecoverable, success: false });
        }

        let present_refs: Vec<(usize, &[u8])> = present.iter().map(|(i, d)| (*i, d.as_slice())).collect();
        let recovery_refs: Vec<(u64, &[u8])> =
            verifier.recovery.iter().map(|(e, d)| (*e as u64, d.as_slice())).collect();

        let reconstructed = rs::repair(&present_refs, &recovery_refs, &missing_global, rs::DEFAULT_CHUNK_SIZE)?;
        let mut by_global_index: std::collections::HashMap<usize, Vec<u8>> =
            missing_global.iter().cloned().zip(reconstructed).collect();

        for (fidx, file) in verifier.files.iter().enumerate() {
            let (offset, n) = ranges[fidx];
            let local_missing = &per_file_missing[fidx];
            if local_missing.is_empty() && report.files[fidx].present {
                continue; // file was untouched, nothing to rebuild
            }

            let mut full = Vec::with_capacity(n * slice_size);
            for i in 0..n {
                if let Some(slice) = by_global_index.remove(&(offset + i)) {
                    full.extend_from_slice(&slice);
                } else {
                    let data = current_files
                        .iter()
                        .find(|(name, _)| name == &file.filename)
                        .and_then(|(_, d)| d.as_ref());
                    if let Some(d) = data {
                        let slices = slice_file(d, slice_size);
                        full.extend_from_slice(&slices[i]);
                    }
                }
            }
            full.truncate(file.file_length as usize);

            if md5_of(&full) == file.file_md5 {
                recovered.push((file.filename.clone(), full));
            } else {
                unrecoverable.push(file.filename.clone());
            }
        }
    }

    let success = unrecoverable.is_empty();
    Ok(RepairResult { recovered, unrecoverable, success })
}

/// Write every file in `repair.recovered` into `target_dir`, staging each
/// through a temporary file in the same directory and renaming it into
/// place only once the write has fully succeeded. The temporary file is
/// removed automatically (via `Drop`) if staging fails before the rename.
pub fn write_repaired_files(repair: &RepairResult, target_dir: &Path) -> Result<()> {
    for (name, data) in &repair.recovered {
        let mut staged = NamedTempFile::new_in(target_dir).map_err(OxiArcError::Io)?;
        staged.write_all(data).map_err(OxiArcError::Io)?;
        staged.flush().map_err(OxiArcError::Io)?;
        staged.persist(target_dir.join(name)).map_err(|e| OxiArcError::Io(e.error))?;
        debug!("repaired {name} staged and persisted to {}", target_dir.display());
    }
    Ok(())
}
