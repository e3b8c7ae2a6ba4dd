//! Reed-Solomon encoding and repair over GF(2¹⁶), chunked to bound memory
//! use when slices are large.

use crate::gf;
use oxiarc_core::error::{OxiArcError, Result};
use rayon::prelude::*;

/// Default chunk size (bytes) processed at a time across all slices.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

fn validate_slices(slices: &[&[u8]]) -> Result<usize> {
    let len = slices.first().map(|s| s.len()).unwrap_or(0);
    if len % 2 != 0 {
        return Err(OxiArcError::argument_error("slice size must be even"));
    }
    if slices.iter().any(|s| s.len() != len) {
        return Err(OxiArcError::argument_error("all slices must be the same size"));
    }
    Ok(len)
}

/// Compute `count` recovery slices at exponents `0..count` over `inputs`.
pub fn encode(inputs: &[&[u8]], exponents: &[u64], chunk_size: usize) -> Result<Vec<Vec<u8>>> {
    let slice_len = validate_slices(inputs)?;
    let chunk_size = chunk_size.max(2) & !1; // keep it even, word-aligned

    // Precompute per-input, per-exponent coefficients once; they don't
    // depend on chunk offset.
    let coeffs: Vec<Vec<u16>> = exponents
        .iter()
        .map(|&e| {
            (0..inputs.len())
                .map(|i| gf::pow(gf::base(i), e))
                .collect()
        })
        .collect();

    // Each output recovery slice is independent of the others, so the
    // per-exponent accumulation can run in parallel.
    let recovery: Vec<Vec<u8>> = coeffs
        .par_iter()
        .map(|row_coeffs| {
            let mut out = vec![0u8; slice_len];
            let mut offset = 0;
            while offset < slice_len {
                let len = chunk_size.min(slice_len - offset);
                for (i, inp) in inputs.iter().enumerate() {
                    let coeff = row_coeffs[i];
                    if coeff == 0 {
                        continue;
                    }
                    let mut w = 0;
                    while w < len {
                        let idx = offset + w;
                        let word = u16::from_le_bytes([inp[idx], inp[idx + 1]]);
                        let contrib = gf::mul(word, coeff);
                        let existing = u16::from_le_bytes([out[idx], out[idx + 1]]);
                        let updated = gf::add(existing, contrib).to_le_bytes();
                        out[idx] = updated[0];
                        out[idx + 1] = updated[1];
                        w += 2;
                    }
                }
                offset += len;
            }
            out
        })
        .collect();

    Ok(recovery)
}

/// Invert a `k x k` matrix over GF(2¹⁶) via Gauss-Jordan elimination.
fn invert_matrix(a: &[Vec<u16>]) -> Result<Vec<Vec<u16>>> {
    let k = a.len();
    let mut m: Vec<Vec<u16>> = (0..k)
        .map(|r| {
            let mut row = a[r].clone();
            row.resize(2 * k, 0);
            row[k + r] = 1;
            row
        })
        .collect();

    for col in 0..k {
        let pivot_row = (col..k)
            .find(|&r| m[r][col] != 0)
            .ok_or_else(|| OxiArcError::decompression_error(None, "singular recovery matrix"))?;
        m.swap(col, pivot_row);

        let pivot_val = m[col][col];
        let inv = gf::inverse(pivot_val)?;
        for v in m[col].iter_mut() {
            *v = gf::mul(*v, inv);
        }

        for r in 0..k {
            if r == col {
                continue;
            }
            let factor = m[r][col];
            if factor == 0 {
                continue;
            }
            for c in 0..2 * k {
                let prod = gf::mul(factor, m[col][c]);
                m[r][c] = gf::add(m[r][c], prod);
            }
        }
    }

    Ok(m.into_iter().map(|row| row[k..].to_vec()).collect())
}

/// Reconstruct missing input slices.
///
/// `present` lists `(original_index, data)` for every available input
/// slice. `recovery` lists `(exponent, data)` for at least
/// `missing_indices.len()` recovery slices. Returns the reconstructed
/// slices in the same order as `missing_indices`.
pub fn repair(
    present: &[(usize, &[u8])],
    recovery: &[(u64, &[u8])],
    missing_indices: &[usize],
    chunk_size: usize,
) -> Result<Vec<Vec<u8>>> {
    let k = missing_indices.len();
    if k == 0 {
        return Ok(Vec::new());
    }
    if recovery.len() < k {
        return Err(OxiArcError::argument_error(format!(
            "need {k} recovery slices to reconstruct {k} missing inputs, have {}",
            recovery.len()
        )));
    }

    let present_slices: Vec<&[u8]> = present.iter().map(|(_, d)| *d).collect();
    let recovery_slices: Vec<&[u8]> = recovery.iter().map(|(_, d)| *d).collect();
    let mut all_slices = present_slices.clone();
    all_slices.extend_from_slice(&recovery_slices);
    let slice_len = validate_slices(&all_slices)?;
    let chunk_size = chunk_size.max(2) & !1;

    let chosen = &recovery[..k];

    // A[r][c] = base(missing_indices[c]) ^ exponent_r
    let a: Vec<Vec<u16>> = chosen
        .iter()
        .map(|&(exp, _)| {
            missing_indices
                .iter()
                .map(|&idx| gf::pow(gf::base(idx), exp))
                .collect()
        })
        .collect();
    let a_inv = invert_matrix(&a)?;

    // Precompute the present-input contribution coefficients for each chosen row.
    let known_coeffs: Vec<Vec<u16>> = chosen
        .iter()
        .map(|&(exp, _)| {
            present
                .iter()
                .map(|&(idx, _)| gf::pow(gf::base(idx), exp))
                .collect()
        })
        .collect();

    let mut outputs = vec![vec![0u8; slice_len]; k];
    let mut offset = 0;

    while offset < slice_len {
        let len = chunk_size.min(slice_len - offset);

        // b[r] holds the residual word-by-word for this chunk.
        let mut b: Vec<Vec<u8>> = chosen.iter().map(|&(_, data)| data[offset..offset + len].to_vec()).collect();

        for (r, row_coeffs) in known_coeffs.iter().enumerate() {
            for (p, &coeff) in row_coeffs.iter().enumerate() {
                if coeff == 0 {
                    continue;
                }
                let data = present_slices[p];
                let mut w = 0;
                while w < len {
                    let word = u16::from_le_bytes([data[offset + w], data[offset + w + 1]]);
                    let contrib = gf::mul(word, coeff);
                    let existing = u16::from_le_bytes([b[r][w], b[r][w + 1]]);
                    let updated = gf::add(existing, contrib).to_le_bytes();
                    b[r][w] = updated[0];
                    b[r][w + 1] = updated[1];
                    w += 2;
                }
            }
        }

        for (c, out_row) in outputs.iter_mut().enumerate() {
            let mut w = 0;
            while w < len {
                let mut acc = 0u16;
                for (r, b_row) in b.iter().enumerate() {
                    let word = u16::from_le_bytes([b_row[w], b_row[w + 1]]);
                    acc = gf::add(acc, gf::mul(a_inv[c][r], word));
                }
                let bytes = acc.to_le_bytes();
                out_row[offset + w] = bytes[0];
                out_row[offset + w + 1] = bytes[1];
                w += 2;
            }
        }

        offset += len;
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice_of(byte: u8, len: usize) -> Vec<u8> {
        vec![byte; len]
    }

    #[test]
    fn single_missing_slice_is_recovered() {
        let s0 = slice_of(0xAA, 256);
        let s1 = slice_of(0xBB, 256);
        let s2 = slice_of(0xCC, 256);
        let inputs: Vec<&[u8]> = vec![&s0, &s1, &s2];
        let exponents: Vec<u64> = vec![0, 1, 2];
        let recovery = encode(&inputs, &exponents, DEFAULT_CHUNK_SIZE).unwrap();

        // Pretend input index 1 is missing; reconstruct using one recovery slice.
        let present: Vec<(usize, &[u8])> = vec![(0, &s0), (2, &s2)];
        let recovery_refs: Vec<(u64, &[u8])> = vec![(0, &recovery[0])];
        let missing = [1usize];
        let out = repair(&present, &recovery_refs, &missing, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(out[0], s1);
    }

    #[test]
    fn full_recovery_of_all_inputs() {
        let inputs_owned: Vec<Vec<u8>> = (0..10u8).map(|i| slice_of(i.wrapping_mul(17).wrapping_add(1), 64)).collect();
        let inputs: Vec<&[u8]> = inputs_owned.iter().map(|v| v.as_slice()).collect();
        let exponents: Vec<u64> = (0..10).collect();
        let recovery = encode(&inputs, &exponents, DEFAULT_CHUNK_SIZE).unwrap();

        let present: Vec<(usize, &[u8])> = Vec::new();
        let recovery_refs: Vec<(u64, &[u8])> = exponents.iter().zip(recovery.iter()).map(|(&e, r)| (e, r.as_slice())).collect();
        let missing: Vec<usize> = (0..10).collect();

        let out = repair(&present, &recovery_refs, &missing, DEFAULT_CHUNK_SIZE).unwrap();
        for (i, reconstructed) in out.iter().enumerate() {
            assert_eq!(reconstructed, &inputs_owned[i], "slice {i} mismatch");
        }
    }

    #[test]
    fn chunked_processing_matches_single_pass() {
        let s0: Vec<u8> = (0..512u32).map(|i| (i % 256) as u8).collect();
        let s1: Vec<u8> = (0..512u32).map(|i| ((i * 3) % 256) as u8).collect();
        let inputs: Vec<&[u8]> = vec![&s0, &s1];
        let exponents: Vec<u64> = vec![0, 1];

        let big_chunk = encode(&inputs, &exponents, 4096).unwrap();
        let small_chunk = encode(&inputs, &exponents, 8).unwrap();
        assert_eq!(big_chunk, small_chunk);
    }

    #[test]
    fn odd_slice_size_is_rejected() {
        let s0 = slice_of(1, 5);
        let inputs: Vec<&[u8]> = vec![&s0];
        assert!(encode(&inputs, &[0], DEFAULT_CHUNK_SIZE).is_err());
    }

    #[test]
    fn insufficient_recovery_slices_is_rejected() {
        let s0 = slice_of(1, 16);
        let s1 = slice_of(2, 16);
        let inputs: Vec<&[u8]> = vec![&s0, &s1];
        let recovery = encode(&inputs, &[0], DEFAULT_CHUNK_SIZE).unwrap();
        let present: Vec<(usize, &[u8])> = Vec::new();
        let recovery_refs: Vec<(u64, &[u8])> = vec![(0, &recovery[0])];
        let missing = [0usize, 1usize];
        assert!(repair(&present, &recovery_refs, &missing, DEFAULT_CHUNK_SIZE).is_err());
    }
}
