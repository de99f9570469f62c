//! Keyed checksum engine
//!
//! A byte-wise CRC32 style reduction whose table index is pre-mixed with one
//! key material byte per round. The candidate is re-read cyclically, so the
//! number of rounds depends on the iteration count only, never on the
//! candidate length.

use crate::constants::ITERATION_COUNT;
use crate::domain::candidate::format_candidate;
use crate::domain::resource::LookupTable;
use thiserror::Error;

/// Checksum computation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChecksumError {
    /// The candidate is empty (its length is used as a modulus)
    #[error("Invalid candidate: candidate must not be empty")]
    InvalidCandidate,
    /// More rounds requested than key material bytes available
    #[error("Index out of range: {iterations} iterations but key material holds {len} bytes")]
    IndexOutOfRange { iterations: usize, len: usize },
}

/// Checksum engine bound to one key material buffer and lookup table
///
/// The iteration count is validated against the key material once, on
/// construction, so `compute` never indexes out of bounds.
#[derive(Clone, Copy, Debug)]
pub struct KeyedChecksum<'a> {
    /// Key material truncated to exactly one byte per round
    key_material: &'a [u8],
    table: &'a LookupTable,
}

impl<'a> KeyedChecksum<'a> {
    /// Create an engine running `ITERATION_COUNT` rounds
    pub fn new(key_material: &'a [u8], table: &'a LookupTable) -> Result<Self, ChecksumError> {
        Self::with_iterations(key_material, table, ITERATION_COUNT)
    }

    /// Create an engine running a custom number of rounds
    ///
    /// # Errors
    ///
    /// Returns `ChecksumError::IndexOutOfRange` if `iterations` exceeds the
    /// key material length.
    pub fn with_iterations(
        key_material: &'a [u8],
        table: &'a LookupTable,
        iterations: usize,
    ) -> Result<Self, ChecksumError> {
        let key_material = key_material
            .get(..iterations)
            .ok_or(ChecksumError::IndexOutOfRange {
                iterations,
                len: key_material.len(),
            })?;

        Ok(Self {
            key_material,
            table,
        })
    }

    /// Number of rounds per checksum
    pub fn iterations(&self) -> usize {
        self.key_material.len()
    }

    /// Compute the checksum of a candidate
    ///
    /// # Errors
    ///
    /// Returns `ChecksumError::InvalidCandidate` if the candidate is empty.
    pub fn compute(&self, candidate: impl AsRef<[u8]>) -> Result<u32, ChecksumError> {
        let candidate = candidate.as_ref();
        if candidate.is_empty() {
            return Err(ChecksumError::InvalidCandidate);
        }
        Ok(self.reduce(candidate))
    }

    /// Format a counter into `buf` and compute its checksum
    ///
    /// A formatted counter is never empty, so this cannot fail. `buf` is
    /// reused across calls to keep the search loop allocation-free.
    #[inline]
    pub fn compute_counter(&self, counter: u64, buf: &mut Vec<u8>) -> u32 {
        format_candidate(counter, buf);
        self.reduce(buf)
    }

    #[inline]
    fn reduce(&self, candidate: &[u8]) -> u32 {
        let mut checksum = 0u32;
        for (&key, &byte) in self.key_material.iter().zip(candidate.iter().cycle()) {
            let index = key ^ byte;
            checksum = self.table.get(checksum as u8 ^ index) ^ (checksum >> 8);
        }
        checksum
    }
}

/// Compute the keyed checksum of a candidate with the default iteration count
///
/// Convenience wrapper around `KeyedChecksum`; prefer building the engine once
/// when checksumming many candidates.
pub fn compute_checksum(
    candidate: impl AsRef<[u8]>,
    key_material: &[u8],
    table: &LookupTable,
) -> Result<u32, ChecksumError> {
    let candidate = candidate.as_ref();
    if candidate.is_empty() {
        return Err(ChecksumError::InvalidCandidate);
    }
    KeyedChecksum::new(key_material, table)?.compute(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KEY_MATERIAL_SIZE;
    use crate::domain::resource::KeyMaterial;

    #[test]
    fn test_compute_deterministic() {
        let key = KeyMaterial::from_seed(1, KEY_MATERIAL_SIZE);
        let table = LookupTable::crc32();
        let engine = KeyedChecksum::new(key.as_bytes(), &table).unwrap();

        let first = engine.compute("12345").unwrap();
        let second = engine.compute("12345").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_empty_candidate() {
        let key = KeyMaterial::zeroed(16);
        let table = LookupTable::crc32();
        let engine = KeyedChecksum::with_iterations(key.as_bytes(), &table, 16).unwrap();

        assert_eq!(engine.compute(""), Err(ChecksumError::InvalidCandidate));
    }

    #[test]
    fn test_iterations_exceed_key_material() {
        let key = KeyMaterial::zeroed(15);
        let table = LookupTable::crc32();
        let result = KeyedChecksum::with_iterations(key.as_bytes(), &table, 16);

        assert!(matches!(
            result,
            Err(ChecksumError::IndexOutOfRange {
                iterations: 16,
                len: 15
            })
        ));
    }

    #[test]
    fn test_extra_key_material_is_ignored() {
        let table = LookupTable::crc32();
        let short = KeyMaterial::from_seed(9, 64);
        let mut long = short.as_bytes().to_vec();
        long.extend_from_slice(&[0xAA; 32]);

        let a = KeyedChecksum::with_iterations(short.as_bytes(), &table, 64).unwrap();
        let b = KeyedChecksum::with_iterations(&long, &table, 64).unwrap();
        assert_eq!(a.iterations(), 64);
        assert_eq!(a.compute("77").unwrap(), b.compute("77").unwrap());
    }

    #[test]
    fn test_zero_iterations() {
        let table = LookupTable::crc32();
        let engine = KeyedChecksum::with_iterations(&[], &table, 0).unwrap();
        assert_eq!(engine.compute("1").unwrap(), 0);
    }

    #[test]
    fn test_candidate_is_read_cyclically() {
        // "12" and "1212" produce the same byte stream for any round count
        let key = KeyMaterial::from_seed(3, 1000);
        let table = LookupTable::crc32();
        let engine = KeyedChecksum::with_iterations(key.as_bytes(), &table, 1000).unwrap();

        assert_eq!(engine.compute("12").unwrap(), engine.compute("1212").unwrap());
        assert_ne!(engine.compute("12").unwrap(), engine.compute("21").unwrap());
    }

    #[test]
    fn test_single_round_by_hand() {
        let table = LookupTable::crc32();
        let key = [0x05u8];
        let engine = KeyedChecksum::with_iterations(&key, &table, 1).unwrap();

        // acc = table[0 ^ (0x05 ^ b'7')] ^ (0 >> 8)
        let expected = table.get(0x05 ^ b'7');
        assert_eq!(engine.compute("7").unwrap(), expected);
    }

    #[test]
    fn test_compute_counter_matches_compute() {
        let key = KeyMaterial::from_seed(5, 512);
        let table = LookupTable::crc32();
        let engine = KeyedChecksum::with_iterations(key.as_bytes(), &table, 512).unwrap();
        let mut buf = Vec::new();

        for counter in [0u64, 9, 10, 4_294_967_295] {
            let expected = engine.compute(counter.to_string()).unwrap();
            assert_eq!(engine.compute_counter(counter, &mut buf), expected);
        }
    }

    #[test]
    fn test_compute_checksum_wrapper() {
        let key = KeyMaterial::from_seed(11, KEY_MATERIAL_SIZE);
        let table = LookupTable::crc32();
        let engine = KeyedChecksum::new(key.as_bytes(), &table).unwrap();

        assert_eq!(
            compute_checksum("42", key.as_bytes(), &table),
            engine.compute("42")
        );
        assert_eq!(
            compute_checksum("", key.as_bytes(), &table),
            Err(ChecksumError::InvalidCandidate)
        );
        assert!(matches!(
            compute_checksum("42", &key.as_bytes()[..100], &table),
            Err(ChecksumError::IndexOutOfRange { .. })
        ));
    }
}
