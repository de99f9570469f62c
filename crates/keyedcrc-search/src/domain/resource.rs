//! Key material and lookup table types
//!
//! Both resources are loaded once before a search and are only read afterwards,
//! so every worker can share them by reference.

use crate::constants::{CRC32_POLY_REFLECTED, LOOKUP_TABLE_LEN};

/// Immutable key material buffer
///
/// Byte `i` is mixed into the table index of checksum round `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMaterial {
    bytes: Box<[u8]>,
}

impl KeyMaterial {
    /// Wrap raw key material bytes
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Key material consisting of `len` zero bytes
    ///
    /// With zeroed key material the engine degenerates into a plain
    /// table-driven CRC over the cycled candidate.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Generate deterministic key material from a seed
    ///
    /// Bytes are drawn from a SplitMix64 stream, little-endian per word.
    pub fn from_seed(seed: u64, len: usize) -> Self {
        let mut state = seed;
        let mut bytes = Vec::with_capacity(len);

        while bytes.len() < len {
            let word = splitmix64(&mut state).to_le_bytes();
            let take = (len - bytes.len()).min(word.len());
            bytes.extend_from_slice(&word[..take]);
        }

        Self::new(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the number of bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for KeyMaterial {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// 256-entry substitution table for byte-wise reduction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookupTable {
    words: [u32; LOOKUP_TABLE_LEN],
}

impl LookupTable {
    /// Create a table from raw words
    pub const fn new(words: [u32; LOOKUP_TABLE_LEN]) -> Self {
        Self { words }
    }

    /// Standard reflected CRC32 table (polynomial 0xEDB88320)
    pub const fn crc32() -> Self {
        Self::reflected(CRC32_POLY_REFLECTED)
    }

    /// Build the table of a reflected CRC with the given polynomial
    pub const fn reflected(poly: u32) -> Self {
        let mut words = [0u32; LOOKUP_TABLE_LEN];
        let mut i = 0;
        while i < LOOKUP_TABLE_LEN {
            let mut crc = i as u32;
            let mut bit = 0;
            while bit < 8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
                bit += 1;
            }
            words[i] = crc;
            i += 1;
        }
        Self { words }
    }

    /// Get the word at a byte index
    #[inline]
    pub fn get(&self, index: u8) -> u32 {
        self.words[index as usize]
    }

    /// Get all words
    pub fn words(&self) -> &[u32; LOOKUP_TABLE_LEN] {
        &self.words
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::crc32()
    }
}
