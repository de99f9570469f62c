//! Checksum and search related constants
//!
//! These match the reference resource set. The engine and the search accept
//! other values at runtime; these are the defaults.

// =============================================================================
// Checksum parameters
// =============================================================================

/// Byte size of the key material in the reference resource set (75,776)
pub const KEY_MATERIAL_SIZE: usize = 0x12800;

/// Number of checksum rounds per candidate
///
/// Each round consumes one key material byte, so the key material must hold
/// at least this many bytes.
pub const ITERATION_COUNT: usize = 0x12800;

/// Number of words in the lookup table
pub const LOOKUP_TABLE_LEN: usize = 256;

/// Byte size of the lookup table file (256 little-endian u32 words)
pub const LOOKUP_TABLE_SIZE: usize = LOOKUP_TABLE_LEN * 4;

/// Reflected CRC32 polynomial used by `LookupTable::crc32`
pub const CRC32_POLY_REFLECTED: u32 = 0xEDB8_8320;

/// Checksum the reference search looks for
pub const TARGET_CHECKSUM: u32 = 0x3312_52C3;

// =============================================================================
// Search parameters
// =============================================================================

/// Size of the 32-bit counter space (N = 2^32)
pub const COUNTER_SPACE: u64 = 1u64 << 32;

/// Exclusive upper bound of the reference enumeration (`j < 0xFFFFFFFF`)
pub const REFERENCE_COUNTER_LIMIT: u64 = 0xFFFF_FFFF;

/// Longest decimal representation of a counter (u64::MAX has 20 digits)
pub const MAX_CANDIDATE_LEN: usize = 20;

/// Number of consecutive counters handed to one worker at a time
pub const DEFAULT_CHUNK_SIZE: u64 = 1 << 10; // 1,024

/// Number of evaluated candidates between two progress reports
pub const PROGRESS_INTERVAL: u64 = 1 << 16; // 65,536

// =============================================================================
// File names
// =============================================================================

/// Key material file name in the working directory
pub const KEY_MATERIAL_FILE: &str = "resource.bin";

/// Lookup table file name in the working directory
pub const LOOKUP_TABLE_FILE: &str = "lookuptable.bin";
