//! keyedcrc-search - Keyed CRC32 checksum and brute-force preimage search
//!
//! This crate provides functionality to:
//! - Compute a CRC32-style checksum whose table index is pre-mixed with key material
//! - Load and save the key material and lookup table resource files
//! - Search decimal counter strings for a candidate matching a target checksum,
//!   sequentially or across a rayon worker pool

pub mod constants;
pub mod domain;
pub mod infra;
pub mod app;

// Re-export commonly used types
pub use app::driver::{SearchJob, Strategy};
pub use app::searcher::{
    SearchError, SearchMatch, SearchOptions, search, search_parallel, search_sequential,
};
pub use constants::*;
pub use domain::candidate::{CandidateRange, CandidateRangeError, format_candidate};
pub use domain::checksum::{ChecksumError, KeyedChecksum, compute_checksum};
pub use domain::resource::{KeyMaterial, LookupTable};
pub use infra::resource_io::ResourceError;

#[cfg(feature = "mmap")]
pub use infra::resource_io::MappedKeyMaterial;
