//! Search job execution
//!
//! A `SearchJob` describes one complete run: where the two resource files
//! live, which checksum to look for and which strategy to use. `run` loads
//! both resources before enumerating anything, so a missing or short file
//! aborts the job without a partial search.

use crate::app::searcher::{
    SearchError, SearchMatch, SearchOptions, search_parallel, search_sequential,
};
use crate::constants::{ITERATION_COUNT, TARGET_CHECKSUM};
use crate::domain::checksum::KeyedChecksum;
use crate::infra::resource_io::{key_material_path, load_lookup_table, lookup_table_path};
use std::path::{Path, PathBuf};

#[cfg(feature = "mmap")]
use crate::infra::resource_io::MappedKeyMaterial;

#[cfg(not(feature = "mmap"))]
use crate::infra::resource_io::load_key_material;

/// Enumeration strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// One thread, increasing counter order
    Sequential,
    /// rayon worker pool over chunks of the range
    #[default]
    Parallel,
}

/// One search run over a pair of resource files
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchJob {
    /// Key material file
    pub key_material_path: PathBuf,
    /// Lookup table file
    pub lookup_table_path: PathBuf,
    /// Checksum to find a preimage for
    pub target: u32,
    /// Checksum rounds per candidate (bytes of key material required)
    pub iterations: usize,
    /// Enumeration strategy
    pub strategy: Strategy,
}

impl SearchJob {
    /// Reference job: `resource.bin` and `lookuptable.bin` in `dir`,
    /// `TARGET_CHECKSUM`, `ITERATION_COUNT` rounds, parallel strategy
    pub fn reference(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            key_material_path: key_material_path(dir),
            lookup_table_path: lookup_table_path(dir),
            target: TARGET_CHECKSUM,
            iterations: ITERATION_COUNT,
            strategy: Strategy::default(),
        }
    }

    /// Set the target checksum
    pub fn with_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    /// Set the number of checksum rounds
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Load the resources and run the search
    ///
    /// # Errors
    ///
    /// `SearchError::Resource` if either file is missing, too short or
    /// mis-sized; `Exhausted` / `DeadlineExceeded` if no match was found.
    pub fn run<F>(&self, options: SearchOptions<F>) -> Result<SearchMatch, SearchError>
    where
        F: Fn(u64, u64) + Sync,
    {
        #[cfg(feature = "mmap")]
        let key_material = MappedKeyMaterial::open(&self.key_material_path, self.iterations)?;
        #[cfg(not(feature = "mmap"))]
        let key_material = load_key_material(&self.key_material_path, self.iterations)?;

        let table = load_lookup_table(&self.lookup_table_path)?;
        let engine =
            KeyedChecksum::with_iterations(key_material.as_bytes(), &table, self.iterations)?;

        match self.strategy {
            Strategy::Sequential => search_sequential(&engine, self.target, options),
            Strategy::Parallel => search_parallel(&engine, self.target, options),
        }
    }
}
