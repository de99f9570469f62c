//! Search workflow implementation
//!
//! This module enumerates decimal counter strings and returns the first one
//! whose keyed checksum equals a target value, either on the calling thread or
//! across a rayon worker pool.

use crate::constants::{DEFAULT_CHUNK_SIZE, MAX_CANDIDATE_LEN, PROGRESS_INTERVAL};
use crate::domain::candidate::{CandidateRange, CandidateRangeError};
use crate::domain::checksum::{ChecksumError, KeyedChecksum};
use crate::domain::resource::LookupTable;
use crate::infra::resource_io::ResourceError;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Winner slot value while no match has been published
const NO_MATCH: u64 = u64::MAX;

/// A candidate whose checksum equals the target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    /// Counter the candidate was formatted from
    pub counter: u64,
    /// Decimal candidate string
    pub candidate: String,
    /// Checksum of the candidate (equals the target)
    pub checksum: u32,
    /// Number of candidates evaluated before the search stopped
    pub searched: u64,
}

impl SearchMatch {
    fn new(counter: u64, checksum: u32, searched: u64) -> Self {
        Self {
            counter,
            candidate: counter.to_string(),
            checksum,
            searched,
        }
    }
}

/// Search errors
///
/// `Exhausted` and `DeadlineExceeded` are expected outcomes rather than
/// failures; `is_not_found` groups them.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Every counter in the range was checked without a match
    #[error("Search space exhausted: no match among {searched} candidates")]
    Exhausted { searched: u64 },
    /// The deadline expired before a match was found
    #[error("Deadline exceeded after {searched} candidates")]
    DeadlineExceeded { searched: u64 },
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
    #[error(transparent)]
    Range(#[from] CandidateRangeError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SearchError {
    /// Check if the search ended without a match (as opposed to failing)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::DeadlineExceeded { .. })
    }
}

/// Options for a search run
#[derive(Clone)]
pub struct SearchOptions<F = fn(u64, u64)> {
    /// Counters to enumerate (default: reference range)
    pub range: CandidateRange,
    /// Wall-clock limit (default: none)
    pub deadline: Option<Duration>,
    /// Counters per work unit; also the deadline check interval
    pub chunk_size: u64,
    /// Worker count for the parallel strategy (None = rayon global pool)
    pub threads: Option<usize>,
    /// Progress callback (searched, total)
    pub on_progress: Option<F>,
}

impl Default for SearchOptions<fn(u64, u64)> {
    fn default() -> Self {
        Self {
            range: CandidateRange::reference(),
            deadline: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: None,
            on_progress: None,
        }
    }
}

impl<F> SearchOptions<F> {
    /// Set the counter range
    pub fn with_range(mut self, range: CandidateRange) -> Self {
        self.range = range;
        self
    }

    /// Set the deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the chunk size (at least 1)
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run the parallel strategy on a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the progress callback
    pub fn with_progress<G>(self, callback: G) -> SearchOptions<G> {
        SearchOptions {
            range: self.range,
            deadline: self.deadline,
            chunk_size: self.chunk_size,
            threads: self.threads,
            on_progress: Some(callback),
        }
    }
}

fn deadline_expired(started: Instant, deadline: Option<Duration>) -> bool {
    deadline.is_some_and(|limit| started.elapsed() >= limit)
}

/// Search the reference range for a preimage of `target`
///
/// This is the unified entry point: it runs `ITERATION_COUNT` checksum rounds
/// per candidate and uses the parallel strategy.
///
/// # Returns
/// The lowest counter whose candidate checksums to `target`, or
/// `SearchError::Exhausted` if the range holds none.
pub fn search(
    key_material: &[u8],
    table: &LookupTable,
    target: u32,
) -> Result<SearchMatch, SearchError> {
    let engine = KeyedChecksum::new(key_material, table)?;
    search_parallel(&engine, target, SearchOptions::default())
}

/// Search on the calling thread, in increasing counter order
///
/// Stops at the first match; `SearchMatch::searched` counts the match itself.
pub fn search_sequential<F>(
    engine: &KeyedChecksum<'_>,
    target: u32,
    options: SearchOptions<F>,
) -> Result<SearchMatch, SearchError>
where
    F: Fn(u64, u64),
{
    let SearchOptions {
        range,
        deadline,
        chunk_size,
        on_progress,
        ..
    } = options;

    let chunk_size = chunk_size.max(1);
    let started = Instant::now();
    let total = range.len();
    let mut buf = Vec::with_capacity(MAX_CANDIDATE_LEN);
    let mut searched = 0u64;

    for counter in range.counters() {
        searched += 1;

        if engine.compute_counter(counter, &mut buf) == target {
            if let Some(ref callback) = on_progress {
                callback(searched, total);
            }
            return Ok(SearchMatch::new(counter, target, searched));
        }

        if let Some(ref callback) = on_progress
            && searched % PROGRESS_INTERVAL == 0
        {
            callback(searched, total);
        }

        if searched % chunk_size == 0 && deadline_expired(started, deadline) {
            return Err(SearchError::DeadlineExceeded { searched });
        }
    }

    if let Some(ref callback) = on_progress {
        callback(searched, total);
    }
    Err(SearchError::Exhausted { searched })
}

/// Search with rayon parallel processing across chunks of the range
///
/// Returns the same match as `search_sequential` for identical inputs: the
/// winner slot only ever moves down (`fetch_min`), workers skip chunks that
/// start above the current winner and leave a chunk as soon as they pass it.
/// If the deadline expires after some match was published, that match is
/// returned even though a lower one may exist.
pub fn search_parallel<F>(
    engine: &KeyedChecksum<'_>,
    target: u32,
    options: SearchOptions<F>,
) -> Result<SearchMatch, SearchError>
where
    F: Fn(u64, u64) + Sync,
{
    match options.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            pool.install(|| run_parallel(engine, target, &options))
        }
        None => run_parallel(engine, target, &options),
    }
}

fn run_parallel<F>(
    engine: &KeyedChecksum<'_>,
    target: u32,
    options: &SearchOptions<F>,
) -> Result<SearchMatch, SearchError>
where
    F: Fn(u64, u64) + Sync,
{
    let range = options.range;
    let chunk_size = options.chunk_size;
    let total = range.len();
    let started = Instant::now();

    let winner = AtomicU64::new(NO_MATCH);
    let cancelled = AtomicBool::new(false);
    let searched = AtomicU64::new(0);

    (0..range.chunk_count(chunk_size))
        .into_par_iter()
        .for_each(|index| {
            let chunk = range.chunk(index, chunk_size);

            if cancelled.load(Ordering::Relaxed) || winner.load(Ordering::Acquire) < chunk.start()
            {
                return;
            }
            if deadline_expired(started, options.deadline) {
                cancelled.store(true, Ordering::Relaxed);
                return;
            }

            let mut buf = Vec::with_capacity(MAX_CANDIDATE_LEN);
            let mut evaluated = 0u64;

            for counter in chunk.counters() {
                if winner.load(Ordering::Relaxed) < counter {
                    break;
                }
                evaluated += 1;
                if engine.compute_counter(counter, &mut buf) == target {
                    winner.fetch_min(counter, Ordering::AcqRel);
                    break;
                }
            }

            let before = searched.fetch_add(evaluated, Ordering::Relaxed);
            let after = before + evaluated;
            if let Some(ref callback) = options.on_progress
                && after / PROGRESS_INTERVAL != before / PROGRESS_INTERVAL
            {
                callback(after, total);
            }
        });

    let searched = searched.into_inner();
    if let Some(ref callback) = options.on_progress {
        callback(searched, total);
    }

    let cancelled = cancelled.into_inner();
    match winner.into_inner() {
        NO_MATCH if cancelled => Err(SearchError::DeadlineExceeded { searched }),
        NO_MATCH => Err(SearchError::Exhausted { searched }),
        counter => Ok(SearchMatch::new(counter, target, searched)),
    }
}
