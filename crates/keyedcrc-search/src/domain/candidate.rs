//! Candidate enumeration
//!
//! A candidate is the canonical decimal string of a counter: no sign, no
//! leading zeros. Counters are enumerated in increasing order over a half-open
//! range that never leaves the 32-bit counter space.

use crate::constants::{COUNTER_SPACE, MAX_CANDIDATE_LEN, REFERENCE_COUNTER_LIMIT};
use std::ops::Range;
use thiserror::Error;

/// Write the decimal representation of `counter` into `buf`
///
/// `buf` is cleared first. Nothing is allocated once `buf` has grown to
/// `MAX_CANDIDATE_LEN` bytes.
#[inline]
pub fn format_candidate(counter: u64, buf: &mut Vec<u8>) {
    let mut digits = [0u8; MAX_CANDIDATE_LEN];
    let mut pos = digits.len();
    let mut n = counter;

    loop {
        pos -= 1;
        digits[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }

    buf.clear();
    buf.extend_from_slice(&digits[pos..]);
}

/// Candidate range errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CandidateRangeError {
    /// Start lies after end
    #[error("Invalid range: start {start} is greater than end {end}")]
    Inverted { start: u64, end: u64 },
    /// End lies beyond the 32-bit counter space
    #[error("Invalid range: end {end} exceeds the counter space ({limit})")]
    OutOfBounds { end: u64, limit: u64 },
}

/// Half-open counter range `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateRange {
    start: u64,
    end: u64,
}

impl CandidateRange {
    /// Create a range
    ///
    /// # Errors
    ///
    /// Fails if `start > end` or `end > COUNTER_SPACE`.
    pub fn new(start: u64, end: u64) -> Result<Self, CandidateRangeError> {
        if end > COUNTER_SPACE {
            return Err(CandidateRangeError::OutOfBounds {
                end,
                limit: COUNTER_SPACE,
            });
        }
        if start > end {
            return Err(CandidateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Reference enumeration: 0 up to, but excluding, 0xFFFFFFFF
    pub fn reference() -> Self {
        Self {
            start: 0,
            end: REFERENCE_COUNTER_LIMIT,
        }
    }

    /// Whole 32-bit counter space, u32::MAX included
    pub fn full() -> Self {
        Self {
            start: 0,
            end: COUNTER_SPACE,
        }
    }

    /// First counter of the range
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end of the range
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of counters in the range
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Iterate over the counters in increasing order
    pub fn counters(&self) -> Range<u64> {
        self.start..self.end
    }

    /// Number of chunks of `chunk_size` counters covering the range
    pub fn chunk_count(&self, chunk_size: u64) -> u64 {
        self.len().div_ceil(chunk_size.max(1))
    }

    /// Get the chunk at `index`; the last chunk may be shorter
    pub fn chunk(&self, index: u64, chunk_size: u64) -> CandidateRange {
        let chunk_size = chunk_size.max(1);
        let offset = index.saturating_mul(chunk_size);
        let start = self.start.saturating_add(offset).min(self.end);
        let end = start.saturating_add(chunk_size).min(self.end);
        Self { start, end }
    }
}

impl Default for CandidateRange {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted(counter: u64) -> String {
        let mut buf = Vec::new();
        format_candidate(counter, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_candidate() {
        assert_eq!(formatted(0), "0");
        assert_eq!(formatted(7), "7");
        assert_eq!(formatted(10), "10");
        assert_eq!(formatted(1_000_000), "1000000");
        assert_eq!(formatted(u32::MAX as u64), "4294967295");
        assert_eq!(formatted(u64::MAX), "18446744073709551615");
    }

    #[test]
    fn test_format_candidate_reuses_buffer() {
        let mut buf = Vec::new();
        format_candidate(123456, &mut buf);
        format_candidate(9, &mut buf);
        assert_eq!(buf, b"9");
    }

    #[test]
    fn test_range_validation() {
        assert!(CandidateRange::new(0, 0).is_ok());
        assert!(CandidateRange::new(0, COUNTER_SPACE).is_ok());
        assert_eq!(
            CandidateRange::new(5, 4),
            Err(CandidateRangeError::Inverted { start: 5, end: 4 })
        );
        assert!(matches!(
            CandidateRange::new(0, COUNTER_SPACE + 1),
            Err(CandidateRangeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_reference_range() {
        let range = CandidateRange::reference();
        assert_eq!(range.start(), 0);
        assert_eq!(range.end(), 0xFFFF_FFFF);
        assert_eq!(range, CandidateRange::default());
        assert_eq!(CandidateRange::full().len(), 1u64 << 32);
    }

    #[test]
    fn test_chunks_cover_range() {
        let range = CandidateRange::new(3, 25).unwrap();
        let chunk_size = 8;

        assert_eq!(range.chunk_count(chunk_size), 3);

        let counters: Vec<u64> = (0..range.chunk_count(chunk_size))
            .flat_map(|i| range.chunk(i, chunk_size).counters())
            .collect();
        let expected: Vec<u64> = range.counters().collect();
        assert_eq!(counters, expected);

        let last = range.chunk(2, chunk_size);
        assert_eq!((last.start(), last.end()), (19, 25));
    }

    #[test]
    fn test_empty_range() {
        let range = CandidateRange::new(10, 10).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.chunk_count(4), 0);
        assert_eq!(range.counters().count(), 0);
    }

    #[test]
    fn test_oversized_chunk_covers_whole_range() {
        let range = CandidateRange::new(5, 50).unwrap();

        assert_eq!(range.chunk_count(u64::MAX), 1);
        assert_eq!(range.chunk(0, u64::MAX), range);
        assert!(range.chunk(1, u64::MAX).is_empty());
        assert!(range.chunk(u64::MAX, 2).is_empty());
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let range = CandidateRange::new(0, 3).unwrap();
        assert_eq!(range.chunk_count(0), 3);
        assert_eq!(range.chunk(1, 0).len(), 1);
    }
}
