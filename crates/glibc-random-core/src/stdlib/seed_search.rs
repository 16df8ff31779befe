//! Seed recovery by exhaustive search.
//!
//! Given a run of outputs observed from a `random()` stream, walk a range of
//! candidate seeds and keep the ones that reproduce it. Each worker owns its
//! own [`GlibcRandom`], so the parallel scan shares no generator state.

use std::ops::RangeInclusive;

use super::random::{GlibcRandom, RAND_MAX};

/// Observed outputs to match, optionally preceded by `skip` unseen draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSearch {
    observed: Vec<u32>,
    skip: usize,
}

impl SeedSearch {
    #[must_use]
    pub fn new(observed: &[u32]) -> Self {
        Self {
            observed: observed.to_vec(),
            skip: 0,
        }
    }

    /// The observed values start after `skip` outputs have been drawn.
    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn observed(&self) -> &[u32] {
        &self.observed
    }

    #[must_use]
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Draws each candidate must support.
    #[must_use]
    pub fn budget(&self) -> usize {
        self.skip.saturating_add(self.observed.len())
    }

    /// Whether `seed` reproduces the observed values.
    ///
    /// A budget too large to allocate matches nothing.
    #[must_use]
    pub fn matches(&self, seed: u32) -> bool {
        match GlibcRandom::try_new(self.budget()) {
            Ok(mut rng) => self.matches_with(&mut rng, seed),
            Err(_) => false,
        }
    }

    /// Every seed in `range` that reproduces the observed values, ascending.
    #[must_use]
    pub fn scan(&self, range: RangeInclusive<u32>) -> Vec<u32> {
        if !self.is_satisfiable() {
            return Vec::new();
        }
        let Ok(mut rng) = GlibcRandom::try_new(self.budget()) else {
            return Vec::new();
        };
        range
            .filter(|seed| self.matches_with(&mut rng, *seed))
            .collect()
    }

    /// Same result as [`scan`](Self::scan), with the range split across
    /// `workers` scoped threads. Zero workers is treated as one.
    #[must_use]
    pub fn scan_parallel(&self, range: RangeInclusive<u32>, workers: usize) -> Vec<u32> {
        let chunks = split_range(range, workers.max(1));
        if chunks.len() <= 1 {
            return chunks
                .into_iter()
                .flat_map(|chunk| self.scan(chunk))
                .collect();
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| scope.spawn(move || self.scan(chunk)))
                .collect();
            // Chunks are disjoint and ordered, so joining in order keeps the
            // result sorted.
            let mut found = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(seeds) => found.extend(seeds),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            found
        })
    }

    /// Outputs never exceed `RAND_MAX`, so larger observations match nothing.
    fn is_satisfiable(&self) -> bool {
        self.observed.iter().all(|v| *v <= RAND_MAX)
    }

    fn matches_with(&self, rng: &mut GlibcRandom, seed: u32) -> bool {
        rng.seed(seed);
        if rng.skip(self.skip).is_err() {
            return false;
        }
        self.observed.iter().all(|want| rng.next() == Ok(*want))
    }
}

/// Splits `range` into at most `parts` contiguous, ordered, non-empty chunks.
fn split_range(range: RangeInclusive<u32>, parts: usize) -> Vec<RangeInclusive<u32>> {
    let (start, end) = (u64::from(*range.start()), u64::from(*range.end()));
    if start > end {
        return Vec::new();
    }
    let total = end - start + 1;
    let parts = (parts as u64).min(total);
    let chunk = total.div_ceil(parts);

    let mut out = Vec::with_capacity(parts as usize);
    let mut lo = start;
    while lo <= end {
        let hi = (lo + chunk - 1).min(end);
        // Both bounds lie within the original u32 range.
        out.push(lo as u32..=hi as u32);
        lo = hi + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::random::outputs;

    #[test]
    fn recovers_seed_from_first_outputs() {
        let observed = outputs(42, 3);
        let search = SeedSearch::new(&observed);
        assert!(search.matches(42));
        assert!(!search.matches(43));
        assert_eq!(search.scan(0..=1_000), vec![42]);
    }

    #[test]
    fn recovers_seed_after_skipped_outputs() {
        let stream = outputs(1_337, 12);
        let search = SeedSearch::new(&stream[8..11]).with_skip(8);
        assert_eq!(search.budget(), 11);
        assert_eq!(search.scan(1_000..=2_000), vec![1_337]);
        assert!(SeedSearch::new(&stream[8..11]).scan(1_000..=2_000).is_empty());
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        let search = SeedSearch::new(&outputs(777, 2));
        let sequential = search.scan(0..=4_000);
        assert_eq!(sequential, vec![777]);
        for workers in [0, 1, 3, 8] {
            assert_eq!(search.scan_parallel(0..=4_000, workers), sequential);
        }
    }

    #[test]
    fn scan_reaches_top_of_seed_space() {
        let search = SeedSearch::new(&outputs(u32::MAX, 2));
        assert_eq!(search.scan(u32::MAX - 16..=u32::MAX), vec![u32::MAX]);
        assert_eq!(
            search.scan_parallel(u32::MAX - 16..=u32::MAX, 4),
            vec![u32::MAX]
        );
    }

    #[test]
    fn values_above_rand_max_match_nothing() {
        let search = SeedSearch::new(&[RAND_MAX + 1]);
        assert!(search.scan(0..=100).is_empty());
    }

    #[test]
    fn unallocatable_skip_matches_nothing() {
        let search = SeedSearch::new(&[1]).with_skip(usize::MAX);
        assert_eq!(search.budget(), usize::MAX);
        assert!(!search.matches(1));
        assert!(search.scan(0..=8).is_empty());
        assert!(search.scan_parallel(0..=8, 2).is_empty());
    }

    #[test]
    fn empty_observation_matches_every_seed() {
        let search = SeedSearch::new(&[]);
        assert_eq!(search.scan(5..=9), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn all_zero_observation_recovers_zero_seed() {
        let search = SeedSearch::new(&[0, 0, 0]);
        assert_eq!(search.scan(0..=50), vec![0]);
    }

    #[test]
    fn split_range_covers_range_without_gaps() {
        let chunks = split_range(10..=20, 4);
        assert_eq!(chunks, vec![10..=12, 13..=15, 16..=18, 19..=20]);
        assert_eq!(split_range(3..=4, 8), vec![3..=3, 4..=4]);
        assert_eq!(split_range(0..=u32::MAX, 2).len(), 2);
        #[allow(clippy::reversed_empty_ranges)]
        let empty = split_range(9..=1, 2);
        assert!(empty.is_empty());
    }
}
