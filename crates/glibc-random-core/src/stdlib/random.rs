//! Pseudo-random number generation.
//!
//! Implements the additive-feedback generator behind glibc's `random`/`srandom`
//! contract (TYPE_3: a 31-word lag table with taps at 31 and 3, warmed up by
//! discarding 310 words). `rand`/`srand` in glibc share this generator, so the
//! same stream answers both.
//!
//! Unlike the C original, the history buffer is an owned `Vec<u32>` sized from
//! a call budget declared at construction, and [`GlibcRandom::next`] refuses to
//! run past it instead of writing out of bounds.

use std::fmt;

/// RAND_MAX = 2^31 - 1 (matching glibc).
pub const RAND_MAX: u32 = 0x7FFF_FFFF;

/// Words filled by seeding: 34 table words plus the 310 discarded warm-up draws.
pub const TABLE_WORDS: usize = 344;

/// Long feedback lag.
pub const LAG_LONG: usize = 31;

/// Short feedback lag.
pub const LAG_SHORT: usize = 3;

/// Words produced by the Park-Miller recurrence during seeding (`buffer[0..31]`).
const LCG_WORDS: usize = 31;

/// Multiplier of the minimal-standard Park-Miller generator used for seeding.
const PARK_MILLER_MULTIPLIER: u64 = 16_807;

/// Low 31 bits; also the Mersenne modulus `2^31 - 1`.
const LOW31: u64 = 0x7FFF_FFFF;

/// Errors reported by [`GlibcRandom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomError {
    /// `next` was called before `seed`.
    Unseeded,
    /// The call budget declared at construction has been used up.
    Exhausted { max_calls: usize },
    /// No buffer could be allocated for the requested call budget.
    Capacity { max_calls: usize },
}

impl fmt::Display for RandomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unseeded => f.write_str("generator used before it was seeded"),
            Self::Exhausted { max_calls } => {
                write!(f, "generator exhausted its budget of {max_calls} calls")
            }
            Self::Capacity { max_calls } => {
                write!(f, "cannot allocate a buffer for {max_calls} calls")
            }
        }
    }
}

impl std::error::Error for RandomError {}

/// State of one glibc `random()` stream.
///
/// The buffer holds `TABLE_WORDS + max_calls + 1` words. Positions
/// `0..TABLE_WORDS` are fixed by the seed; every call to [`next`](Self::next)
/// appends one more word at the cursor.
#[derive(Clone)]
pub struct GlibcRandom {
    buffer: Vec<u32>,
    cursor: usize,
    seeded: bool,
}

impl fmt::Debug for GlibcRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlibcRandom")
            .field("seeded", &self.seeded)
            .field("cursor", &self.cursor)
            .field("max_calls", &self.max_calls())
            .field("calls_made", &self.calls_made())
            .finish_non_exhaustive()
    }
}

impl GlibcRandom {
    /// Allocates an unseeded generator that supports `max_calls` draws per seeding.
    ///
    /// # Panics
    ///
    /// Panics if the buffer for `max_calls` words cannot be allocated. Use
    /// [`try_new`](Self::try_new) when the budget comes from untrusted input.
    #[must_use]
    pub fn new(max_calls: usize) -> Self {
        match Self::try_new(max_calls) {
            Ok(rng) => rng,
            Err(err) => panic!("{err}"),
        }
    }

    /// Allocates an unseeded generator, failing with [`RandomError::Capacity`]
    /// if the buffer size overflows or the allocation is refused.
    pub fn try_new(max_calls: usize) -> Result<Self, RandomError> {
        let capacity = max_calls
            .checked_add(TABLE_WORDS + 1)
            .ok_or(RandomError::Capacity { max_calls })?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| RandomError::Capacity { max_calls })?;
        buffer.resize(capacity, 0);
        Ok(Self {
            buffer,
            cursor: TABLE_WORDS,
            seeded: false,
        })
    }

    /// Allocates a generator and seeds it in one step. Panics like [`new`](Self::new).
    #[must_use]
    pub fn seeded(seed: u32, max_calls: usize) -> Self {
        let mut rng = Self::new(max_calls);
        rng.seed(seed);
        rng
    }

    /// Seeds the generator, equivalent to glibc's `srandom(seed)`.
    ///
    /// Every value is accepted, zero included (it yields an all-zero stream).
    /// Reseeding overwrites the whole table and restores the full call budget.
    pub fn seed(&mut self, seed: u32) {
        let table = &mut self.buffer[..TABLE_WORDS];
        table[0] = seed;
        for i in 1..LCG_WORDS {
            table[i] = park_miller(table[i - 1]);
        }
        for i in LCG_WORDS..LCG_WORDS + LAG_SHORT {
            table[i] = table[i - LAG_LONG];
        }
        for i in LCG_WORDS + LAG_SHORT..TABLE_WORDS {
            table[i] = table[i - LAG_LONG].wrapping_add(table[i - LAG_SHORT]);
        }
        self.cursor = TABLE_WORDS;
        self.seeded = true;
    }

    /// Returns the next output in `[0, RAND_MAX]`, equivalent to glibc's `random()`.
    ///
    /// Fails with [`RandomError::Unseeded`] before the first `seed`, and with
    /// [`RandomError::Exhausted`] once `max_calls` outputs have been drawn. A
    /// failed call leaves the state untouched.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<u32, RandomError> {
        self.check_available(1)?;
        Ok(self.step())
    }

    /// Fills `dst` with consecutive outputs.
    ///
    /// The budget is checked up front: if fewer than `dst.len()` draws remain,
    /// nothing is drawn and `dst` is left as it was.
    pub fn fill(&mut self, dst: &mut [u32]) -> Result<(), RandomError> {
        self.check_available(dst.len())?;
        for slot in dst.iter_mut() {
            *slot = self.step();
        }
        Ok(())
    }

    /// Discards `count` outputs, failing without advancing if the budget is short.
    pub fn skip(&mut self, count: usize) -> Result<(), RandomError> {
        self.check_available(count)?;
        for _ in 0..count {
            self.step();
        }
        Ok(())
    }

    /// Iterates over the remaining outputs until the budget is exhausted.
    ///
    /// Yields nothing on an unseeded generator.
    pub fn draws(&mut self) -> Draws<'_> {
        Draws { rng: self }
    }

    /// Call budget declared at construction.
    #[must_use]
    pub fn max_calls(&self) -> usize {
        self.buffer.len() - TABLE_WORDS - 1
    }

    /// Outputs drawn since the last `seed`.
    #[must_use]
    pub fn calls_made(&self) -> usize {
        self.cursor - TABLE_WORDS
    }

    /// Draws left before `next` reports [`RandomError::Exhausted`].
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.max_calls() - self.calls_made()
    }

    /// Index of the next buffer word to be written.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether `seed` has run on this instance.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    fn check_available(&self, count: usize) -> Result<(), RandomError> {
        if !self.seeded {
            return Err(RandomError::Unseeded);
        }
        if count > self.remaining() {
            return Err(RandomError::Exhausted {
                max_calls: self.max_calls(),
            });
        }
        Ok(())
    }

    /// Advances one word. Callers must have checked the budget.
    #[inline]
    fn step(&mut self) -> u32 {
        let i = self.cursor;
        self.cursor += 1;
        let word = self.buffer[i - LAG_LONG].wrapping_add(self.buffer[i - LAG_SHORT]);
        self.buffer[i] = word;
        word >> 1
    }
}

/// Iterator returned by [`GlibcRandom::draws`].
#[derive(Debug)]
pub struct Draws<'a> {
    rng: &'a mut GlibcRandom,
}

impl Iterator for Draws<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.rng.next().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.rng.is_seeded() {
            self.rng.remaining()
        } else {
            0
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Draws<'_> {}

/// Returns the first `count` outputs of `random()` after `srandom(seed)`.
///
/// Panics if `count` is too large to allocate, as [`GlibcRandom::new`] does.
#[must_use]
pub fn outputs(seed: u32, count: usize) -> Vec<u32> {
    let mut rng = GlibcRandom::seeded(seed, count);
    (0..count).map(|_| rng.step()).collect()
}

/// One step of `x * 16807 mod (2^31 - 1)`.
///
/// Sum-of-digits reduction in base 2^31, at most two passes for a `u32` input.
/// This matches `%` except when the product is a nonzero multiple of the
/// modulus (inputs `0x7fff_ffff` and `0xffff_fffe`): there it returns
/// `0x7fff_ffff` instead of 0, and glibc's table depends on that.
#[inline]
fn park_miller(prev: u32) -> u32 {
    let p = PARK_MILLER_MULTIPLIER * u64::from(prev);
    let m = (p >> 31) + (p & LOW31);
    let m = if m & !LOW31 != 0 {
        (m >> 31) + (m & LOW31)
    } else {
        m
    };
    // p < 2^46, so after at most two passes m <= 2^31 - 1.
    m as u32
}
