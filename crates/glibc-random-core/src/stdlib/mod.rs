//! Standard library utilities.
//!
//! Implements the `<stdlib.h>` random-number family: the additive-feedback
//! generator behind `random`/`rand` and seed recovery on top of it.

pub mod random;
pub mod seed_search;

pub use random::{GlibcRandom, RAND_MAX, RandomError, outputs};
pub use seed_search::SeedSearch;
