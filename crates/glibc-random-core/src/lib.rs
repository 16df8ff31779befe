//! Bit-exact reimplementation of the glibc `random()` generator.
//!
//! The generator is the TYPE_3 additive-feedback table used by glibc's
//! `random`/`srandom` (and `rand`/`srand`, which share it). Given the same
//! 32-bit seed it yields the same 31-bit output stream, without linking or
//! calling the C library.
//!
//! Everything here is safe Rust with no I/O. Conformance tooling lives in the
//! `glibc-random-harness` crate.

#![forbid(unsafe_code)]

pub mod stdlib;

pub use stdlib::random::{
    Draws, GlibcRandom, LAG_LONG, LAG_SHORT, RAND_MAX, RandomError, TABLE_WORDS, outputs,
};
pub use stdlib::seed_search::SeedSearch;
