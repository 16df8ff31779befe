//! Criterion benchmarks for `glibc-random-core`; see `benches/random_bench.rs`.
