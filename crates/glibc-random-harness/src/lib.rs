//! Conformance harness for glibc-random.
//!
//! Loads JSON fixture sets, runs them against `GlibcRandom`, and renders
//! markdown/JSON reports with a JSONL structured log. On glibc hosts it can
//! also capture fresh reference vectors from the host `srand`/`rand`.

pub mod capture;
pub mod config;
pub mod fixtures;
pub mod report;
pub mod structured_log;
pub mod verify;

pub use config::HarnessConfig;
pub use fixtures::{FixtureCase, FixtureSet, parse_seed, sequence_digest};
pub use report::ConformanceReport;
pub use verify::{TestRunner, VerificationResult, VerificationSummary};
