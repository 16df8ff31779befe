//! Harness configuration from the environment.
//!
//! CLI flags override these values; unset or malformed variables fall back to
//! the defaults.

use std::path::PathBuf;

/// JSONL log destination.
pub const ENV_LOG: &str = "GLIBC_RANDOM_LOG";
/// Default call budget for `generate` and `search`.
pub const ENV_MAX_CALLS: &str = "GLIBC_RANDOM_MAX_CALLS";
/// Worker threads for `search`.
pub const ENV_WORKERS: &str = "GLIBC_RANDOM_WORKERS";

pub const DEFAULT_MAX_CALLS: usize = 4096;
pub const DEFAULT_WORKERS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub log_path: Option<PathBuf>,
    pub max_calls: usize,
    pub workers: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            max_calls: DEFAULT_MAX_CALLS,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let log_path = lookup(ENV_LOG)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        let max_calls = lookup(ENV_MAX_CALLS)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_calls);
        let workers = lookup(ENV_WORKERS)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.workers);
        Self {
            log_path,
            max_calls,
            workers,
        }
    }
}
