//! Capture of reference vectors from the host C library.
//!
//! Only meaningful on glibc hosts, where `rand` and `random` share the TYPE_3
//! generator. glibc maps seed 0 to 1, reduces `0x7fff_ffff` to 0 and seeds the
//! table with signed arithmetic, so host output only agrees with the unsigned
//! recurrence for seeds in `1..=0x7fff_fffe`. Other seeds are refused.

use std::fmt;

use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::utc_timestamp;

/// Fixture family written by [`capture_host`].
pub const CAPTURE_FAMILY: &str = "stdlib/random";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// The host treats this seed differently from the recurrence.
    SeedOutOfHostRange(u32),
    /// Not running on a glibc host.
    Unsupported,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeedOutOfHostRange(seed) => write!(
                f,
                "seed {seed:#x} is outside 1..=0x7ffffffe where host glibc agrees"
            ),
            Self::Unsupported => f.write_str("host capture requires a glibc target"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Whether host glibc seeds `seed` the same way as the unsigned recurrence.
#[must_use]
pub fn host_compatible_seed(seed: u32) -> bool {
    (1..=0x7FFF_FFFE).contains(&seed)
}

/// Captures `count` outputs per seed from the host `srand`/`rand`.
pub fn capture_host(seeds: &[u32], count: usize) -> Result<FixtureSet, CaptureError> {
    if let Some(bad) = seeds.iter().find(|s| !host_compatible_seed(**s)) {
        return Err(CaptureError::SeedOutOfHostRange(*bad));
    }
    let cases = seeds
        .iter()
        .map(|seed| {
            Ok(FixtureCase {
                name: format!("host_seed_{seed}"),
                seed: *seed,
                count,
                skip: 0,
                expected_outputs: Some(host::draw(*seed, count)?),
                expected_sha256: None,
            })
        })
        .collect::<Result<Vec<_>, CaptureError>>()?;

    Ok(FixtureSet {
        version: "v1".to_string(),
        family: CAPTURE_FAMILY.to_string(),
        captured_at: utc_timestamp(),
        source: "host glibc srand/rand".to_string(),
        cases,
    })
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
mod host {
    use std::sync::Mutex;

    use super::CaptureError;

    // rand() state is process-global.
    static HOST_RAND: Mutex<()> = Mutex::new(());

    pub(super) fn draw(seed: u32, count: usize) -> Result<Vec<u32>, CaptureError> {
        let _guard = HOST_RAND.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: srand/rand have no pointer arguments; the lock serializes
        // access to libc's global generator state within this process.
        unsafe { libc::srand(seed) };
        Ok((0..count)
            .map(|_| {
                // SAFETY: see above.
                let v = unsafe { libc::rand() };
                v as u32
            })
            .collect())
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
mod host {
    use super::CaptureError;

    pub(super) fn draw(_seed: u32, _count: usize) -> Result<Vec<u32>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_outside_host_range_are_refused() {
        assert_eq!(
            capture_host(&[1, 0], 4),
            Err(CaptureError::SeedOutOfHostRange(0))
        );
        assert_eq!(
            capture_host(&[0x8000_0000], 4),
            Err(CaptureError::SeedOutOfHostRange(0x8000_0000))
        );
        assert!(host_compatible_seed(0x7FFF_FFFE));
        assert!(!host_compatible_seed(0x7FFF_FFFF));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn host_capture_agrees_with_recurrence() {
        let set = capture_host(&[1, 42, 0x7FFF_FFFE], 50).unwrap();
        assert_eq!(set.cases.len(), 3);
        for case in &set.cases {
            assert_eq!(
                case.expected_outputs.as_deref(),
                Some(&glibc_random_core::outputs(case.seed, 50)[..]),
                "seed {}",
                case.seed
            );
        }
    }
}
