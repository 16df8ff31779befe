//! Integration test: checked-in reference fixtures under `tests/conformance/fixtures`.
//!
//! Validates:
//! 1. Every fixture file parses and carries the expected family/version.
//! 2. The generator passes every case, including the long digest runs.
//! 3. Host-captured seeds stay inside the range where host glibc agrees.

use std::path::{Path, PathBuf};

use glibc_random_harness::capture::host_compatible_seed;
use glibc_random_harness::{FixtureSet, TestRunner, VerificationSummary};

fn workspace_root() -> PathBuf {
    let manifest = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest)
        .parent()
        .expect("harness crate parent")
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    workspace_root().join("tests/conformance/fixtures")
}

fn load_all() -> Vec<FixtureSet> {
    FixtureSet::load_dir(&fixture_dir())
        .expect("fixture dir should be readable")
        .into_iter()
        .map(|(path, set)| set.unwrap_or_else(|e| panic!("{} failed to parse: {e}", path.display())))
        .collect()
}

#[test]
fn fixture_pack_has_required_shape() {
    let sets = load_all();
    assert!(sets.len() >= 2, "expected host and edge-seed fixture files");
    for set in &sets {
        assert_eq!(set.version, "v1");
        assert_eq!(set.family, "stdlib/random");
        assert!(!set.cases.is_empty());
        for case in &set.cases {
            assert!(
                case.expected_outputs.is_some() || case.expected_sha256.is_some(),
                "case {} has no expectation",
                case.name
            );
        }
    }
}

#[test]
fn generator_passes_every_fixture_case() {
    let runner = TestRunner::new("fixture-pack");
    let results = load_all().iter().flat_map(|set| runner.run(set)).collect();
    let summary = VerificationSummary::from_results(results);
    let failures: Vec<_> = summary
        .results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| format!("{}: {}", r.case_name, r.detail))
        .collect();
    assert!(failures.is_empty(), "failures: {failures:#?}");
    assert!(summary.total >= 10);
}

#[test]
fn host_fixture_seeds_are_host_compatible() {
    let set = FixtureSet::from_file(&fixture_dir().join("random_host_glibc.v1.json"))
        .expect("host fixture should load");
    assert!(set.source.contains("glibc"));
    for case in &set.cases {
        assert!(host_compatible_seed(case.seed), "seed {:#x}", case.seed);
    }
    let seed_one = set
        .cases
        .iter()
        .find(|c| c.seed == 1 && c.expected_outputs.is_some())
        .expect("seed 1 golden vector");
    assert_eq!(
        seed_one.expected_outputs.as_deref().map(|v| &v[..5]),
        Some(&[1_804_289_383, 846_930_886, 1_681_692_777, 1_714_636_915, 1_957_747_793][..])
    );
}

#[test]
fn edge_fixture_covers_divergent_seeds() {
    let set = FixtureSet::from_file(&fixture_dir().join("random_edge_seeds.v1.json"))
        .expect("edge fixture should load");
    let seeds: Vec<u32> = set.cases.iter().map(|c| c.seed).collect();
    for seed in [0, 0x7FFF_FFFF, 0x8000_0000, u32::MAX] {
        assert!(seeds.contains(&seed), "missing seed {seed:#x}");
        assert!(!host_compatible_seed(seed));
    }
}
