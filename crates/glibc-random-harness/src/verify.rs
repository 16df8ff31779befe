//! Verification of the generator against fixture sets.

use glibc_random_core::GlibcRandom;
use serde::{Deserialize, Serialize};

use crate::fixtures::{FixtureCase, FixtureSet, sequence_digest};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Result of checking one fixture case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub trace_id: String,
    pub family: String,
    pub case_name: String,
    pub seed: u32,
    pub skip: usize,
    pub count: usize,
    pub passed: bool,
    /// Why the case failed; empty when it passed.
    pub detail: String,
}

/// Pass/fail tally over a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs fixture cases against [`GlibcRandom`].
#[derive(Debug, Clone)]
pub struct TestRunner {
    campaign: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: &str) -> Self {
        Self {
            campaign: campaign.to_string(),
        }
    }

    /// Checks every case in `set`.
    #[must_use]
    pub fn run(&self, set: &FixtureSet) -> Vec<VerificationResult> {
        set.cases
            .iter()
            .map(|case| self.run_case(&set.family, case))
            .collect()
    }

    /// Checks every case in `set`, emitting one log entry per case.
    pub fn run_logged(
        &self,
        set: &FixtureSet,
        emitter: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::with_capacity(set.cases.len());
        for case in &set.cases {
            let res = self.run_case(&set.family, case);
            emitter.emit_entry(case_log_entry(&res))?;
            results.push(res);
        }
        Ok(results)
    }

    fn run_case(&self, family: &str, case: &FixtureCase) -> VerificationResult {
        let detail = match check_case(case) {
            Ok(()) => String::new(),
            Err(detail) => detail,
        };
        VerificationResult {
            trace_id: format!("{}::{}::{}", self.campaign, family, case.name),
            family: family.to_string(),
            case_name: case.name.clone(),
            seed: case.seed,
            skip: case.skip,
            count: case.count,
            passed: detail.is_empty(),
            detail,
        }
    }
}

fn check_case(case: &FixtureCase) -> Result<(), String> {
    if case.expected_outputs.is_none() && case.expected_sha256.is_none() {
        return Err("case has neither expected_outputs nor expected_sha256".to_string());
    }

    let budget = case
        .skip
        .checked_add(case.count)
        .ok_or_else(|| "skip + count overflows".to_string())?;
    let mut rng = GlibcRandom::try_new(budget).map_err(|e| e.to_string())?;
    rng.seed(case.seed);
    rng.skip(case.skip).map_err(|e| e.to_string())?;
    let mut actual = vec![0u32; case.count];
    rng.fill(&mut actual).map_err(|e| e.to_string())?;

    if let Some(expected) = &case.expected_outputs {
        compare_outputs(expected, &actual)?;
    }
    if let Some(expected) = &case.expected_sha256 {
        let digest = sequence_digest(&actual);
        if !digest.eq_ignore_ascii_case(expected.trim()) {
            return Err(format!("sha256 mismatch: expected {expected}, got {digest}"));
        }
    }
    Ok(())
}

fn compare_outputs(expected: &[u32], actual: &[u32]) -> Result<(), String> {
    if expected.len() != actual.len() {
        return Err(format!(
            "expected {} outputs but case count is {}",
            expected.len(),
            actual.len()
        ));
    }
    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        Some(i) => Err(format!(
            "first mismatch at output {i}: expected {}, got {}",
            expected[i], actual[i]
        )),
        None => Ok(()),
    }
}

fn case_log_entry(res: &VerificationResult) -> LogEntry {
    let (level, outcome) = if res.passed {
        (LogLevel::Info, Outcome::Pass)
    } else {
        (LogLevel::Error, Outcome::Fail)
    };
    LogEntry::new(&res.trace_id, level, "verify.case")
        .with_family(&res.family)
        .with_outcome(outcome)
        .with_details(serde_json::json!({
            "case": res.case_name,
            "seed": res.seed,
            "skip": res.skip,
            "count": res.count,
            "detail": res.detail,
        }))
}
