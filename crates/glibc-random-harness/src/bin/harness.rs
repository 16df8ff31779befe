//! CLI entrypoint for the glibc-random conformance harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use glibc_random_core::{GlibcRandom, SeedSearch};
use glibc_random_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use glibc_random_harness::{
    ConformanceReport, FixtureSet, HarnessConfig, TestRunner, VerificationSummary, capture,
    parse_seed, structured_log,
};

const RUN_ID: &str = "glibc-random-verify";

/// Reproduce and verify the glibc random() stream.
#[derive(Debug, Parser)]
#[command(name = "glibc-random-harness")]
#[command(about = "Reproduce and verify the glibc random() output stream")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the outputs of random() after srandom(seed).
    Generate {
        /// Seed, decimal or 0x-prefixed hex.
        #[arg(long, value_parser = parse_seed)]
        seed: u32,
        /// Number of outputs to print.
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Outputs to discard first.
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Verify the generator against fixture JSON files.
    Verify {
        /// Fixture JSON file, or a directory of them.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown); JSON is written alongside.
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL log path (overrides GLIBC_RANDOM_LOG).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Capture reference vectors from the host C library (glibc only).
    Capture {
        /// Comma-separated seeds in 1..=0x7ffffffe.
        #[arg(long, value_delimiter = ',', value_parser = parse_seed, required = true)]
        seeds: Vec<u32>,
        /// Outputs captured per seed.
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Output fixture JSON path.
        #[arg(long)]
        output: PathBuf,
    },
    /// Find seeds whose stream reproduces the observed outputs.
    Search {
        /// Comma-separated observed outputs, in draw order.
        #[arg(long, value_delimiter = ',', required = true)]
        observed: Vec<u32>,
        /// Outputs drawn before the first observed value.
        #[arg(long, default_value_t = 0)]
        skip: usize,
        /// First candidate seed.
        #[arg(long, value_parser = parse_seed, default_value = "0")]
        from: u32,
        /// Last candidate seed (inclusive).
        #[arg(long, value_parser = parse_seed, default_value = "0xffffffff")]
        to: u32,
        /// Worker threads (overrides GLIBC_RANDOM_WORKERS).
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = HarnessConfig::from_env();

    match cli.command {
        Command::Generate {
            seed,
            count,
            skip,
            format,
        } => generate(&config, seed, count, skip, format),
        Command::Verify {
            fixture,
            report,
            log,
        } => verify(&fixture, report.as_deref(), log.or(config.log_path)),
        Command::Capture {
            seeds,
            count,
            output,
        } => {
            eprintln!(
                "Capturing {count} outputs for {} seed(s) to {}",
                seeds.len(),
                output.display()
            );
            let set = capture::capture_host(&seeds, count)?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, set.to_json()?)?;
            Ok(())
        }
        Command::Search {
            observed,
            skip,
            from,
            to,
            workers,
        } => {
            let search = SeedSearch::new(&observed).with_skip(skip);
            check_budget(&config, search.budget())?;
            let workers = workers.unwrap_or(config.workers);
            eprintln!("Searching seeds {from:#x}..={to:#x} with {workers} worker(s)");
            let seeds = search.scan_parallel(from..=to, workers);
            for seed in &seeds {
                println!("{seed}");
            }
            eprintln!("Search complete: {} matching seed(s)", seeds.len());
            if seeds.is_empty() {
                return Err("no seed in range reproduces the observed outputs".into());
            }
            Ok(())
        }
    }
}

fn check_budget(config: &HarnessConfig, needed: usize) -> Result<(), Box<dyn std::error::Error>> {
    if needed > config.max_calls {
        return Err(format!(
            "{needed} draws exceed the call budget of {} (raise {})",
            config.max_calls,
            glibc_random_harness::config::ENV_MAX_CALLS
        )
        .into());
    }
    Ok(())
}

fn generate(
    config: &HarnessConfig,
    seed: u32,
    count: usize,
    skip: usize,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let budget = skip
        .checked_add(count)
        .ok_or("skip + count overflows")?;
    check_budget(config, budget)?;

    let mut rng = GlibcRandom::try_new(budget)?;
    rng.seed(seed);
    rng.skip(skip)?;
    let mut outputs = vec![0u32; count];
    rng.fill(&mut outputs)?;

    match format {
        OutputFormat::Text => {
            for v in &outputs {
                println!("{v}");
            }
        }
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "seed": seed,
                "skip": skip,
                "count": count,
                "outputs": outputs,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn load_fixtures(fixture: &Path) -> Result<Vec<FixtureSet>, Box<dyn std::error::Error>> {
    if !fixture.is_dir() {
        return Ok(vec![FixtureSet::from_file(fixture)?]);
    }
    let mut sets = Vec::new();
    for (path, set) in FixtureSet::load_dir(fixture)? {
        match set {
            Ok(set) => sets.push(set),
            Err(err) => eprintln!("Skipping {}: {err}", path.display()),
        }
    }
    if sets.is_empty() {
        return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
    }
    Ok(sets)
}

fn verify(
    fixture: &Path,
    report: Option<&Path>,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let sets = load_fixtures(fixture)?;

    let mut emitter = match &log {
        Some(path) => LogEmitter::to_file(path, RUN_ID)?,
        None => LogEmitter::in_memory(RUN_ID),
    };
    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "verify.start").with_details(serde_json::json!({
            "fixture": fixture.display().to_string(),
            "sets": sets.len(),
            "cases": sets.iter().map(|s| s.cases.len()).sum::<usize>(),
        })),
    )?;

    let runner = TestRunner::new("fixture-verify");
    let mut results = Vec::new();
    for set in &sets {
        results.extend(runner.run_logged(set, &mut emitter)?);
    }
    let summary = VerificationSummary::from_results(results);

    let outcome = if summary.all_passed() {
        Outcome::Pass
    } else {
        Outcome::Fail
    };
    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "verify.summary")
            .with_outcome(outcome)
            .with_details(serde_json::json!({
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
            })),
    )?;
    emitter.flush()?;

    let report_doc = ConformanceReport {
        title: String::from("glibc-random Conformance Report"),
        timestamp: structured_log::utc_timestamp(),
        summary,
    };

    eprintln!(
        "Verification complete: total={}, passed={}, failed={}",
        report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
    );
    for r in report_doc.summary.results.iter().filter(|r| !r.passed) {
        eprintln!("[{}] FAIL {}", r.trace_id, r.detail);
    }

    if let Some(report_path) = report {
        eprintln!("Writing report to {}", report_path.display());
        std::fs::write(report_path, report_doc.to_markdown())?;
        let json_path = report_path.with_extension("json");
        std::fs::write(&json_path, report_doc.to_json())?;
    }
    if let Some(path) = &log {
        eprintln!("Structured log written to {}", path.display());
    }

    if !report_doc.summary.all_passed() {
        return Err("Conformance verification failed".into());
    }
    Ok(())
}
