//! Seeding and advancement microbenchmarks.
//!
//! `seed` rebuilds the 344-word table; `next` is the per-call hot path and is
//! measured with a budget large enough that it never reseeds inside a sample.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glibc_random_core::{GlibcRandom, SeedSearch, outputs};

const NEXT_BUDGET: usize = 1 << 20;

/// Per-sample ns/op, reported as one greppable `RANDOM_BENCH` line.
#[derive(Default)]
struct BenchStats {
    ns_per_op: Vec<f64>,
    iters: u64,
    elapsed: Duration,
}

impl BenchStats {
    fn record(&mut self, iters: u64, dur: Duration) {
        self.iters = self.iters.saturating_add(iters);
        self.elapsed = self.elapsed.saturating_add(dur);
        self.ns_per_op.push(dur.as_nanos() as f64 / iters.max(1) as f64);
    }

    fn report(&self, label: &str) {
        if self.ns_per_op.is_empty() {
            return;
        }
        let mut sorted = self.ns_per_op.clone();
        sorted.sort_by(f64::total_cmp);
        let rank = |q: f64| sorted[((sorted.len() - 1) as f64 * q).round() as usize];
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let secs = self.elapsed.as_secs_f64();
        let ops_per_s = if secs > 0.0 { self.iters as f64 / secs } else { 0.0 };
        println!(
            "RANDOM_BENCH bench={label} samples={} p50_ns_op={:.3} p95_ns_op={:.3} p99_ns_op={:.3} mean_ns_op={mean:.3} ops_per_s={ops_per_s:.0}",
            sorted.len(),
            rank(0.50),
            rank(0.95),
            rank(0.99),
        );
    }
}

fn bench_seed(c: &mut Criterion) {
    let mut rng = GlibcRandom::new(0);
    let stats = RefCell::new(BenchStats::default());
    let mut group = c.benchmark_group("random_seed");
    group.throughput(Throughput::Elements(1));
    group.bench_function("seed", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for i in 0..iters {
                rng.seed(black_box(i as u32));
            }
            let dur = start.elapsed().max(Duration::from_nanos(1));
            stats.borrow_mut().record(iters, dur);
            dur
        });
    });
    group.finish();
    stats.borrow().report("seed");
}

fn bench_next(c: &mut Criterion) {
    let mut rng = GlibcRandom::seeded(1, NEXT_BUDGET);
    let stats = RefCell::new(BenchStats::default());
    let mut group = c.benchmark_group("random_next");
    group.throughput(Throughput::Elements(1));
    group.bench_function("next", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            let mut left = iters;
            while left > 0 {
                let batch = left.min(NEXT_BUDGET as u64);
                rng.seed(1);
                let start = Instant::now();
                for _ in 0..batch {
                    let _ = black_box(rng.next());
                }
                total += start.elapsed();
                left -= batch;
            }
            let dur = total.max(Duration::from_nanos(1));
            stats.borrow_mut().record(iters, dur);
            dur
        });
    });
    group.finish();
    stats.borrow().report("next");
}

fn bench_outputs(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_outputs");
    for count in [16usize, 1_024, 65_536] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(outputs(black_box(42), count)));
        });
    }
    group.finish();
}

fn bench_seed_search(c: &mut Criterion) {
    let search = SeedSearch::new(&outputs(9_999, 3));
    let mut group = c.benchmark_group("random_seed_search");
    group.throughput(Throughput::Elements(10_000));
    group.sample_size(10);
    group.bench_function("scan_10k", |b| {
        b.iter(|| black_box(search.scan(black_box(0..=9_999))));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_seed,
    bench_next,
    bench_outputs,
    bench_seed_search
);
criterion_main!(benches);
