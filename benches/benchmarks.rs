// benches/benchmarks.rs — CPU-side benchmarks.
//
//   cargo bench --bench benchmarks
//
// Covers the host work of a pass (generation and reduction) plus the CPU
// reference classifier the GPU kernel is measured against.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use gpu_pi::classify::classify_all;
use gpu_pi::reduce::{reduce, reference_estimate};
use gpu_pi::PointSet;

const SIZES: [usize; 3] = [10_000, 100_000, 1_000_000];

// ============================================================
// Generation
// ============================================================

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for &n in &SIZES {
        group.bench_with_input(BenchmarkId::new("seeded_chacha8", n), &n, |b, &n| {
            b.iter(|| PointSet::generate_seeded(n, 7).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("thread_rng", n), &n, |b, &n| {
            b.iter(|| PointSet::generate(n).unwrap())
        });
    }
    group.finish();
}

// ============================================================
// Classification + reduction
// ============================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for &n in &SIZES {
        let set = PointSet::generate_seeded(n, 7).unwrap();
        group.bench_with_input(BenchmarkId::new("classify_all", n), &set, |b, set| {
            b.iter(|| classify_all(set))
        });
        group.bench_with_input(BenchmarkId::new("reference_estimate", n), &set, |b, set| {
            b.iter(|| reference_estimate(set))
        });
    }
    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    for &n in &SIZES {
        let values = classify_all(&PointSet::generate_seeded(n, 7).unwrap());
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| reduce(values, values.len()).unwrap())
        });
    }
    group.finish();
}

// ============================================================
// Register
// ============================================================

criterion_group!(benches, bench_generate, bench_classify, bench_reduce);
criterion_main!(benches);
