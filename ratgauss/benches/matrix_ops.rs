use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::SmallRng, SeedableRng};
use ratgauss::{RatMatrix, RatVec};
use std::hint::black_box;

const SIZES: [usize; 3] = [4, 6, 8];

fn bench_determinant(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinant");
    let mut rng = SmallRng::seed_from_u64(1);
    for size in SIZES {
        let m = RatMatrix::random_invertible(&mut rng, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &m, |b, m| {
            b.iter(|| black_box(m).determinant())
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    let mut rng = SmallRng::seed_from_u64(1);
    for size in SIZES {
        let m = RatMatrix::random_invertible(&mut rng, size);
        let rhs = RatVec::random(&mut rng, size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), &(m, rhs), |b, (m, rhs)| {
            b.iter(|| black_box(m).solve(black_box(rhs)))
        });
    }
    group.finish();
}

fn bench_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("inverse");
    let mut rng = SmallRng::seed_from_u64(1);
    for size in SIZES {
        let m = RatMatrix::random_invertible(&mut rng, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &m, |b, m| {
            b.iter(|| black_box(m).inverse())
        });
    }
    group.finish();
}

fn bench_mul(c: &mut Criterion) {
    let mut group = c.benchmark_group("mul");
    let mut rng = SmallRng::seed_from_u64(1);
    for size in SIZES {
        let m1 = RatMatrix::random(&mut rng, size, size, 10);
        let m2 = RatMatrix::random(&mut rng, size, size, 10);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(m1, m2),
            |b, (m1, m2)| b.iter(|| black_box(m1).try_mul(black_box(m2))),
        );
    }
    group.finish();
}

criterion_group!(
    matrix_ops,
    bench_determinant,
    bench_solve,
    bench_inverse,
    bench_mul
);
criterion_main!(matrix_ops);
