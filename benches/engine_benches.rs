use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use veritas_numeris::numerical::engine;
use veritas_numeris::symbolic::symbolic_engine::Expr;

fn bench_parse_and_differentiate(c: &mut Criterion) {
    let input = "exp(-x^2) * sin(3x) + ln(x^2 + 1) / (x + 2)";
    c.bench_function("parse and differentiate", |b| {
        b.iter(|| {
            let f = Expr::parse_expression(black_box(input)).unwrap();
            f.differentiate()
        })
    });
}

fn bench_root_finding(c: &mut Criterion) {
    let mut group = c.benchmark_group("root finding");
    group.bench_function("bisection", |b| {
        b.iter(|| engine::bisection("1", "2", black_box("x^3 - 2x - 5"), 1e-10, 200, false))
    });
    group.bench_function("newton", |b| {
        b.iter(|| engine::newton("2", black_box("x^3 - 2x - 5"), 1e-10, 200, false))
    });
    group.bench_function("secant", |b| {
        b.iter(|| engine::secant("2", "3", black_box("x^3 - 2x - 5"), 1e-10, 200, false))
    });
    group.finish();
}

fn bench_interpolation(c: &mut Criterion) {
    let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
    let y: Vec<f64> = x.iter().map(|v| v.sin()).collect();
    let mut group = c.benchmark_group("interpolation");
    group.bench_function("lagrange", |b| b.iter(|| engine::lagrange(black_box(&x), &y)));
    group.bench_function("cubic spline", |b| {
        b.iter(|| engine::cubic_spline(black_box(&x), &y))
    });
    group.finish();
}

fn bench_stationary(c: &mut Criterion) {
    let n = 30;
    let a: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| match (i as i64 - j as i64).abs() {
                    0 => 4.0,
                    1 => -1.0,
                    _ => 0.0,
                })
                .collect()
        })
        .collect();
    let b = vec![1.0; n];
    let x0 = vec![0.0; n];
    let mut group = c.benchmark_group("stationary");
    group.bench_function("jacobi", |bencher| {
        bencher.iter(|| engine::jacobi(black_box(&a), &b, &x0, 1e-10, 500, false))
    });
    group.bench_function("sor", |bencher| {
        bencher.iter(|| engine::sor(black_box(&a), &b, &x0, 1.2, 1e-10, 500, false))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_and_differentiate,
    bench_root_finding,
    bench_interpolation,
    bench_stationary
);
criterion_main!(benches);
