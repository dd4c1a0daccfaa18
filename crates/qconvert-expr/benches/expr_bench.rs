//! Benchmarks for expression evaluation
//!
//! Run with: cargo bench -p qconvert-expr

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qconvert_expr::{Bindings, Evaluator, parse};

const U3_CELL: &str = "exp(i * lambda + i * phi) * cos(theta / 2)";

fn bench_compile(c: &mut Criterion) {
    c.bench_function("parse_u3_cell", |b| {
        b.iter(|| parse(black_box(U3_CELL)).unwrap());
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_u3_cell");
    let params = Bindings::new()
        .with("theta", 0.3)
        .with("phi", 0.2)
        .with("lambda", 0.1);

    group.bench_function("cold_cache", |b| {
        b.iter(|| {
            let evaluator = Evaluator::new();
            evaluator.evaluate(black_box(U3_CELL), &params).unwrap()
        });
    });

    let evaluator = Evaluator::new();
    group.bench_function("warm_cache", |b| {
        b.iter(|| evaluator.evaluate(black_box(U3_CELL), &params).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_evaluate);
criterion_main!(benches);
