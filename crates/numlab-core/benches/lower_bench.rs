use criterion::{Criterion, black_box, criterion_group, criterion_main};
use numlab_core::lower::{LowerOptions, lower};
use numlab_core::numeric::NumericKind;
use numlab_core::parser;

fn bench_lower_logistic(c: &mut Criterion) {
    let ast = parser::parse("4x*(1-x)", "bench").unwrap();
    c.bench_function("lower logistic map", |b| {
        b.iter(|| lower(black_box(&ast), &NumericKind::Float64, &LowerOptions::default()))
    });
}

fn bench_lower_polynomial(c: &mut Criterion) {
    let ast = parser::parse("x^5 - 3x^4 + 2x^3 / 7 - x^2 + 0.5x - 1", "bench").unwrap();
    c.bench_function("lower polynomial with conversions", |b| {
        b.iter(|| lower(black_box(&ast), &NumericKind::Int, &LowerOptions::default()))
    });
}

criterion_group!(benches, bench_lower_logistic, bench_lower_polynomial);
criterion_main!(benches);
