//! Benchmarks for indicator and position evaluation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use xau_trader::indicator::IndicatorEngine;
use xau_trader::position::{PositionParams, PositionStateMachine};
use xau_trader::signal::Side;

fn closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 2000.0 + (i as f64 * 0.1).sin() * 15.0 + i as f64 * 0.02)
        .collect()
}

fn benchmark_snapshot(c: &mut Criterion) {
    let engine = IndicatorEngine::default();
    let series = closes(1000);

    c.bench_function("indicator_snapshot_1000", |b| {
        b.iter(|| engine.snapshot(black_box(&series)))
    });
}

fn benchmark_advance(c: &mut Criterion) {
    let prices: Vec<Decimal> = closes(500)
        .into_iter()
        .map(|p| Decimal::from_f64_retain(p).unwrap_or(dec!(2000)).round_dp(2))
        .collect();

    c.bench_function("position_advance_500", |b| {
        b.iter(|| {
            let mut machine = PositionStateMachine::new(PositionParams::default());
            for (i, price) in prices.iter().enumerate() {
                let signal = if i % 50 == 0 { Some(Side::Buy) } else { None };
                black_box(machine.advance(*price, signal, dec!(0.01)));
            }
        })
    });
}

criterion_group!(benches, benchmark_snapshot, benchmark_advance);
criterion_main!(benches);
