use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use greeks_rs::analytics::{ChainRow, find_strike_by_delta};
use greeks_rs::pricing::{BlackScholes, OptionParams, SolverConfig, bisection, solve_iv};
use std::hint::black_box;

fn bench_pricing(c: &mut Criterion) {
    let params = OptionParams::call(100.0, 100.0, 1.0, 0.05);

    c.bench_function("price_call", |b| {
        b.iter(|| BlackScholes::price(black_box(&params), black_box(0.2)))
    });
    c.bench_function("delta_call", |b| {
        b.iter(|| BlackScholes::delta(black_box(&params), black_box(0.2)))
    });
    c.bench_function("greeks_call", |b| {
        b.iter(|| BlackScholes::greeks(black_box(&params), black_box(0.2)))
    });
}

fn bench_implied_volatility(c: &mut Criterion) {
    let config = SolverConfig::default();
    let mut group = c.benchmark_group("solve_iv");

    for strike in [80.0, 100.0, 120.0] {
        let params = OptionParams::call(100.0, strike, 0.5, 0.05);
        let market_price = BlackScholes::price(&params, 0.35);
        group.bench_with_input(BenchmarkId::from_parameter(strike), &strike, |b, _| {
            b.iter(|| solve_iv(black_box(&params), black_box(market_price), &config))
        });
    }
    group.finish();

    let params = OptionParams::call(100.0, 100.0, 0.5, 0.05);
    let market_price = BlackScholes::price(&params, 0.35);
    c.bench_function("bisection_atm", |b| {
        b.iter(|| bisection(black_box(&params), black_box(market_price), &config))
    });
}

fn bench_strike_search(c: &mut Criterion) {
    let chain: Vec<ChainRow> = (40..=160)
        .map(|strike| ChainRow::new(strike as f64, 1.0, 1.1).with_iv(0.3))
        .collect();

    c.bench_function("find_strike_by_delta_121_rows", |b| {
        b.iter(|| {
            find_strike_by_delta(
                black_box(&chain),
                black_box(100.0),
                0.80,
                365,
                0.30,
                0.05,
                None,
                Some(102.0),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_pricing,
    bench_implied_volatility,
    bench_strike_search
);
criterion_main!(benches);
