//! Benchmarks for envtrend analytics over a month of readings

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use envtrend::{AnalyticsEngine, RawReading, ReadingSeries, RegressionFamily, TimeRange};
use rand::prelude::*;
use rand::rngs::StdRng;

const START_MS: i64 = 1_740_787_200_000; // 2025-03-01 00:00:00 UTC
const STEP_MS: i64 = 15 * 60 * 1000;

fn generate_raw(count: usize) -> Vec<RawReading> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            let hour = (i as f64 * 0.25) % 24.0;
            let temp = 18.0 + 6.0 * ((hour - 9.0) / 24.0 * std::f64::consts::TAU).sin();
            RawReading::new(&format!("r{}", i), START_MS + i as i64 * STEP_MS)
                .with_value("temperature", temp + rng.gen_range(-0.5..0.5))
                .with_value("humidity", 80.0 - temp + rng.gen_range(-2.0..2.0))
                .with_value("gas_level", 400.0 + rng.gen_range(0.0..150.0))
                .with_value("pressure", 1013.0 + rng.gen_range(-3.0..3.0))
        })
        .collect()
}

fn series(engine: &AnalyticsEngine, count: usize) -> ReadingSeries {
    engine.series(generate_raw(count)).unwrap()
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    let engine = AnalyticsEngine::default();
    let raw = generate_raw(2880);

    group.throughput(Throughput::Elements(raw.len() as u64));
    group.bench_function("series_2880", |b| {
        b.iter(|| black_box(engine.series(raw.clone()).unwrap()))
    });

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");
    let engine = AnalyticsEngine::default();
    let series = series(&engine, 2880);

    group.bench_function("summary_one_attribute", |b| {
        b.iter(|| black_box(engine.statistics(&series, "temperature")))
    });
    group.bench_function("daily_buckets", |b| b.iter(|| black_box(engine.daily(&series))));

    group.finish();
}

fn bench_regression(c: &mut Criterion) {
    let mut group = c.benchmark_group("regression");
    let engine = AnalyticsEngine::default();
    let series = series(&engine, 2880);

    for family in RegressionFamily::ALL {
        group.bench_function(family.as_str(), |b| {
            b.iter(|| black_box(engine.regression(&series, "humidity", family)))
        });
    }
    group.bench_function("best", |b| {
        b.iter(|| black_box(engine.best_regression(&series, "humidity")))
    });

    group.finish();
}

fn bench_trend(c: &mut Criterion) {
    let mut group = c.benchmark_group("trend");
    let engine = AnalyticsEngine::default();
    let series = series(&engine, 2880);

    for range in [TimeRange::Day, TimeRange::Week, TimeRange::Month] {
        group.bench_function(range.as_str(), |b| {
            b.iter(|| black_box(engine.trend(&series, range)))
        });
    }
    group.bench_function("compare_dates", |b| {
        b.iter(|| black_box(engine.compare_dates(&series, "2025-03-02", "2025-03-20")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_statistics,
    bench_regression,
    bench_trend
);
criterion_main!(benches);
