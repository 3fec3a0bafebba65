//! Benchmarks for table loading and lookups.
//!
//! Performance budgets:
//! - parse + build of the 434-message Slovenian resource: < 2ms
//! - simple lookup (hit or miss): < 200ns
//! - plural lookup: < 300ns
//!
//! Run with: cargo bench -p quill-i18n --bench lookup_bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use quill_i18n::{LoadConfig, load_str, parse_ts, write_ts};

const RESOURCE: &str = include_str!("../tests/fixtures/writer_sl.ts");

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("i18n/load");
    let config = LoadConfig::default();

    group.bench_function("parse_ts", |b| {
        b.iter(|| black_box(parse_ts(black_box(RESOURCE))))
    });

    group.bench_function("load_str", |b| {
        b.iter(|| black_box(load_str(black_box(RESOURCE), &config)))
    });

    let doc = parse_ts(RESOURCE).expect("resource parses");
    group.bench_function("write_ts", |b| b.iter(|| black_box(write_ts(black_box(&doc)))));

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("i18n/lookup");
    let table = load_str(RESOURCE, &LoadConfig::default()).expect("resource loads");

    group.bench_function("hit", |b| {
        b.iter(|| black_box(table.lookup(black_box("Alert"), black_box("Close (%1)"))))
    });

    group.bench_function("miss", |b| {
        b.iter(|| black_box(table.lookup(black_box("Alert"), black_box("Unknown Source"))))
    });

    group.bench_function("plural", |b| {
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            black_box(table.lookup_plural(black_box("DailyProgress"), "%Ln word(s)", n))
        })
    });

    group.bench_function("format_plural", |b| {
        b.iter(|| {
            black_box(table.format_plural(
                black_box("DailyProgress"),
                "%L1% of %Ln minute(s)",
                black_box(7),
                &["42"],
            ))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_load, bench_lookup);
criterion_main!(benches);
