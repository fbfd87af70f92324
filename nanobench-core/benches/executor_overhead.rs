// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Harness overhead benchmarks.
//!
//! Measures the fixed cost the harness adds around each task invocation:
//! clock reads, record stamping and aggregator notification.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nanobench_core::{
    bytes_task, AggregatorSet, CollectingSink, Harness, Label, Phase, Preset, RunExecutor,
    RunRecord, SystemHost,
};

const PRESETS: &[Preset] = &[Preset::CpuOnly, Preset::BytesOnly, Preset::CpuAndMemory];

/// Benchmark a single measured iteration of an empty task per preset.
fn bench_single_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("executor_iteration");
    group.measurement_time(Duration::from_secs(5));

    let host = Arc::new(SystemHost::new());
    let sink = Arc::new(CollectingSink::new());
    let label = Label::new("overhead").expect("valid label");

    for &preset in PRESETS {
        group.bench_with_input(
            BenchmarkId::from_parameter(preset),
            &preset,
            |b, &preset| {
                let mut aggregators =
                    AggregatorSet::for_preset(preset, host.clone(), sink.clone());
                let mut task = bytes_task(|| black_box(64));
                let mut index = 0u32;

                b.iter(|| {
                    let record =
                        RunRecord::new(label.clone(), Phase::Measured, index % 1000, 1000);
                    let record =
                        RunExecutor::new(record, host.as_ref(), &mut aggregators).execute(&mut task);
                    index = index.wrapping_add(1);
                    black_box(record);
                });

                sink.drain();
            },
        );
    }

    group.finish();
}

/// Benchmark a complete `measure` call with no settle delay.
fn bench_full_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("harness_measure");
    group.sample_size(20);

    let sink = Arc::new(CollectingSink::new());
    let mut harness = Harness::with_host(Arc::new(SystemHost::new()), sink.clone());
    harness
        .measurements(100)
        .warm_ups(10)
        .settle_delay(Duration::ZERO)
        .cpu_only();

    group.bench_function("cpu_only_100", |b| {
        b.iter(|| {
            harness
                .measure("noop", || black_box(()))
                .expect("measure failed");
            sink.drain();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_iteration, bench_full_measure);
criterion_main!(benches);
