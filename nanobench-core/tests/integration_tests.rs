// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for the measurement engine.
//!
//! These run real tasks against the system clock and process memory.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nanobench_core::{
    bytes_task, BenchError, CollectingSink, ConfigLoader, FakeHost, Harness, JsonReporter,
    MetricKind, Preset, SystemHost,
};

fn system_harness() -> (Harness, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let mut harness = Harness::with_host(Arc::new(SystemHost::new()), sink.clone());
    harness.settle_delay(Duration::ZERO);
    (harness, sink)
}

/// Ten 5ms sleeps should average close to 5ms.
#[test]
fn test_sleeping_task_cpu_only() {
    let (mut harness, sink) = system_harness();
    harness.measurements(10).warm_ups(0).cpu_only();

    harness
        .measure("x", || thread::sleep(Duration::from_millis(5)))
        .expect("measure should succeed");

    let avg = harness.avg_time().unwrap();
    let tps = harness.tps().unwrap();
    assert!((4.5..=6.0).contains(&avg), "avg {} ms outside timer slack", avg);
    assert!((166.0..=222.0).contains(&tps), "tps {} outside expected range", tps);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("x\tavg: "));
    assert!(lines[0].ends_with("running: 10 times"));
}

#[test]
fn test_byte_metric_average() {
    let (mut harness, sink) = system_harness();
    harness.measurements(10).warm_ups(0).bytes_only();

    let mut iteration = 0u64;
    harness
        .measure(
            "bytes",
            bytes_task(move || {
                let bytes = iteration * 100;
                iteration += 1;
                bytes
            }),
        )
        .unwrap();

    assert_eq!(harness.bytes_average().unwrap(), 450);
    assert_eq!(
        sink.lines(),
        vec!["bytes-usage: bytes\t450.0 Bytes\t0.0 Mb\n"]
    );
}

#[test]
fn test_warm_ups_excluded_from_running_count() {
    let (mut harness, sink) = system_harness();
    harness.measurements(3).warm_ups(7).cpu_only();

    let mut calls = 0;
    harness.measure("warm", || calls += 1).unwrap();

    assert_eq!(calls, 10);
    assert!(sink.lines()[0].ends_with("running: 3 times"));
}

#[test]
fn test_cpu_and_memory_report_both() {
    let (mut harness, sink) = system_harness();
    harness.measurements(5).warm_ups(2).cpu_and_memory();

    harness
        .measure("new_string", || {
            let list: Vec<String> = (0..10_000).map(|i| i.to_string()).collect();
            std::hint::black_box(list);
        })
        .unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("new_string\tavg: "));
    assert!(lines[1].starts_with("memory-usage: new_string\t"));
    assert!(lines[1].ends_with(" Mb\n"));
    assert!(harness.memory_bytes().unwrap() > 0);
}

#[test]
fn test_switching_presets() {
    let (mut harness, sink) = system_harness();
    harness.measurements(3).warm_ups(1);

    harness.cpu_only().measure("first", || {}).unwrap();
    harness.memory_only().measure("second", || {}).unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("first\tavg: "));
    assert!(lines[1].starts_with("memory-usage: second\t"));

    assert!(matches!(
        harness.avg_time(),
        Err(BenchError::MetricUnavailable {
            metric: MetricKind::Cpu
        })
    ));
}

#[test]
fn test_memory_unavailable_when_cpu_only() {
    let (mut harness, _) = system_harness();
    harness.cpu_only();

    let err = harness.memory_bytes().unwrap_err();
    assert!(matches!(
        err,
        BenchError::MetricUnavailable {
            metric: MetricKind::Memory
        }
    ));
}

#[test]
fn test_profile_to_report_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let profile = r#"
harness:
  measurements: 4
  warm_ups: 1
  preset: cpu_only
  settle_delay_ms: 0
"#;
    let config = ConfigLoader::load_string(profile).unwrap();
    assert_eq!(config.harness.preset, Preset::CpuOnly);

    let (mut harness, _) = system_harness();
    harness.apply(&config.harness);
    harness
        .measure("profiled", || thread::sleep(Duration::from_millis(1)))
        .unwrap();

    let reporter = JsonReporter::new(temp_dir.path()).unwrap();
    let path = reporter.save(&harness.report()).unwrap();
    let loaded = JsonReporter::load(&path).unwrap();

    assert_eq!(loaded.results.len(), 1);
    assert_eq!(loaded.results[0].label, "profiled");
    assert_eq!(loaded.results[0].measurements, 4);
    assert_eq!(loaded.results[0].cpu.map(|c| c.runs), Some(4));
}

/// A frozen clock yields infinite throughput, which must survive a report round trip.
#[test]
fn test_frozen_clock_report_round_trip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let sink = Arc::new(CollectingSink::new());
    let mut harness = Harness::with_host(Arc::new(FakeHost::new()), sink.clone());
    harness.measurements(3).warm_ups(0).cpu_only();

    harness.measure("noop", || {}).unwrap();
    assert!(harness.tps().unwrap().is_infinite());
    assert!(sink.lines()[0].contains("tps: inf"));

    let reporter = JsonReporter::new(temp_dir.path()).unwrap();
    let path = reporter.save(&harness.report()).unwrap();
    let loaded = JsonReporter::load(&path).unwrap();

    assert_eq!(loaded.results, harness.results());
    assert!(loaded.results[0].cpu.unwrap().tps.is_infinite());
}
