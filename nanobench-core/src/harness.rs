// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark harness orchestrating warm-up and measurement runs.
//!
//! A `measure` call walks through a fixed sequence:
//! reclaim, warm-up iterations, reclaim, measured iterations, reclaim and a
//! settle delay. Iterations run strictly one after another on the calling
//! thread; aggregator state is never shared across threads.

use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{AggregatorSet, BytesStats, CpuStats, Formatters, MemoryStats};
use crate::config::HarnessConfig;
use crate::error::{BenchResult, ValidationError};
use crate::executor::RunExecutor;
use crate::host::{HostRuntime, SystemHost};
use crate::record::RunRecord;
use crate::report::{BenchmarkReport, BenchmarkResult};
use crate::sink::{ReportSink, TracingSink};
use crate::task::Task;
use crate::types::{Label, Phase, Preset};

/// Default number of measured iterations.
pub const DEFAULT_MEASUREMENTS: u32 = 50;
/// Default number of warm-up iterations.
pub const DEFAULT_WARM_UPS: u32 = 20;
/// Default pause after the final reclaim pass.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// A benchmark harness measuring labelled tasks.
#[derive(Debug)]
pub struct Harness {
    /// Number of measured iterations per `measure` call
    measurements: u32,
    /// Number of warm-up iterations before measurement
    warm_ups: u32,
    /// Pause before `measure` returns
    settle_delay: Duration,
    host: Arc<dyn HostRuntime>,
    sink: Arc<dyn ReportSink>,
    formatters: Formatters,
    aggregators: AggregatorSet,
    results: Vec<BenchmarkResult>,
}

impl Harness {
    /// Create a harness with default settings, measuring CPU time and memory.
    pub fn new() -> Self {
        Self::with_host(Arc::new(SystemHost::new()), Arc::new(TracingSink))
    }

    /// Create a harness over injected host primitives and report sink.
    pub fn with_host(host: Arc<dyn HostRuntime>, sink: Arc<dyn ReportSink>) -> Self {
        let aggregators =
            AggregatorSet::for_preset(Preset::default(), Arc::clone(&host), Arc::clone(&sink));
        Self {
            measurements: DEFAULT_MEASUREMENTS,
            warm_ups: DEFAULT_WARM_UPS,
            settle_delay: DEFAULT_SETTLE_DELAY,
            host,
            sink,
            formatters: Formatters::default(),
            aggregators,
            results: Vec::new(),
        }
    }

    /// Create a harness from a validated profile.
    pub fn from_config(config: &HarnessConfig) -> Self {
        let mut harness = Self::new();
        harness.apply(config);
        harness
    }

    /// Apply every setting of a validated profile.
    pub fn apply(&mut self, config: &HarnessConfig) -> &mut Self {
        self.measurements(config.measurements)
            .warm_ups(config.warm_ups)
            .settle_delay(config.settle_delay)
            .preset(config.preset)
    }

    /// Set the number of measured iterations.
    pub fn measurements(&mut self, count: u32) -> &mut Self {
        self.measurements = count;
        self
    }

    /// Set the number of warm-up iterations.
    pub fn warm_ups(&mut self, count: u32) -> &mut Self {
        self.warm_ups = count;
        self
    }

    /// Set the pause taken at the end of every `measure` call.
    pub fn settle_delay(&mut self, delay: Duration) -> &mut Self {
        self.settle_delay = delay;
        self
    }

    /// Replace the active aggregators wholesale.
    pub fn preset(&mut self, preset: Preset) -> &mut Self {
        self.aggregators = AggregatorSet::with_formatters(
            preset,
            Arc::clone(&self.host),
            Arc::clone(&self.sink),
            self.formatters,
        );
        self
    }

    /// Set the report line formatters.
    ///
    /// Rebuilds the active aggregators; later preset switches keep them.
    pub fn formatters(&mut self, formatters: Formatters) -> &mut Self {
        self.formatters = formatters;
        self.preset(self.aggregators.preset())
    }

    pub fn cpu_and_memory(&mut self) -> &mut Self {
        self.preset(Preset::CpuAndMemory)
    }

    pub fn cpu_only(&mut self) -> &mut Self {
        self.preset(Preset::CpuOnly)
    }

    pub fn memory_only(&mut self) -> &mut Self {
        self.preset(Preset::MemoryOnly)
    }

    pub fn bytes_only(&mut self) -> &mut Self {
        self.preset(Preset::BytesOnly)
    }

    pub fn measurement_count(&self) -> u32 {
        self.measurements
    }

    pub fn warm_up_count(&self) -> u32 {
        self.warm_ups
    }

    pub fn active_preset(&self) -> Preset {
        self.aggregators.preset()
    }

    /// Benchmark `task` under `label`.
    ///
    /// Fails before running anything when the label is invalid or no
    /// measurements are configured. A panic raised by the task propagates
    /// and no report is emitted for the interrupted run.
    pub fn measure<T>(&mut self, label: &str, mut task: T) -> BenchResult<()>
    where
        T: Task,
    {
        let label = Label::new(label)?;

        if self.measurements == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "measurements",
                value: "0".to_string(),
                reason: "At least one measurement is required".to_string(),
            }
            .into());
        }

        tracing::info!(
            label = %label,
            measurements = self.measurements,
            warm_ups = self.warm_ups,
            preset = %self.aggregators.preset(),
            "Starting benchmark"
        );

        self.host.force_reclaim();

        tracing::debug!(label = %label, count = self.warm_ups, "Warm-up phase");
        Self::run_iterations(
            self.host.as_ref(),
            &mut self.aggregators,
            &Label::warm_up(),
            Phase::WarmUp,
            self.warm_ups,
            &mut task,
        );

        self.host.force_reclaim();

        tracing::debug!(label = %label, count = self.measurements, "Measurement phase");
        Self::run_iterations(
            self.host.as_ref(),
            &mut self.aggregators,
            &label,
            Phase::Measured,
            self.measurements,
            &mut task,
        );

        self.host.force_reclaim();

        let result = self.snapshot(&label);
        self.results.push(result);

        tracing::debug!(label = %label, delay_ms = self.settle_delay.as_millis() as u64, "Settling");
        if let Err(e) = self.host.settle(self.settle_delay) {
            tracing::warn!(label = %label, error = %e, "Settle delay interrupted");
        }

        tracing::info!(label = %label, "Benchmark complete");
        Ok(())
    }

    /// Run `count` iterations, notifying aggregators only for measured phases.
    fn run_iterations<T>(
        host: &dyn HostRuntime,
        aggregators: &mut AggregatorSet,
        label: &Label,
        phase: Phase,
        count: u32,
        task: &mut T,
    ) where
        T: Task + ?Sized,
    {
        for index in 0..count {
            let record = RunRecord::new(label.clone(), phase, index, count);
            RunExecutor::new(record, host, aggregators).execute(task);
        }
    }

    fn snapshot(&self, label: &Label) -> BenchmarkResult {
        BenchmarkResult {
            label: label.as_str().to_string(),
            preset: self.aggregators.preset(),
            measurements: self.measurements,
            warm_ups: self.warm_ups,
            cpu: self.aggregators.cpu().ok().map(|a| a.stats()),
            memory: self.aggregators.memory().ok().map(|a| a.stats()),
            bytes: self.aggregators.bytes().ok().map(|a| a.stats()),
        }
    }

    /// Average time per measurement of the last run, in milliseconds.
    pub fn avg_time(&self) -> BenchResult<f64> {
        Ok(self.aggregators.cpu()?.final_avg())
    }

    /// Total time of the last run, in seconds.
    pub fn total_time(&self) -> BenchResult<f64> {
        Ok(self.aggregators.cpu()?.final_total())
    }

    /// Measurements per second of the last run.
    pub fn tps(&self) -> BenchResult<f64> {
        Ok(self.aggregators.cpu()?.final_tps())
    }

    /// Average memory usage of the last run, in bytes.
    pub fn memory_bytes(&self) -> BenchResult<u64> {
        Ok(self.aggregators.memory()?.final_bytes())
    }

    /// Average task-reported byte count of the last run.
    pub fn bytes_average(&self) -> BenchResult<u64> {
        Ok(self.aggregators.bytes()?.final_bytes())
    }

    pub fn cpu_stats(&self) -> BenchResult<CpuStats> {
        Ok(self.aggregators.cpu()?.stats())
    }

    pub fn memory_stats(&self) -> BenchResult<MemoryStats> {
        Ok(self.aggregators.memory()?.stats())
    }

    pub fn bytes_stats(&self) -> BenchResult<BytesStats> {
        Ok(self.aggregators.bytes()?.stats())
    }

    /// Summaries of every completed `measure` call, oldest first.
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Build a report of every completed run.
    pub fn report(&self) -> BenchmarkReport {
        let mut report = BenchmarkReport::new();
        for result in &self.results {
            report.add_result(result.clone());
        }
        report
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
