// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-metric accumulation of measured iterations.
//!
//! Every aggregator follows the same protocol: count the record, add its
//! metric to a running sum and, once the last measurement of the run has
//! been seen, compute the final statistics, send one formatted line to the
//! report sink and reset the accumulators for the next label.
//!
//! Run boundaries are tracked by [`RunTracker`]; samples from a run abandoned
//! by a panicking task never leak into the next one.

mod bytes;
mod cpu;
mod memory;

use std::fmt::Debug;
use std::sync::Arc;

pub use bytes::{format_bytes_line, BytesAggregator, BytesFormatter, BytesStats};
pub use cpu::{format_cpu_line, CpuAggregator, CpuFormatter, CpuStats};
pub use memory::{format_memory_line, MemoryAggregator, MemoryFormatter, MemoryStats};

use crate::error::{BenchError, BenchResult};
use crate::host::HostRuntime;
use crate::record::RunRecord;
use crate::sink::ReportSink;
use crate::types::{Label, MetricKind, Preset};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Accumulates one metric across the measured iterations of a run.
pub trait Aggregator: Debug {
    /// The metric this aggregator reports.
    fn metric(&self) -> MetricKind;

    /// Observe one completed, non-warm-up iteration.
    fn on_measure(&mut self, record: &RunRecord);
}

/// Tracks which run an aggregator is currently accumulating.
#[derive(Debug, Default)]
pub(crate) struct RunTracker {
    label: Option<Label>,
    total_measurements: u32,
    count: u32,
}

impl RunTracker {
    /// Counts `record` into the current run.
    ///
    /// Returns `true` when an unfinished run was discarded, in which case the
    /// caller must clear its accumulators before adding this record.
    pub(crate) fn enter(&mut self, record: &RunRecord, metric: MetricKind) -> bool {
        let restarted = self.count > 0
            && (self.label.as_ref() != Some(record.label())
                || self.total_measurements != record.total_measurements()
                || record.index() == 0);

        if restarted {
            tracing::warn!(
                metric = %metric,
                previous = self.label.as_ref().map(Label::as_str).unwrap_or_default(),
                label = %record.label(),
                discarded = self.count,
                "Discarding unfinished run"
            );
            self.count = 0;
        }

        if self.count == 0 {
            self.label = Some(record.label().clone());
            self.total_measurements = record.total_measurements();
        }

        self.count = self.count.saturating_add(1);
        restarted
    }

    /// Whether the record just entered was the last of its run.
    pub(crate) fn is_complete(&self, record: &RunRecord) -> bool {
        self.count >= record.total_measurements()
    }

    /// Ends the current run and returns how many measurements it held.
    pub(crate) fn finish(&mut self) -> u32 {
        self.label = None;
        self.total_measurements = 0;
        std::mem::take(&mut self.count)
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }
}

/// Report line formatters handed to each aggregator at construction.
#[derive(Debug, Clone, Copy)]
pub struct Formatters {
    pub cpu: CpuFormatter,
    pub memory: MemoryFormatter,
    pub bytes: BytesFormatter,
}

impl Default for Formatters {
    fn default() -> Self {
        Self {
            cpu: format_cpu_line,
            memory: format_memory_line,
            bytes: format_bytes_line,
        }
    }
}

/// The active aggregators of a harness, in notification order.
#[derive(Debug)]
pub struct AggregatorSet {
    preset: Preset,
    cpu: Option<CpuAggregator>,
    memory: Option<MemoryAggregator>,
    bytes: Option<BytesAggregator>,
}

impl AggregatorSet {
    /// Fresh aggregators for `preset`, all reporting to `sink`.
    pub fn for_preset(
        preset: Preset,
        host: Arc<dyn HostRuntime>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self::with_formatters(preset, host, sink, Formatters::default())
    }

    /// Fresh aggregators for `preset` using the given line formatters.
    pub fn with_formatters(
        preset: Preset,
        host: Arc<dyn HostRuntime>,
        sink: Arc<dyn ReportSink>,
        formatters: Formatters,
    ) -> Self {
        let mut set = Self {
            preset,
            cpu: None,
            memory: None,
            bytes: None,
        };

        for metric in preset.metrics() {
            match metric {
                MetricKind::Cpu => {
                    set.cpu = Some(CpuAggregator::with_formatter(
                        Arc::clone(&sink),
                        formatters.cpu,
                    ))
                }
                MetricKind::Memory => {
                    set.memory = Some(MemoryAggregator::with_formatter(
                        Arc::clone(&host),
                        Arc::clone(&sink),
                        formatters.memory,
                    ))
                }
                MetricKind::Bytes => {
                    set.bytes = Some(BytesAggregator::with_formatter(
                        Arc::clone(&sink),
                        formatters.bytes,
                    ))
                }
            }
        }

        set
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Hand `record` to every active aggregator in order.
    pub fn notify(&mut self, record: &RunRecord) {
        for aggregator in self.iter_mut() {
            aggregator.on_measure(record);
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn Aggregator> + '_ {
        let cpu = self.cpu.as_mut().map(|a| a as &mut dyn Aggregator);
        let memory = self.memory.as_mut().map(|a| a as &mut dyn Aggregator);
        let bytes = self.bytes.as_mut().map(|a| a as &mut dyn Aggregator);
        cpu.into_iter().chain(memory).chain(bytes)
    }

    pub fn cpu(&self) -> BenchResult<&CpuAggregator> {
        self.cpu.as_ref().ok_or(BenchError::MetricUnavailable {
            metric: MetricKind::Cpu,
        })
    }

    pub fn memory(&self) -> BenchResult<&MemoryAggregator> {
        self.memory.as_ref().ok_or(BenchError::MetricUnavailable {
            metric: MetricKind::Memory,
        })
    }

    pub fn bytes(&self) -> BenchResult<&BytesAggregator> {
        self.bytes.as_ref().ok_or(BenchError::MetricUnavailable {
            metric: MetricKind::Bytes,
        })
    }
}
