// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Memory-usage aggregation.
//!
//! Each notification forces a reclaim pass before sampling. The pass runs
//! after the end stamp, so a co-active CPU aggregator still times the task
//! alone, but whole iterations run noticeably slower.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Aggregator, RunTracker, BYTES_PER_MB};
use crate::host::HostRuntime;
use crate::record::RunRecord;
use crate::sink::ReportSink;
use crate::types::{Label, MetricKind};

/// Average memory occupancy of the most recent completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Truncated mean of the sampled readings.
    pub avg_bytes: u64,
    /// Number of samples in the run.
    pub runs: u32,
}

impl MemoryStats {
    pub fn megabytes(&self) -> f64 {
        self.avg_bytes as f64 / BYTES_PER_MB
    }
}

/// Formats the report line for a completed run.
pub type MemoryFormatter = fn(&Label, &MemoryStats) -> String;

/// `memory-usage: <label>\t<MB> Mb\n`
pub fn format_memory_line(label: &Label, stats: &MemoryStats) -> String {
    format!("memory-usage: {}\t{:.3} Mb\n", label, stats.megabytes())
}

/// Samples host memory usage after every measured iteration.
pub struct MemoryAggregator {
    host: Arc<dyn HostRuntime>,
    sink: Arc<dyn ReportSink>,
    formatter: MemoryFormatter,
    run: RunTracker,
    sampled_bytes: u64,
    last: MemoryStats,
}

impl MemoryAggregator {
    pub fn new(host: Arc<dyn HostRuntime>, sink: Arc<dyn ReportSink>) -> Self {
        Self::with_formatter(host, sink, format_memory_line)
    }

    pub fn with_formatter(
        host: Arc<dyn HostRuntime>,
        sink: Arc<dyn ReportSink>,
        formatter: MemoryFormatter,
    ) -> Self {
        Self {
            host,
            sink,
            formatter,
            run: RunTracker::default(),
            sampled_bytes: 0,
            last: MemoryStats::default(),
        }
    }

    pub fn stats(&self) -> MemoryStats {
        self.last
    }

    pub fn final_bytes(&self) -> u64 {
        self.last.avg_bytes
    }
}

impl Aggregator for MemoryAggregator {
    fn metric(&self) -> MetricKind {
        MetricKind::Memory
    }

    fn on_measure(&mut self, record: &RunRecord) {
        if self.run.enter(record, MetricKind::Memory) {
            self.sampled_bytes = 0;
        }

        self.host.force_reclaim();
        self.sampled_bytes = self.sampled_bytes.saturating_add(self.host.used_memory());

        if !self.run.is_complete(record) {
            return;
        }

        let runs = self.run.finish();
        let total = std::mem::take(&mut self.sampled_bytes);
        self.last = MemoryStats {
            avg_bytes: total / u64::from(runs),
            runs,
        };

        if record.phase().is_measured() {
            self.sink
                .record(&(self.formatter)(record.label(), &self.last));
        }
    }
}

impl fmt::Debug for MemoryAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAggregator")
            .field("count", &self.run.count())
            .field("sampled_bytes", &self.sampled_bytes)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
