// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Aggregation of the byte metric reported by the task.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Aggregator, RunTracker, BYTES_PER_MB};
use crate::record::RunRecord;
use crate::sink::ReportSink;
use crate::types::{Label, MetricKind};

/// Average task-reported byte count of the most recent completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytesStats {
    /// Truncated mean of the reported byte counts.
    pub avg_bytes: u64,
    /// Number of measurements in the run.
    pub runs: u32,
}

impl BytesStats {
    pub fn megabytes(&self) -> f64 {
        self.avg_bytes as f64 / BYTES_PER_MB
    }
}

/// Formats the report line for a completed run.
pub type BytesFormatter = fn(&Label, &BytesStats) -> String;

/// `bytes-usage: <label>\t<bytes> Bytes\t<MB> Mb\n`
pub fn format_bytes_line(label: &Label, stats: &BytesStats) -> String {
    format!(
        "bytes-usage: {}\t{:.1} Bytes\t{:.1} Mb\n",
        label,
        stats.avg_bytes as f64,
        stats.megabytes()
    )
}

/// Averages the byte metric attached to each record.
///
/// Records from tasks without the byte capability count as zero bytes.
pub struct BytesAggregator {
    sink: Arc<dyn ReportSink>,
    formatter: BytesFormatter,
    run: RunTracker,
    reported_bytes: u64,
    last: BytesStats,
}

impl BytesAggregator {
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self::with_formatter(sink, format_bytes_line)
    }

    pub fn with_formatter(sink: Arc<dyn ReportSink>, formatter: BytesFormatter) -> Self {
        Self {
            sink,
            formatter,
            run: RunTracker::default(),
            reported_bytes: 0,
            last: BytesStats::default(),
        }
    }

    pub fn stats(&self) -> BytesStats {
        self.last
    }

    pub fn final_bytes(&self) -> u64 {
        self.last.avg_bytes
    }
}

impl Aggregator for BytesAggregator {
    fn metric(&self) -> MetricKind {
        MetricKind::Bytes
    }

    fn on_measure(&mut self, record: &RunRecord) {
        if self.run.enter(record, MetricKind::Bytes) {
            self.reported_bytes = 0;
        }
        self.reported_bytes = self
            .reported_bytes
            .saturating_add(record.byte_metric().unwrap_or(0));

        if !self.run.is_complete(record) {
            return;
        }

        let runs = self.run.finish();
        let total = std::mem::take(&mut self.reported_bytes);
        self.last = BytesStats {
            avg_bytes: total / u64::from(runs),
            runs,
        };

        if record.phase().is_measured() {
            self.sink
                .record(&(self.formatter)(record.label(), &self.last));
        }
    }
}

impl fmt::Debug for BytesAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BytesAggregator")
            .field("count", &self.run.count())
            .field("reported_bytes", &self.reported_bytes)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use crate::types::Phase;

    fn measured(index: u32, total: u32, bytes: Option<u64>) -> RunRecord {
        let mut record = RunRecord::new(Label::new("encode").unwrap(), Phase::Measured, index, total);
        if let Some(bytes) = bytes {
            record.set_byte_metric(bytes);
        }
        record
    }

    #[test]
    fn test_average_of_increasing_metric() {
        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = BytesAggregator::new(sink.clone());

        for index in 0..10 {
            aggregator.on_measure(&measured(index, 10, Some(u64::from(index) * 100)));
        }

        assert_eq!(aggregator.final_bytes(), 450);
        assert_eq!(sink.lines(), vec!["bytes-usage: encode\t450.0 Bytes\t0.0 Mb\n"]);
    }

    #[test]
    fn test_average_truncates() {
        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = BytesAggregator::new(sink);

        for (index, bytes) in (0..3).zip([1, 1, 2]) {
            aggregator.on_measure(&measured(index, 3, Some(bytes)));
        }

        assert_eq!(aggregator.final_bytes(), 1);
    }

    #[test]
    fn test_missing_metric_counts_as_zero() {
        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = BytesAggregator::new(sink);

        aggregator.on_measure(&measured(0, 2, Some(1_000)));
        aggregator.on_measure(&measured(1, 2, None));

        assert_eq!(aggregator.final_bytes(), 500);
    }

    #[test]
    fn test_megabyte_line() {
        let stats = BytesStats {
            avg_bytes: 5 * 1024 * 1024,
            runs: 1,
        };
        assert_eq!(
            format_bytes_line(&Label::new("blob").unwrap(), &stats),
            "bytes-usage: blob\t5242880.0 Bytes\t5.0 Mb\n"
        );
    }
}
