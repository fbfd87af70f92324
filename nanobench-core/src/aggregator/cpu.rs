// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Elapsed-time aggregation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Aggregator, RunTracker};
use crate::record::RunRecord;
use crate::sink::ReportSink;
use crate::types::{Label, MetricKind};

const NANOS_PER_MILLI: f64 = 1_000_000.0;
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Final statistics of the most recent completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    /// Average time per measurement in milliseconds.
    pub avg_ms: f64,
    /// Total time across all measurements in seconds.
    pub total_secs: f64,
    /// Measurements completed per second.
    #[serde(with = "throughput")]
    pub tps: f64,
    /// Number of measurements in the run.
    pub runs: u32,
}

impl CpuStats {
    /// Derive the statistics from summed nanoseconds.
    ///
    /// A run that took no measurable time has infinite throughput.
    pub fn from_totals(total_nanos: u64, runs: u32) -> Self {
        if runs == 0 {
            return Self::default();
        }

        let total = total_nanos as f64;
        let runs_f = f64::from(runs);
        let total_secs = total / NANOS_PER_SECOND;
        let tps = if total_nanos == 0 {
            f64::INFINITY
        } else {
            runs_f / total_secs
        };

        Self {
            avg_ms: total / runs_f / NANOS_PER_MILLI,
            total_secs,
            tps,
            runs,
        }
    }
}

/// JSON has no representation for infinity, so non-finite throughput is
/// stored as the string `"inf"`, `"-inf"` or `"NaN"`.
mod throughput {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Stored::deserialize(deserializer)? {
            Stored::Number(value) => Ok(value),
            Stored::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid throughput '{}'", other))),
            },
        }
    }
}

/// Formats the report line for a completed run.
pub type CpuFormatter = fn(&Label, &CpuStats) -> String;

/// `<label>\tavg: <ms> ms\ttotal: <s> s\t   tps: <tps>\trunning: <n> times`
pub fn format_cpu_line(label: &Label, stats: &CpuStats) -> String {
    format!(
        "{}\tavg: {:.4} ms\ttotal: {:.1} s\t   tps: {:.1}\trunning: {} times",
        label, stats.avg_ms, stats.total_secs, stats.tps, stats.runs
    )
}

/// Averages the elapsed time of each measured iteration.
pub struct CpuAggregator {
    sink: Arc<dyn ReportSink>,
    formatter: CpuFormatter,
    run: RunTracker,
    total_nanos: u64,
    last: CpuStats,
}

impl CpuAggregator {
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self::with_formatter(sink, format_cpu_line)
    }

    pub fn with_formatter(sink: Arc<dyn ReportSink>, formatter: CpuFormatter) -> Self {
        Self {
            sink,
            formatter,
            run: RunTracker::default(),
            total_nanos: 0,
            last: CpuStats::default(),
        }
    }

    /// Statistics of the last completed run, zeroed before the first one.
    pub fn stats(&self) -> CpuStats {
        self.last
    }

    pub fn final_avg(&self) -> f64 {
        self.last.avg_ms
    }

    pub fn final_total(&self) -> f64 {
        self.last.total_secs
    }

    pub fn final_tps(&self) -> f64 {
        self.last.tps
    }
}

impl Aggregator for CpuAggregator {
    fn metric(&self) -> MetricKind {
        MetricKind::Cpu
    }

    fn on_measure(&mut self, record: &RunRecord) {
        if self.run.enter(record, MetricKind::Cpu) {
            self.total_nanos = 0;
        }
        self.total_nanos = self.total_nanos.saturating_add(record.elapsed_nanos());

        if !self.run.is_complete(record) {
            return;
        }

        let runs = self.run.finish();
        self.last = CpuStats::from_totals(std::mem::take(&mut self.total_nanos), runs);

        if record.phase().is_measured() {
            self.sink
                .record(&(self.formatter)(record.label(), &self.last));
        }
    }
}

impl fmt::Debug for CpuAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuAggregator")
            .field("count", &self.run.count())
            .field("total_nanos", &self.total_nanos)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use crate::types::Phase;

    fn measured(label: &str, index: u32, total: u32, elapsed: u64) -> RunRecord {
        let mut record = RunRecord::new(Label::new(label).unwrap(), Phase::Measured, index, total);
        record.mark_start(10_000);
        record.mark_end(10_000 + elapsed);
        record
    }

    #[test]
    fn test_stats_from_totals() {
        // 10 runs of 5ms each.
        let stats = CpuStats::from_totals(50_000_000, 10);
        assert!((stats.avg_ms - 5.0).abs() < 1e-9);
        assert!((stats.total_secs - 0.05).abs() < 1e-9);
        assert!((stats.tps - 200.0).abs() < 1e-6);
        assert_eq!(stats.runs, 10);
    }

    #[test]
    fn test_zero_elapsed_has_infinite_tps() {
        let stats = CpuStats::from_totals(0, 4);
        assert_eq!(stats.avg_ms, 0.0);
        assert!(stats.tps.is_infinite());
        assert!(format_cpu_line(&Label::new("noop").unwrap(), &stats).contains("tps: inf"));
    }

    #[test]
    fn test_infinite_tps_survives_json() {
        let stats = CpuStats::from_totals(0, 3);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"tps\":\"inf\""), "{}", json);

        let loaded: CpuStats = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, stats);
    }

    #[test]
    fn test_finite_tps_stays_numeric() {
        let stats = CpuStats::from_totals(1_000_000_000, 4);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"tps\":4.0"), "{}", json);
        assert_eq!(serde_json::from_str::<CpuStats>(&json).unwrap(), stats);

        let bad = json.replace("\"tps\":4.0", "\"tps\":\"fast\"");
        assert!(serde_json::from_str::<CpuStats>(&bad).is_err());
    }

    #[test]
    fn test_reports_once_per_run() {
        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = CpuAggregator::new(sink.clone());

        for index in 0..4 {
            aggregator.on_measure(&measured("sort", index, 4, 2_500_000));
            if index < 3 {
                assert!(sink.lines().is_empty());
            }
        }

        assert_eq!(
            sink.lines(),
            vec!["sort\tavg: 2.5000 ms\ttotal: 0.0 s\t   tps: 400.0\trunning: 4 times"]
        );
        assert!((aggregator.final_avg() - 2.5).abs() < 1e-9);
        assert!((aggregator.final_total() - 0.01).abs() < 1e-9);
        assert!((aggregator.final_tps() - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_accumulators_reset_between_labels() {
        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = CpuAggregator::new(sink.clone());

        for index in 0..2 {
            aggregator.on_measure(&measured("first", index, 2, 1_000_000));
        }
        for index in 0..2 {
            aggregator.on_measure(&measured("second", index, 2, 3_000_000));
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("first\tavg: 1.0000 ms"));
        assert!(lines[1].starts_with("second\tavg: 3.0000 ms"));
        assert_eq!(aggregator.stats().runs, 2);
    }

    #[test]
    fn test_warm_up_records_are_not_reported() {
        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = CpuAggregator::new(sink.clone());

        let mut record = RunRecord::new(Label::warm_up(), Phase::WarmUp, 0, 1);
        record.mark_start(0);
        record.mark_end(100);
        aggregator.on_measure(&record);

        assert!(sink.lines().is_empty());
        assert_eq!(aggregator.stats().runs, 1);
    }

    #[test]
    fn test_custom_formatter() {
        fn terse(label: &Label, stats: &CpuStats) -> String {
            format!("{}={:.1}", label, stats.avg_ms)
        }

        let sink = Arc::new(CollectingSink::new());
        let mut aggregator = CpuAggregator::with_formatter(sink.clone(), terse);
        aggregator.on_measure(&measured("fmt", 0, 1, 1_500_000));

        assert_eq!(sink.lines(), vec!["fmt=1.5"]);
    }
}
