// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-iteration measurement record.

use crate::types::{Label, Phase, Timestamp};

/// State of a single iteration.
///
/// A fresh record is created for every iteration, stamped by the executor
/// that owns it and handed read-only to each aggregator afterwards.
#[derive(Debug, Clone)]
pub struct RunRecord {
    label: Label,
    phase: Phase,
    index: u32,
    total_measurements: u32,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    byte_metric: Option<u64>,
}

impl RunRecord {
    /// Record for iteration `index` of a run of `total_measurements`.
    pub fn new(label: Label, phase: Phase, index: u32, total_measurements: u32) -> Self {
        debug_assert!(index < total_measurements);
        Self {
            label,
            phase,
            index,
            total_measurements,
            start_time: None,
            end_time: None,
            byte_metric: None,
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn total_measurements(&self) -> u32 {
        self.total_measurements
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    pub fn byte_metric(&self) -> Option<u64> {
        self.byte_metric
    }

    /// Elapsed nanoseconds between the two stamps, zero until both are set.
    pub fn elapsed_nanos(&self) -> u64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    pub(crate) fn mark_start(&mut self, now: Timestamp) {
        self.start_time = Some(now);
        self.end_time = None;
    }

    pub(crate) fn mark_end(&mut self, now: Timestamp) {
        // The end stamp never precedes the start stamp.
        let now = self.start_time.map_or(now, |start| now.max(start));
        self.end_time = Some(now);
    }

    pub(crate) fn set_byte_metric(&mut self, bytes: u64) {
        self.byte_metric = Some(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RunRecord {
        RunRecord::new(Label::new("parse").unwrap(), Phase::Measured, 3, 10)
    }

    #[test]
    fn test_new_record_is_unstamped() {
        let record = record();
        assert_eq!(record.label().as_str(), "parse");
        assert_eq!(record.index(), 3);
        assert_eq!(record.total_measurements(), 10);
        assert!(record.start_time().is_none());
        assert!(record.end_time().is_none());
        assert!(record.byte_metric().is_none());
        assert_eq!(record.elapsed_nanos(), 0);
    }

    #[test]
    fn test_elapsed_between_stamps() {
        let mut record = record();
        record.mark_start(1_000);
        record.mark_end(6_500);
        assert_eq!(record.elapsed_nanos(), 5_500);
    }

    #[test]
    fn test_end_never_precedes_start() {
        let mut record = record();
        record.mark_start(2_000);
        record.mark_end(1_000);
        assert_eq!(record.end_time(), Some(2_000));
        assert_eq!(record.elapsed_nanos(), 0);
    }

    #[test]
    fn test_byte_metric() {
        let mut record = record();
        record.set_byte_metric(4096);
        assert_eq!(record.byte_metric(), Some(4096));
    }
}
