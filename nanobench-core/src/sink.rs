// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Destinations for formatted report lines.

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// Receives one formatted line per completed aggregator run.
pub trait ReportSink: Debug + Send + Sync {
    fn record(&self, line: &str);
}

/// Emits report lines as `tracing` events under the `nanobench::report` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&self, line: &str) {
        tracing::info!(target: "nanobench::report", "{}", line.trim_end());
    }
}

/// Keeps every report line in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the recorded lines.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl ReportSink for CollectingSink {
    fn record(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.record("first");
        sink.record("second\n");

        assert_eq!(sink.lines(), vec!["first", "second\n"]);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_tracing_sink_accepts_lines() {
        TracingSink.record("memory-usage: x\t1.000 Mb\n");
    }
}
