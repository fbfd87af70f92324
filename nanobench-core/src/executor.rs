// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Execution of a single timed iteration.

use crate::aggregator::AggregatorSet;
use crate::host::HostRuntime;
use crate::record::RunRecord;
use crate::task::Task;

/// Runs one iteration of a task and publishes its record.
///
/// Only the task invocation sits between the two clock reads. Capturing the
/// byte metric and notifying aggregators happen after the end stamp.
#[derive(Debug)]
pub struct RunExecutor<'a> {
    record: RunRecord,
    host: &'a dyn HostRuntime,
    aggregators: &'a mut AggregatorSet,
}

impl<'a> RunExecutor<'a> {
    pub fn new(
        record: RunRecord,
        host: &'a dyn HostRuntime,
        aggregators: &'a mut AggregatorSet,
    ) -> Self {
        Self {
            record,
            host,
            aggregators,
        }
    }

    /// Execute the task once and return the stamped record.
    ///
    /// A panic inside the task propagates to the caller; no aggregator sees
    /// the in-flight record.
    pub fn execute<T>(mut self, task: &mut T) -> RunRecord
    where
        T: Task + ?Sized,
    {
        self.record.mark_start(self.host.now());
        task.run();
        self.record.mark_end(self.host.now());

        if let Some(source) = task.byte_source() {
            self.record.set_byte_metric(source.bytes_produced());
        }

        tracing::trace!(
            label = %self.record.label(),
            phase = %self.record.phase(),
            index = self.record.index(),
            elapsed_ns = self.record.elapsed_nanos(),
            "Iteration complete"
        );

        if self.record.phase().is_measured() {
            self.aggregators.notify(&self.record);
        }

        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FakeHost;
    use crate::sink::CollectingSink;
    use crate::task::bytes_task;
    use crate::types::{Label, Phase, Preset};
    use std::sync::Arc;
    use std::time::Duration;

    fn setup(preset: Preset) -> (FakeHost, Arc<CollectingSink>, AggregatorSet) {
        let host = FakeHost::new();
        let sink = Arc::new(CollectingSink::new());
        let set = AggregatorSet::for_preset(preset, Arc::new(host.clone()), sink.clone());
        (host, sink, set)
    }

    #[test]
    fn test_stamps_only_the_task() {
        let (host, sink, mut set) = setup(Preset::CpuOnly);
        let clock = host.clone();
        let mut task = move || clock.advance(Duration::from_millis(3));

        let record = RunRecord::new(Label::new("timed").unwrap(), Phase::Measured, 0, 1);
        let record = RunExecutor::new(record, &host, &mut set).execute(&mut task);

        assert_eq!(record.start_time(), Some(0));
        assert_eq!(record.end_time(), Some(3_000_000));
        assert_eq!(record.elapsed_nanos(), 3_000_000);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_captures_byte_metric() {
        let (host, sink, mut set) = setup(Preset::BytesOnly);
        let mut task = bytes_task(|| 2048);

        let record = RunRecord::new(Label::new("bytes").unwrap(), Phase::Measured, 0, 1);
        let record = RunExecutor::new(record, &host, &mut set).execute(&mut task);

        assert_eq!(record.byte_metric(), Some(2048));
        assert_eq!(
            sink.lines(),
            vec!["bytes-usage: bytes\t2048.0 Bytes\t0.0 Mb\n"]
        );
    }

    #[test]
    fn test_warm_up_never_notifies() {
        let (host, sink, mut set) = setup(Preset::CpuAndMemory);
        let mut task = || {};

        let record = RunRecord::new(Label::warm_up(), Phase::WarmUp, 0, 1);
        RunExecutor::new(record, &host, &mut set).execute(&mut task);

        assert!(sink.lines().is_empty());
        assert_eq!(host.reclaim_passes(), 0);
        assert_eq!(set.cpu().unwrap().stats().runs, 0);
    }

    fn faulty_task() {
        panic!("task fault");
    }

    #[test]
    fn test_task_panic_propagates() {
        let (host, sink, mut set) = setup(Preset::CpuOnly);
        let mut task = faulty_task;

        let record = RunRecord::new(Label::new("boom").unwrap(), Phase::Measured, 0, 1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            RunExecutor::new(record, &host, &mut set).execute(&mut task)
        }));

        assert!(result.is_err());
        assert!(sink.lines().is_empty());
    }
}
