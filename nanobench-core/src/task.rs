// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The unit of work being measured.
//!
//! Any `FnMut()` closure is a [`Task`]. A task that also knows how many bytes
//! it produced exposes that through [`Task::byte_source`]; [`bytes_task`]
//! builds one from a closure returning the byte count.

/// Capability of a task that reports a byte count for its last run.
pub trait ProducesBytes {
    fn bytes_produced(&self) -> u64;
}

/// A unit of work executed once per iteration on the harness thread.
pub trait Task {
    fn run(&mut self);

    /// Queried after every run; `None` when the task reports no byte metric.
    fn byte_source(&self) -> Option<&dyn ProducesBytes> {
        None
    }
}

impl<F> Task for F
where
    F: FnMut(),
{
    fn run(&mut self) {
        self()
    }
}

/// Task wrapping a closure that returns the number of bytes it produced.
#[derive(Debug)]
pub struct ByteTask<F> {
    operation: F,
    last_bytes: u64,
}

impl<F> ByteTask<F>
where
    F: FnMut() -> u64,
{
    pub fn new(operation: F) -> Self {
        Self {
            operation,
            last_bytes: 0,
        }
    }
}

impl<F> Task for ByteTask<F>
where
    F: FnMut() -> u64,
{
    fn run(&mut self) {
        self.last_bytes = (self.operation)();
    }

    fn byte_source(&self) -> Option<&dyn ProducesBytes> {
        Some(self)
    }
}

impl<F> ProducesBytes for ByteTask<F> {
    fn bytes_produced(&self) -> u64 {
        self.last_bytes
    }
}

/// Wrap a closure returning a byte count as a measurable task.
pub fn bytes_task<F>(operation: F) -> ByteTask<F>
where
    F: FnMut() -> u64,
{
    ByteTask::new(operation)
}
