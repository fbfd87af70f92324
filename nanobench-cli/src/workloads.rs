// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Built-in workloads runnable from the command line.

use std::fmt;
use std::hint::black_box;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use nanobench_core::{bytes_task, BenchResult, Harness};

/// Number of strings built per `string_building` iteration.
const STRING_COUNT: u32 = 10_000;
/// Pause taken per `sleep` iteration.
const SLEEP_DURATION: Duration = Duration::from_millis(5);
/// Buffer filled per `buffer_fill` iteration.
const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    StringBuilding,
    Sleep,
    BufferFill,
}

impl Workload {
    pub const ALL: [Workload; 3] = [Workload::StringBuilding, Workload::Sleep, Workload::BufferFill];

    pub fn name(self) -> &'static str {
        match self {
            Workload::StringBuilding => "string_building",
            Workload::Sleep => "sleep",
            Workload::BufferFill => "buffer_fill",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Workload::StringBuilding => "Builds 10000 decimal strings into a vector",
            Workload::Sleep => "Sleeps for 5 ms",
            Workload::BufferFill => "Fills a 64 KiB buffer and reports its length in bytes",
        }
    }

    /// Measure this workload under its own name.
    pub fn measure(self, harness: &mut Harness) -> BenchResult<()> {
        match self {
            Workload::StringBuilding => harness.measure(self.name(), || {
                let list: Vec<String> = (0..STRING_COUNT).map(|i| i.to_string()).collect();
                black_box(list);
            }),
            Workload::Sleep => harness.measure(self.name(), || thread::sleep(SLEEP_DURATION)),
            Workload::BufferFill => harness.measure(
                self.name(),
                bytes_task(|| {
                    let buffer = vec![0xABu8; BUFFER_SIZE];
                    black_box(&buffer);
                    buffer.len() as u64
                }),
            ),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Workload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Workload::ALL
            .into_iter()
            .find(|w| w.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Workload::ALL.iter().map(|w| w.name()).collect();
                format!("Unknown workload '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
