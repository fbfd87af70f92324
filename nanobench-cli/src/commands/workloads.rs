// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `nanobench workloads` command - List built-in workloads.

use crate::workloads::Workload;

pub fn execute() -> anyhow::Result<()> {
    println!("Built-in workloads:");
    for workload in Workload::ALL {
        println!("  {:<16} {}", workload.name(), workload.description());
    }
    Ok(())
}
