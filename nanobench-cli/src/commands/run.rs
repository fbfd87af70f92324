// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `nanobench run` command - Measure built-in workloads.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use nanobench_core::{
    BenchmarkResult, Config, ConfigLoader, Harness, HarnessConfig, JsonReporter,
    MAX_SETTLE_DELAY_MS,
};

use crate::workloads::Workload;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Benchmark profile (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Measured iterations per workload
    #[arg(short, long)]
    pub measurements: Option<u32>,

    /// Warm-up iterations per workload
    #[arg(short, long)]
    pub warm_ups: Option<u32>,

    /// Aggregator preset (cpu_and_memory, cpu_only, memory_only, bytes_only)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Pause after each workload, in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Directory to save the JSON report into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Workloads to run (all if not specified)
    pub workloads: Vec<String>,
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => Config::default(),
    };

    let settings = resolve_settings(&config.harness, &args)?;
    let workloads = select_workloads(&args.workloads)?;
    let output_dir = args.output.clone().or(config.report.output_dir);

    println!("nanobench");
    println!("=========");
    println!("Measurements: {}", settings.measurements);
    println!("Warm-ups:     {}", settings.warm_ups);
    println!("Preset:       {}", settings.preset);
    println!();

    let mut harness = Harness::from_config(&settings);
    for workload in &workloads {
        tracing::debug!(workload = %workload, "Running workload");
        workload
            .measure(&mut harness)
            .with_context(|| format!("Workload {} failed", workload))?;
    }

    println!();
    print_summary(harness.results());

    if let Some(dir) = output_dir {
        let reporter = JsonReporter::new(&dir)
            .with_context(|| format!("Failed to prepare {}", dir.display()))?;
        let path = reporter.save(&harness.report())?;
        println!();
        println!("Benchmark report saved to: {}", path.display());
    }

    Ok(())
}

/// Apply command-line overrides on top of the profile.
fn resolve_settings(profile: &HarnessConfig, args: &RunArgs) -> anyhow::Result<HarnessConfig> {
    let mut settings = profile.clone();

    if let Some(measurements) = args.measurements {
        settings.measurements = measurements;
    }
    if let Some(warm_ups) = args.warm_ups {
        settings.warm_ups = warm_ups;
    }
    if let Some(preset) = &args.preset {
        settings.preset = preset.parse()?;
    }
    if let Some(settle_ms) = args.settle_ms {
        if settle_ms > MAX_SETTLE_DELAY_MS {
            anyhow::bail!(
                "Settle delay {}ms exceeds the {}ms limit",
                settle_ms,
                MAX_SETTLE_DELAY_MS
            );
        }
        settings.settle_delay = Duration::from_millis(settle_ms);
    }

    if settings.measurements == 0 {
        anyhow::bail!("At least one measurement is required");
    }

    Ok(settings)
}

fn select_workloads(names: &[String]) -> anyhow::Result<Vec<Workload>> {
    if names.is_empty() {
        return Ok(Workload::ALL.to_vec());
    }

    names
        .iter()
        .map(|name| name.parse::<Workload>().map_err(anyhow::Error::msg))
        .collect()
}

fn print_summary(results: &[BenchmarkResult]) {
    println!("Summary");
    println!("-------");

    for result in results {
        println!("{}", result.label);
        if let Some(cpu) = &result.cpu {
            println!(
                "  cpu:    avg {:.4} ms, total {:.3} s, {:.1} ops/s",
                cpu.avg_ms, cpu.total_secs, cpu.tps
            );
        }
        if let Some(memory) = &result.memory {
            println!(
                "  memory: {} bytes ({:.3} Mb)",
                memory.avg_bytes,
                memory.megabytes()
            );
        }
        if let Some(bytes) = &result.bytes {
            println!(
                "  bytes:  {} bytes ({:.1} Mb)",
                bytes.avg_bytes,
                bytes.megabytes()
            );
        }
    }
}
