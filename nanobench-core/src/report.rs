// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run summaries and JSON report persistence.
//!
//! Every completed `measure` call leaves a [`BenchmarkResult`] behind. A
//! [`BenchmarkReport`] bundles them with host information so results from
//! different machines can be compared later.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::aggregator::{BytesStats, CpuStats, MemoryStats};
use crate::error::{BenchError, BenchResult};
use crate::types::Preset;

/// Summary of one labelled run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Label passed to `measure`
    pub label: String,
    /// Aggregators active during the run
    pub preset: Preset,
    /// Number of measured iterations
    pub measurements: u32,
    /// Number of warm-up iterations
    pub warm_ups: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<BytesStats>,
}

/// System information captured at report time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete report of a benchmarking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Harness version
    pub version: String,
    /// Timestamp when the report was created
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Individual run summaries
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benchmark_suite: "nanobench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes reports as pretty-printed JSON files.
#[derive(Debug)]
pub struct JsonReporter {
    /// Output directory for report files
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a reporter writing into `output_dir`, creating it if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> BenchResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|e| BenchError::Io {
            context: "creating report directory",
            source: e,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save a report and return the path of the created file.
    ///
    /// Existing reports are never overwritten; a numeric suffix is added when
    /// two reports share a timestamp.
    pub fn save(&self, report: &BenchmarkReport) -> BenchResult<PathBuf> {
        let stem = format!(
            "nanobench_{}",
            report.timestamp.format("%Y-%m-%dT%H-%M-%S%.3fZ")
        );
        let (filepath, file) = self.create_unique(&stem)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush().map_err(|e| BenchError::Io {
            context: "writing report file",
            source: e,
        })?;

        tracing::debug!(path = %filepath.display(), results = report.results.len(), "Report saved");
        Ok(filepath)
    }

    fn create_unique(&self, stem: &str) -> BenchResult<(PathBuf, File)> {
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{}.json", stem),
                n => format!("{}_{}.json", stem, n),
            };
            let path = self.output_dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(BenchError::Io {
                        context: "creating report file",
                        source: e,
                    })
                }
            }
        }
    }

    /// List every JSON report in the output directory, sorted by name.
    pub fn list_reports(&self) -> BenchResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.output_dir).map_err(|e| BenchError::Io {
            context: "listing report directory",
            source: e,
        })?;

        let mut reports = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| BenchError::Io {
                    context: "reading report directory entry",
                    source: e,
                })?
                .path();
            if path.extension().is_some_and(|e| e == "json") {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load a previously saved report.
    pub fn load(path: impl AsRef<Path>) -> BenchResult<BenchmarkReport> {
        let file = File::open(path).map_err(|e| BenchError::Io {
            context: "opening report file",
            source: e,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}
