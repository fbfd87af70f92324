// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML benchmark profiles with strict validation.
//!
//! A profile carries the same settings as the harness builder. Every field
//! is optional; invalid values are rejected before any benchmark runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BenchError, BenchResult, ValidationError};
use crate::harness::{DEFAULT_MEASUREMENTS, DEFAULT_SETTLE_DELAY, DEFAULT_WARM_UPS};
use crate::types::Preset;

/// Longest settle delay a profile may request.
pub const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Raw harness section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHarnessConfig {
    #[serde(default = "default_measurements")]
    measurements: u32,
    #[serde(default = "default_warm_ups")]
    warm_ups: u32,
    #[serde(default)]
    preset: Option<String>,
    #[serde(default = "default_settle_delay_ms")]
    settle_delay_ms: u64,
}

fn default_measurements() -> u32 {
    DEFAULT_MEASUREMENTS
}

fn default_warm_ups() -> u32 {
    DEFAULT_WARM_UPS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}

impl Default for RawHarnessConfig {
    fn default() -> Self {
        Self {
            measurements: default_measurements(),
            warm_ups: default_warm_ups(),
            preset: None,
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// Raw report section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReportConfig {
    #[serde(default)]
    output_dir: Option<String>,
}

/// Raw root profile.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    harness: RawHarnessConfig,
    #[serde(default)]
    report: RawReportConfig,
}

/// Validated harness settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub measurements: u32,
    pub warm_ups: u32,
    pub preset: Preset,
    pub settle_delay: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            measurements: DEFAULT_MEASUREMENTS,
            warm_ups: DEFAULT_WARM_UPS,
            preset: Preset::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Validated report settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    /// Directory for JSON reports; `None` disables persistence.
    pub output_dir: Option<PathBuf>,
}

/// Complete validated profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub harness: HarnessConfig,
    pub report: ReportConfig,
}

/// Profile loader with strict validation.
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a profile from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading profile",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate a profile from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<Config> {
        // An empty document is a valid profile with every default applied.
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> BenchResult<Config> {
        Ok(Config {
            harness: Self::validate_harness(raw.harness)?,
            report: Self::validate_report(raw.report)?,
        })
    }

    fn validate_harness(raw: RawHarnessConfig) -> BenchResult<HarnessConfig> {
        if raw.measurements == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "measurements",
                value: "0".to_string(),
                reason: "At least one measurement is required".to_string(),
            }
            .into());
        }

        if raw.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(ValidationError::InvalidFieldValue {
                field: "settle_delay_ms",
                value: raw.settle_delay_ms.to_string(),
                reason: format!("Must not exceed {}ms", MAX_SETTLE_DELAY_MS),
            }
            .into());
        }

        let preset = match raw.preset.as_deref() {
            Some(value) => value.parse::<Preset>()?,
            None => Preset::default(),
        };

        Ok(HarnessConfig {
            measurements: raw.measurements,
            warm_ups: raw.warm_ups,
            preset,
            settle_delay: Duration::from_millis(raw.settle_delay_ms),
        })
    }

    fn validate_report(raw: RawReportConfig) -> BenchResult<ReportConfig> {
        let output_dir = match raw.output_dir {
            Some(dir) if dir.trim().is_empty() => {
                return Err(ValidationError::InvalidFieldValue {
                    field: "output_dir",
                    value: dir,
                    reason: "Output directory cannot be empty".to_string(),
                }
                .into());
            }
            Some(dir) => Some(PathBuf::from(dir)),
            None => None,
        };

        Ok(ReportConfig { output_dir })
    }
}
