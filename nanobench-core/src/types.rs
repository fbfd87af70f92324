// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Labels are validated at creation time so the warm-up sentinel can never be
//! supplied by a caller.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Label carried by every warm-up iteration.
pub const WARMUP_LABEL: &str = "_warmup_";

/// Monotonic timestamp in nanoseconds.
pub type Timestamp = u64;

/// Validated benchmark label.
///
/// Cloning is cheap; every iteration record holds its own handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(Arc<str>);

impl Label {
    /// Create a new Label with validation.
    pub fn new(label: impl AsRef<str>) -> Result<Self, ValidationError> {
        let label = label.as_ref();

        if label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel);
        }

        if label == WARMUP_LABEL {
            return Err(ValidationError::ReservedLabel {
                label: label.to_string(),
            });
        }

        Ok(Self(Arc::from(label)))
    }

    /// The reserved label used for warm-up iterations.
    pub(crate) fn warm_up() -> Self {
        Self(Arc::from(WARMUP_LABEL))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Label {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Whether an iteration is a warm-up or a measured run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Executed before timing begins; never reaches an aggregator.
    WarmUp,
    /// Counted towards the final statistics.
    Measured,
}

impl Phase {
    pub fn is_measured(self) -> bool {
        matches!(self, Phase::Measured)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::WarmUp => write!(f, "warm_up"),
            Phase::Measured => write!(f, "measured"),
        }
    }
}

/// The metric an aggregator accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Elapsed wall-clock time of the task.
    Cpu,
    /// Host memory usage sampled after a reclaim pass.
    Memory,
    /// Byte count reported by the task itself.
    Bytes,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Cpu => write!(f, "cpu"),
            MetricKind::Memory => write!(f, "memory"),
            MetricKind::Bytes => write!(f, "bytes"),
        }
    }
}

/// Mutually exclusive aggregator selections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// CPU time and memory usage.
    #[default]
    CpuAndMemory,
    /// CPU time only.
    CpuOnly,
    /// Memory usage only.
    MemoryOnly,
    /// Task-reported byte metric only.
    BytesOnly,
}

impl Preset {
    /// Metrics enabled by this preset, in notification order.
    pub fn metrics(self) -> &'static [MetricKind] {
        match self {
            Preset::CpuAndMemory => &[MetricKind::Cpu, MetricKind::Memory],
            Preset::CpuOnly => &[MetricKind::Cpu],
            Preset::MemoryOnly => &[MetricKind::Memory],
            Preset::BytesOnly => &[MetricKind::Bytes],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::CpuAndMemory => write!(f, "cpu_and_memory"),
            Preset::CpuOnly => write!(f, "cpu_only"),
            Preset::MemoryOnly => write!(f, "memory_only"),
            Preset::BytesOnly => write!(f, "bytes_only"),
        }
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cpu_and_memory" => Ok(Preset::CpuAndMemory),
            "cpu_only" | "cpu" => Ok(Preset::CpuOnly),
            "memory_only" | "memory" => Ok(Preset::MemoryOnly),
            "bytes_only" | "bytes" => Ok(Preset::BytesOnly),
            _ => Err(ValidationError::UnknownPreset {
                value: s.to_string(),
            }),
        }
    }
}
