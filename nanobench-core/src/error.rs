// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for nanobench.
//!
//! All errors are explicit enums. Faults raised by a measured task are not
//! represented here: a panicking task unwinds straight through the harness.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::MetricKind;

/// Top-level error type for the measurement engine.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Metric Retrieval Errors
    // =========================================================================
    #[error("Metric unavailable: {metric} measures are not active on this harness")]
    MetricUnavailable { metric: MetricKind },

    // =========================================================================
    // Report Persistence Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rejected input values: labels, counts and profile fields.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Benchmark label cannot be empty")]
    EmptyLabel,

    #[error("Benchmark label '{label}' is reserved for warm-up runs")]
    ReservedLabel { label: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown preset '{value}' (expected cpu_and_memory, cpu_only, memory_only or bytes_only)")]
    UnknownPreset { value: String },
}

/// Failures reported by host runtime primitives.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Settle delay interrupted: {reason}")]
    SettleInterrupted { reason: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
