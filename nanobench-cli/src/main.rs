// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! nanobench CLI
//!
//! Runs built-in workloads through the nanobench harness and validates
//! benchmark profiles.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod workloads;

/// nanobench - Lightweight CPU and memory micro-benchmarking
#[derive(Parser)]
#[command(name = "nanobench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run built-in workloads
    Run(commands::run::RunArgs),

    /// Validate a benchmark profile
    Validate {
        /// Path to the profile YAML file
        file: PathBuf,
    },

    /// List built-in workloads
    Workloads,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::Workloads => commands::workloads::execute(),
    }
}
