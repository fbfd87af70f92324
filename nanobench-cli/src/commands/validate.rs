// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `nanobench validate` command - Validate a benchmark profile.

use std::path::Path;

use nanobench_core::ConfigLoader;

pub fn execute(file: &Path) -> anyhow::Result<()> {
    tracing::info!(file = %file.display(), "Validating profile");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Profile is valid");
            println!();
            println!("Harness Settings:");
            println!("  Measurements:  {}", config.harness.measurements);
            println!("  Warm-ups:      {}", config.harness.warm_ups);
            println!("  Preset:        {}", config.harness.preset);
            println!(
                "  Settle Delay:  {}ms",
                config.harness.settle_delay.as_millis()
            );
            println!();
            println!("Report Settings:");
            match &config.report.output_dir {
                Some(dir) => println!("  Output Directory: {}", dir.display()),
                None => println!("  Output Directory: (none, reports not saved)"),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Profile validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
