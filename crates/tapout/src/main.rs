// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapout: convert Test Anything Protocol output into JSON
//!
//! Reads TAP from a file or stdin and writes the parsed records to stdout.
//! Logs go to stderr.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use tapout::config::Config;
use tapout::run::run;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    config.validate()?;
    debug!(input = %config.input_name(), "Starting tapout");

    let format = config.output_format();
    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());

    let report = match config.input {
        Some(ref path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            run(format, BufReader::new(file), writer)
        }
        None => run(format, io::stdin().lock(), writer),
    }
    .with_context(|| format!("Failed to convert {}", config.input_name()))?;

    debug!(success = report.is_success(), "Finished");
    Ok(())
}
