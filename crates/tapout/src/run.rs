// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Convert one TAP stream into JSON
//!
//! [`run`] parses everything a reader yields and writes the result in the
//! selected [`OutputFormat`]. Structural problems in the TAP stream end up in
//! the aggregate's `errors` list; only I/O and encoding failures are returned
//! as [`RunError`].
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use tapout::config::OutputFormat;
//! use tapout::run::run;
//!
//! let mut out = Vec::new();
//! let report = run(OutputFormat::Compact, Cursor::new("1..1\nok 1 works\n"), &mut out)
//!     .expect("run");
//!
//! assert_eq!(report.counts.passed, 1);
//! assert!(String::from_utf8(out).expect("utf8").starts_with("{\"tests\":[]"));
//! ```

use std::io::{BufRead, Write};

use serde::Serialize;
use tapout_parser::{Counts, Event, ParseAggregate, Subscribers, TapError, parse_reader};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OutputFormat;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that stop a run
#[derive(Debug, Error)]
pub enum RunError {
    /// Writing the output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading the TAP input failed
    #[error("TAP input error: {0}")]
    Tap(#[from] TapError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Run Report
// ============================================================================

/// Summary of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Assertion counts of the parsed stream
    pub counts: Counts,
    /// Number of plan errors found
    pub errors: usize,
    /// Number of event lines written (stream format only)
    pub events: usize,
}

impl RunReport {
    fn new(aggregate: &ParseAggregate, events: usize) -> Self {
        Self {
            counts: aggregate.counts(),
            errors: aggregate.errors.len(),
            events,
        }
    }

    /// Check if every assertion passed and the plan was consistent
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.counts.failed == 0 && self.errors == 0
    }
}

/// Final line of the stream format
#[derive(Serialize)]
struct OutputLine<'a> {
    event: &'static str,
    record: &'a ParseAggregate,
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse `reader` and write the result to `writer`
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written. In stream format, event lines written before the failure stay in
/// the output.
pub fn run<R, W>(format: OutputFormat, reader: R, mut writer: W) -> Result<RunReport, RunError>
where
    R: BufRead,
    W: Write,
{
    let mut events = 0;
    let mut write_error: Option<RunError> = None;

    let subscribers = match format {
        OutputFormat::Stream => Subscribers::new().on_any(|event| {
            if write_error.is_some() {
                return;
            }
            match write_event(&mut writer, event) {
                Ok(()) => events += 1,
                Err(e) => write_error = Some(e),
            }
        }),
        OutputFormat::Pretty | OutputFormat::Compact => Subscribers::new(),
    };

    let aggregate = parse_reader(reader, subscribers)?;
    if let Some(e) = write_error {
        return Err(e);
    }

    match format {
        OutputFormat::Pretty => serde_json::to_writer_pretty(&mut writer, &aggregate)?,
        OutputFormat::Compact => serde_json::to_writer(&mut writer, &aggregate)?,
        OutputFormat::Stream => serde_json::to_writer(
            &mut writer,
            &OutputLine {
                event: "output",
                record: &aggregate,
            },
        )?,
    }
    writer.write_all(b"\n")?;
    writer.flush()?;

    let report = RunReport::new(&aggregate, events);
    for error in &aggregate.errors {
        warn!(error = %error.message, "Plan check failed");
    }
    info!(
        total = report.counts.total,
        passed = report.counts.passed,
        failed = report.counts.failed,
        errors = report.errors,
        "Parsed TAP stream"
    );
    debug!(?format, events, "Output written");

    Ok(report)
}

fn write_event<W: Write>(writer: &mut W, event: &Event) -> Result<(), RunError> {
    serde_json::to_writer(&mut *writer, event)?;
    writer.write_all(b"\n")?;
    Ok(())
}
