// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapout-parser: Streaming Test Anything Protocol parser
//!
//! This library crate turns TAP output (as produced by tape, node-tap, prove
//! and friends) into typed records: tests, assertions with their failure
//! diagnostics, plans, version markers, comments and summary counters. Plan
//! consistency is checked once the stream ends and any problems are reported
//! inside the resulting [`ParseAggregate`].
//!
//! # Example
//!
//! ```
//! use tapout_parser::{EventKind, Subscribers, parse_str};
//!
//! let tap = "TAP version 13\n# add\nok 1 one plus one\n1..1\n";
//!
//! let mut titles = Vec::new();
//! let subscribers = Subscribers::new().on(EventKind::Test, |event| {
//!     if let tapout_parser::Event::Test(test) = event {
//!         titles.push(test.title.clone());
//!     }
//! });
//! let aggregate = parse_str(tap, subscribers);
//!
//! assert_eq!(titles, vec!["add".to_string()]);
//! assert!(aggregate.all_passed());
//! ```

pub mod diagnostic;
pub mod error;
pub mod line;
pub mod parser;
pub mod plan;
pub mod record;
pub mod stream;

pub use error::{PlanError, TapError};
pub use parser::{Event, EventKind, ParseOutcome, TapParser};
pub use record::{
    AssertionKind, AssertionRecord, CommentRecord, Counts, Diagnostic, DiagnosticValue,
    ErrorRecord, ParseAggregate, PlanRecord, StackFrame, SummaryKind, SummaryRecord, TestRecord,
    VersionRecord,
};
pub use stream::{Subscribers, TapStream, parse_lines, parse_reader, parse_str};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::TapError;
    pub use crate::parser::{Event, EventKind, TapParser};
    pub use crate::record::{AssertionRecord, ParseAggregate};
    pub use crate::stream::{Subscribers, parse_reader, parse_str};
}
