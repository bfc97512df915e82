// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming TAP parser
//!
//! [`TapParser`] folds classified lines into a [`ParseAggregate`] and hands
//! back the [`Event`]s each line produced, in arrival order. Failing
//! assertions are special: their `fail` event waits for the next line so a
//! diagnostic block directly below can be attached first.
//!
//! # Example
//!
//! ```
//! use tapout_parser::{Event, TapParser};
//!
//! let mut parser = TapParser::new();
//! let mut events = Vec::new();
//! for line in ["1..1", "not ok 1 broken", "  ---", "  operator: ok", "  ..."] {
//!     events.extend(parser.process_line(line));
//! }
//! let outcome = parser.finish();
//! events.extend(outcome.events);
//!
//! let fails = events.iter().filter(|e| matches!(e, Event::Fail(_))).count();
//! assert_eq!(fails, 1);
//! assert_eq!(outcome.aggregate.fail.len(), 1);
//! ```

use crate::diagnostic::DiagnosticBlock;
use crate::line::{AssertionLine, Line, PlanLine};
use crate::plan;
use crate::record::{
    AssertionKind, AssertionRecord, CommentRecord, Diagnostic, ParseAggregate, PlanRecord,
    SummaryKind, SummaryRecord, TestRecord, VersionRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

/// Kinds of events a parser produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A version line
    Version,
    /// A test line
    Test,
    /// Any assertion, as soon as its line is read
    Assert,
    /// A passing assertion
    Pass,
    /// A failing assertion, once its diagnostic is complete
    Fail,
    /// The first plan line
    Plan,
    /// A free-text line
    Comment,
    /// A summary counter line
    Result,
}

impl EventKind {
    /// All kinds, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Version,
        Self::Test,
        Self::Assert,
        Self::Pass,
        Self::Fail,
        Self::Plan,
        Self::Comment,
        Self::Result,
    ];

    /// Lowercase event name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Test => "test",
            Self::Assert => "assert",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Plan => "plan",
            Self::Comment => "comment",
            Self::Result => "result",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "record", rename_all = "lowercase")]
pub enum Event {
    /// See [`EventKind::Version`]
    Version(VersionRecord),
    /// See [`EventKind::Test`]
    Test(TestRecord),
    /// See [`EventKind::Assert`]
    Assert(AssertionRecord),
    /// See [`EventKind::Pass`]
    Pass(AssertionRecord),
    /// See [`EventKind::Fail`]
    Fail(AssertionRecord),
    /// See [`EventKind::Plan`]
    Plan(PlanRecord),
    /// See [`EventKind::Comment`]
    Comment(CommentRecord),
    /// See [`EventKind::Result`]
    Result(SummaryRecord),
}

impl Event {
    /// The kind of this event
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Version(_) => EventKind::Version,
            Self::Test(_) => EventKind::Test,
            Self::Assert(_) => EventKind::Assert,
            Self::Pass(_) => EventKind::Pass,
            Self::Fail(_) => EventKind::Fail,
            Self::Plan(_) => EventKind::Plan,
            Self::Comment(_) => EventKind::Comment,
            Self::Result(_) => EventKind::Result,
        }
    }
}

/// Everything left once the stream has ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Events released by ending the stream (pending `fail` events)
    pub events: Vec<Event>,
    /// The validated aggregate
    pub aggregate: ParseAggregate,
}

/// Position of a failing assertion in the aggregate lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FailSlot {
    assert_index: usize,
    fail_index: usize,
}

/// Diagnostic block state of the stream
#[derive(Debug, Clone)]
enum BlockState {
    /// Outside any block
    Idle,
    /// Inside a block owned by a failing assertion
    Open {
        slot: FailSlot,
        block: DiagnosticBlock,
    },
    /// Inside a block with no failing assertion right above it
    Stray,
}

/// A streaming parser for TAP output
///
/// One parser handles exactly one stream: feed it lines with
/// [`TapParser::process_line`] and end the stream with [`TapParser::finish`].
#[derive(Debug, Clone)]
pub struct TapParser {
    aggregate: ParseAggregate,
    test_number: usize,
    block: BlockState,
    /// Failing assertion on the previous line, waiting for a block or not
    pending_fail: Option<FailSlot>,
    /// The previous non-empty line
    previous: Option<Line>,
    events: Vec<Event>,
}

impl TapParser {
    /// Create a new streaming parser
    #[must_use]
    pub fn new() -> Self {
        Self {
            aggregate: ParseAggregate::empty(),
            test_number: 0,
            block: BlockState::Idle,
            pending_fail: None,
            previous: None,
            events: Vec::new(),
        }
    }

    /// Records collected so far; `errors` stays empty until [`TapParser::finish`]
    #[must_use]
    pub fn aggregate(&self) -> &ParseAggregate {
        &self.aggregate
    }

    /// Number of the most recent test line (0 before the first)
    #[must_use]
    pub fn test_number(&self) -> usize {
        self.test_number
    }

    /// Check if a diagnostic block is currently open
    #[must_use]
    pub fn in_diagnostic_block(&self) -> bool {
        !matches!(self.block, BlockState::Idle)
    }

    /// Process a single line and return the events it produced
    ///
    /// The line must not include its terminator. Empty lines are skipped.
    pub fn process_line(&mut self, line: &str) -> Vec<Event> {
        if line.is_empty() {
            return Vec::new();
        }

        let classified = Line::classify(line);
        trace!(?classified, "classified line");

        if self.in_diagnostic_block() {
            if classified == Line::BlockEnd {
                self.close_block();
                self.previous = Some(classified);
                return self.take_events();
            }
            if !classified.is_top_level_record() {
                if let BlockState::Open { block, .. } = &mut self.block {
                    block.push_line(line);
                }
                self.previous = Some(classified);
                return self.take_events();
            }
            debug!(line, "diagnostic block left open by a new record");
            self.close_block();
        }

        if let Some(slot) = self.pending_fail.take() {
            if classified == Line::BlockStart {
                let block = DiagnosticBlock::open(&self.aggregate.fail[slot.fail_index].title);
                self.block = BlockState::Open { slot, block };
                self.previous = Some(classified);
                return self.take_events();
            }
            self.emit_fail(slot);
        }

        self.dispatch(line, &classified);
        self.previous = Some(classified);
        self.take_events()
    }

    /// End the stream
    ///
    /// Seals a block left open, releases a pending `fail` event and runs plan
    /// validation.
    #[must_use]
    pub fn finish(mut self) -> ParseOutcome {
        if let BlockState::Open { .. } = self.block {
            warn!("stream ended inside a diagnostic block");
        }
        self.close_block();

        if let Some(slot) = self.pending_fail.take() {
            self.emit_fail(slot);
        }

        let errors = plan::validate(&self.aggregate);
        for error in &errors {
            debug!(%error, "plan validation error");
        }
        self.aggregate.errors.extend(errors.into_iter().map(Into::into));

        ParseOutcome {
            events: std::mem::take(&mut self.events),
            aggregate: self.aggregate,
        }
    }

    fn dispatch(&mut self, line: &str, classified: &Line) {
        match classified {
            Line::Version { version } => {
                let record = VersionRecord {
                    raw: line.to_string(),
                    version: *version,
                };
                self.aggregate.versions.push(record.clone());
                self.events.push(Event::Version(record));
            }
            Line::Plan(plan) => self.handle_plan(line, plan),
            Line::Assertion(assertion) => self.handle_assertion(line, assertion),
            Line::BlockStart => {
                debug!("diagnostic block without a failing assertion, ignoring");
                self.block = BlockState::Stray;
            }
            Line::BlockEnd => {
                debug!("diagnostic block end outside a block, ignoring");
            }
            Line::Summary { name, count } => self.handle_summary(line, *name, *count),
            Line::Test { title } => self.handle_test(line, title),
            Line::Unrecognized => {
                let record = CommentRecord {
                    raw: line.to_string(),
                    test_number: self.test_number,
                };
                self.aggregate.comments.push(record.clone());
                self.events.push(Event::Comment(record));
            }
        }
    }

    fn handle_plan(&mut self, line: &str, plan: &PlanLine) {
        if !self.aggregate.plans.is_empty() {
            debug!(line, "ignoring repeated plan");
            return;
        }

        let record = PlanRecord {
            from: plan.from,
            to: plan.to,
            skip_reason: plan.skip_reason.clone(),
            raw: line.to_string(),
        };
        self.aggregate.plans.push(record.clone());
        self.events.push(Event::Plan(record));
    }

    fn handle_assertion(&mut self, line: &str, assertion: &AssertionLine) {
        let record = AssertionRecord {
            kind: AssertionKind::Assert,
            number: assertion.number,
            ok: assertion.ok,
            title: assertion.title.clone(),
            test_number: self.test_number,
            diagnostic: if assertion.ok {
                None
            } else {
                Some(Diagnostic::default())
            },
            raw: line.to_string(),
        };

        let assert_index = self.aggregate.asserts.len();
        self.aggregate.asserts.push(record.clone());
        self.events.push(Event::Assert(record.clone()));

        if record.passed() {
            self.aggregate.pass.push(record.clone());
            self.events.push(Event::Pass(record));
        } else {
            let fail_index = self.aggregate.fail.len();
            self.aggregate.fail.push(record);
            self.pending_fail = Some(FailSlot {
                assert_index,
                fail_index,
            });
        }
    }

    fn handle_summary(&mut self, line: &str, name: SummaryKind, count: Option<u64>) {
        let Some(count) = count else {
            debug!(line, "summary count out of range, treating as comment");
            self.dispatch(line, &Line::Unrecognized);
            return;
        };

        let record = SummaryRecord {
            name,
            count,
            raw: line.to_string(),
        };
        self.aggregate.results.push(record.clone());
        self.events.push(Event::Result(record));
    }

    fn handle_test(&mut self, line: &str, title: &str) {
        // Producers close with "# pass N" then a bare "# ok" banner
        if title == "ok" && self.previous.as_ref().is_some_and(Line::is_pass_summary) {
            trace!("suppressing trailing ok banner");
            return;
        }

        self.test_number += 1;
        let record = TestRecord {
            number: self.test_number,
            title: title.to_string(),
            raw: line.to_string(),
        };
        self.aggregate.tests.push(record.clone());
        self.events.push(Event::Test(record));
    }

    /// Seal the open block, if any, and release its `fail` event
    fn close_block(&mut self) {
        match std::mem::replace(&mut self.block, BlockState::Idle) {
            BlockState::Open { slot, block } => {
                let sealed = block.seal();
                for record in [
                    &mut self.aggregate.asserts[slot.assert_index],
                    &mut self.aggregate.fail[slot.fail_index],
                ] {
                    record.kind = sealed.kind;
                    record.diagnostic = Some(sealed.diagnostic.clone());
                }
                trace!(
                    fields = sealed.diagnostic.fields.len(),
                    "diagnostic block sealed"
                );
                self.emit_fail(slot);
            }
            BlockState::Stray | BlockState::Idle => {}
        }
    }

    fn emit_fail(&mut self, slot: FailSlot) {
        let record = self.aggregate.fail[slot.fail_index].clone();
        self.events.push(Event::Fail(record));
    }

    fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl Default for TapParser {
    fn default() -> Self {
        Self::new()
    }
}
