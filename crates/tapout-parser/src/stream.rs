// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Event subscriptions and whole-stream parsing
//!
//! [`Subscribers`] collects listeners per [`EventKind`]; [`TapStream`] drives a
//! [`TapParser`] and publishes every event to them. The `parse_*` functions
//! cover the common case of parsing a complete input.
//!
//! # Example
//!
//! ```
//! use tapout_parser::{EventKind, Subscribers, parse_str};
//!
//! let mut failures = Vec::new();
//! let subscribers = Subscribers::new().on(EventKind::Fail, |event| failures.push(event.clone()));
//! let aggregate = parse_str("1..1\nnot ok 1 nope\n", subscribers);
//!
//! assert_eq!(failures.len(), 1);
//! assert_eq!(aggregate.counts().failed, 1);
//! ```

use crate::error::TapError;
use crate::parser::{Event, EventKind, TapParser};
use crate::record::ParseAggregate;
use std::fmt;
use std::io::BufRead;
use tracing::debug;

type Listener<'a> = Box<dyn FnMut(&Event) + 'a>;
type CompletionListener<'a> = Box<dyn FnOnce(&ParseAggregate) + 'a>;

/// Listeners registered for one stream
#[derive(Default)]
pub struct Subscribers<'a> {
    /// `None` subscribes to every kind
    listeners: Vec<(Option<EventKind>, Listener<'a>)>,
    on_complete: Vec<CompletionListener<'a>>,
}

impl<'a> Subscribers<'a> {
    /// Create an empty set of listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one kind of event
    #[must_use]
    pub fn on(mut self, kind: EventKind, listener: impl FnMut(&Event) + 'a) -> Self {
        self.listeners.push((Some(kind), Box::new(listener)));
        self
    }

    /// Listen to every event
    #[must_use]
    pub fn on_any(mut self, listener: impl FnMut(&Event) + 'a) -> Self {
        self.listeners.push((None, Box::new(listener)));
        self
    }

    /// Receive the final aggregate once the stream has ended
    #[must_use]
    pub fn on_complete(mut self, listener: impl FnOnce(&ParseAggregate) + 'a) -> Self {
        self.on_complete.push(Box::new(listener));
        self
    }

    /// Check if no listener is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.on_complete.is_empty()
    }

    /// Deliver an event to matching listeners in registration order
    pub fn publish(&mut self, event: &Event) {
        let kind = event.kind();
        for (filter, listener) in &mut self.listeners {
            if filter.is_none_or(|k| k == kind) {
                listener(event);
            }
        }
    }

    fn complete(self, aggregate: &ParseAggregate) {
        for listener in self.on_complete {
            listener(aggregate);
        }
    }
}

impl fmt::Debug for Subscribers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .field("on_complete", &self.on_complete.len())
            .finish()
    }
}

/// A parser wired to a set of listeners
#[derive(Debug)]
pub struct TapStream<'a> {
    parser: TapParser,
    subscribers: Subscribers<'a>,
    lines: usize,
}

impl<'a> TapStream<'a> {
    /// Create a stream publishing to `subscribers`
    #[must_use]
    pub fn new(subscribers: Subscribers<'a>) -> Self {
        Self {
            parser: TapParser::new(),
            subscribers,
            lines: 0,
        }
    }

    /// Number of lines received so far, empty ones included
    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Feed one line (without terminator)
    pub fn push_line(&mut self, line: &str) {
        self.lines += 1;
        for event in self.parser.process_line(line) {
            self.subscribers.publish(&event);
        }
    }

    /// End the stream, notify completion listeners and return the aggregate
    pub fn finish(mut self) -> ParseAggregate {
        let outcome = self.parser.finish();
        for event in &outcome.events {
            self.subscribers.publish(event);
        }

        let aggregate = outcome.aggregate;
        debug!(
            lines = self.lines,
            asserts = aggregate.asserts.len(),
            errors = aggregate.errors.len(),
            "TAP stream finished"
        );
        self.subscribers.complete(&aggregate);
        aggregate
    }
}

/// Parse everything `reader` yields
///
/// Lines are split on `\n` (a preceding `\r` is removed too).
///
/// # Errors
///
/// Returns `TapError::Io` if reading fails or the input is not valid UTF-8.
/// Listeners may already have received events for earlier lines; the
/// completion listeners are not called.
pub fn parse_reader<R: BufRead>(
    reader: R,
    subscribers: Subscribers<'_>,
) -> Result<ParseAggregate, TapError> {
    let mut stream = TapStream::new(subscribers);
    for line in reader.lines() {
        stream.push_line(&line?);
    }
    Ok(stream.finish())
}

/// Parse a complete TAP document held in memory
#[must_use]
pub fn parse_str(input: &str, subscribers: Subscribers<'_>) -> ParseAggregate {
    parse_lines(input.lines(), subscribers)
}

/// Parse an already split sequence of lines
#[must_use]
pub fn parse_lines<I, S>(lines: I, subscribers: Subscribers<'_>) -> ParseAggregate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stream = TapStream::new(subscribers);
    for line in lines {
        stream.push_line(line.as_ref());
    }
    stream.finish()
}
