// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Diagnostic block assembly
//!
//! A failing assertion may be followed by an indented block carrying failure
//! details:
//!
//! ```text
//! not ok 2 should be equal
//!   ---
//!     operator: equal
//!     expected: 1
//!     actual:   2
//!     at: Test.<anonymous> (/work/test.js:7:5)
//!     stack: |-
//!       Error: should be equal
//!           at Test.assert (/work/node_modules/tape/lib/test.js:228:54)
//!   ...
//! ```
//!
//! [`DiagnosticBlock`] consumes the body lines one at a time (markers
//! excluded) and is sealed when the closing marker arrives. Only the flat
//! `key: value` subset of YAML is understood, plus `|-` literal values that
//! take the following line verbatim. Everything after a `stack:` key is
//! captured as stack text.

use crate::record::{AssertionKind, Diagnostic, DiagnosticValue, StackFrame};
use tracing::trace;

/// Value marking a literal block scalar
const LITERAL_MARKER: &str = "|-";

/// Title tape gives to a plan/count mismatch reported as an assertion
pub const PLAN_COUNT_TITLE: &str = "plan != count";

/// What the next body line is read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// `key: value` fields
    Fields,
    /// Stack trace text after a `stack:` key
    Stack,
}

/// Result of sealing a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlock {
    /// The completed diagnostic
    pub diagnostic: Diagnostic,
    /// Record type the owning assertion should carry
    pub kind: AssertionKind,
}

/// An open diagnostic block belonging to one failing assertion
#[derive(Debug, Clone)]
pub struct DiagnosticBlock {
    diagnostic: Diagnostic,
    mode: BlockMode,
    literal_key: Option<String>,
    raw: String,
    stack: String,
    plan_count: bool,
}

impl DiagnosticBlock {
    /// Open a block for the assertion with the given title
    #[must_use]
    pub fn open(title: &str) -> Self {
        Self {
            diagnostic: Diagnostic::default(),
            mode: BlockMode::Fields,
            literal_key: None,
            raw: String::new(),
            stack: String::new(),
            plan_count: title == PLAN_COUNT_TITLE,
        }
    }

    /// Current reading mode
    #[must_use]
    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    /// Consume one body line
    pub fn push_line(&mut self, line: &str) {
        match self.mode {
            BlockMode::Stack => {
                self.stack.push_str(line.trim());
                self.stack.push('\n');
            }
            BlockMode::Fields => self.push_field_line(line),
        }
    }

    fn push_field_line(&mut self, line: &str) {
        self.raw.push_str(line);
        self.raw.push('\n');

        let trimmed = line.trim();
        let (key, rest) = split_first(trimmed, ':');

        if key == "stack" {
            trace!("diagnostic block switching to stack capture");
            self.mode = BlockMode::Stack;
            return;
        }

        if let Some(pending) = self.literal_key.take() {
            self.insert(pending, DiagnosticValue::Text(trimmed.to_string()));
        } else if rest.map(str::trim) == Some(LITERAL_MARKER) {
            self.literal_key = Some(key.to_string());
        } else {
            let text = strip_quotes(rest.unwrap_or_default());
            let value = if key == "at" {
                parse_frame(&text).map_or(DiagnosticValue::Text(text), DiagnosticValue::Frame)
            } else {
                DiagnosticValue::Text(text)
            };
            self.insert(key.to_string(), value);
        }

        if self.plan_count {
            self.diagnostic.fields.remove("at");
            self.insert("operator".to_string(), DiagnosticValue::from("count"));
        }
    }

    fn insert(&mut self, key: String, value: DiagnosticValue) {
        self.diagnostic.fields.insert(key, value);
    }

    /// Close the block and produce the finished diagnostic
    #[must_use]
    pub fn seal(self) -> SealedBlock {
        let mut diagnostic = self.diagnostic;
        let mut raw = self.raw;

        if !self.stack.is_empty() {
            raw.push_str(&self.stack);
            diagnostic.stack = Some(self.stack);
        }

        // The computed block text takes precedence over a body key of the same name
        diagnostic.fields.remove("raw");
        diagnostic.raw = Some(raw.trim_end().to_string());

        SealedBlock {
            diagnostic,
            kind: if self.plan_count {
                AssertionKind::Plan
            } else {
                AssertionKind::Assert
            },
        }
    }
}

/// Split on the first occurrence of `separator`
fn split_first(text: &str, separator: char) -> (&str, Option<&str>) {
    match text.split_once(separator) {
        Some((key, rest)) => (key.trim_end(), Some(rest)),
        None => (text, None),
    }
}

fn strip_quotes(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\'' && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Decompose `description (file:line:column)` or `file:line:column`
fn parse_frame(value: &str) -> Option<StackFrame> {
    let location = match (value.rfind('('), value.rfind(')')) {
        (Some(open), Some(close)) if open < close => &value[open + 1..close],
        _ => value,
    };

    let mut parts = location.trim().rsplitn(3, ':');
    let character = parts.next()?.parse().ok()?;
    let line = parts.next()?.parse().ok()?;
    let file = parts.next()?;
    if file.is_empty() {
        return None;
    }

    Some(StackFrame {
        file: file.to_string(),
        line,
        character,
    })
}
