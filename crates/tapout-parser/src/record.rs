// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Typed records produced from a TAP stream
//!
//! Every record keeps the `raw` line it was built from. Field names are
//! serialized in camelCase (`testNumber`, `skipReason`) so the JSON output
//! matches what TAP reporters conventionally consume.

use crate::error::{PlanError, TapError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A `TAP version N` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// The line as received
    pub raw: String,
    /// Declared protocol version, if it fits in a `u64`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// A `# title` line opening a new group of assertions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    /// 1-based position among the tests of the stream
    pub number: usize,
    /// Text after the leading `#`
    pub title: String,
    /// The line as received
    pub raw: String,
}

/// Whether an assertion record is a regular check or a plan failure
///
/// Producers such as tape report a plan/count mismatch as a failing assertion
/// titled `plan != count`; once its diagnostic block is read the record is
/// relabelled as [`AssertionKind::Plan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionKind {
    /// An ordinary `ok` / `not ok` line
    #[default]
    Assert,
    /// A relabelled `plan != count` failure
    Plan,
}

/// An `ok` / `not ok` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionRecord {
    /// Record type
    #[serde(rename = "type", default)]
    pub kind: AssertionKind,
    /// Assertion number as written on the line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    /// `true` for `ok`, `false` for `not ok`
    pub ok: bool,
    /// Description following the number
    pub title: String,
    /// Number of the enclosing test (0 before the first test line)
    pub test_number: usize,
    /// Failure details; always `None` for passing assertions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    /// The line as received
    pub raw: String,
}

impl AssertionRecord {
    /// Check if the assertion passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.ok
    }

    /// Check if the assertion failed
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.ok
    }
}

/// A `from..to` plan line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    /// First expected assertion number
    pub from: u64,
    /// Last expected assertion number
    pub to: u64,
    /// Reason given by a `# SKIP` directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// The line as received
    pub raw: String,
}

impl PlanRecord {
    /// Number of assertions the plan announces
    ///
    /// Negative when the range is reversed (`5..2`).
    #[must_use]
    pub fn expected_count(&self) -> i128 {
        i128::from(self.to) - i128::from(self.from) + 1
    }
}

/// Free text outside any diagnostic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// The line as received
    pub raw: String,
    /// Number of the enclosing test (0 before the first test line)
    pub test_number: usize,
}

/// Counter named by a producer summary line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    /// `# tests N`
    Tests,
    /// `# pass N`
    Pass,
    /// `# fail N`
    Fail,
    /// `# todo N`
    Todo,
}

impl SummaryKind {
    /// Parse a summary counter name, ignoring case
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tests" => Some(Self::Tests),
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "todo" => Some(Self::Todo),
            _ => None,
        }
    }
}

/// A producer-emitted `# pass 5` style line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Which counter the line reports
    pub name: SummaryKind,
    /// The reported value
    pub count: u64,
    /// The line as received
    pub raw: String,
}

/// A structural problem found after the stream ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Human-readable description
    pub message: String,
}

impl From<PlanError> for ErrorRecord {
    fn from(error: PlanError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A source location parsed from an `at:` diagnostic field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file path (may itself contain `:`)
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub character: u32,
}

/// Value of a single diagnostic field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticValue {
    /// Plain text value
    Text(String),
    /// Decomposed `at:` location
    Frame(StackFrame),
}

impl DiagnosticValue {
    /// The text of a [`DiagnosticValue::Text`] value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Frame(_) => None,
        }
    }

    /// The location of a [`DiagnosticValue::Frame`] value
    #[must_use]
    pub fn as_frame(&self) -> Option<&StackFrame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for DiagnosticValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Failure details attached to a failing assertion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// `key: value` fields in key order
    #[serde(flatten)]
    pub fields: BTreeMap<String, DiagnosticValue>,
    /// Captured stack trace lines, newline-terminated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Right-trimmed text of the whole block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Diagnostic {
    /// Check if nothing was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.stack.is_none() && self.raw.is_none()
    }

    /// Look up a field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DiagnosticValue> {
        self.fields.get(key)
    }

    /// Look up a text field
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(DiagnosticValue::as_text)
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Pass/fail/total tallies derived from the assertion lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// All assertions
    pub total: usize,
    /// Passing assertions
    pub passed: usize,
    /// Failing assertions
    pub failed: usize,
}

/// Everything parsed from one stream, keyed by pluralized record type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseAggregate {
    /// Test lines in arrival order
    pub tests: Vec<TestRecord>,
    /// Every assertion, passing or failing
    pub asserts: Vec<AssertionRecord>,
    /// Version lines
    pub versions: Vec<VersionRecord>,
    /// Producer summary lines
    pub results: Vec<SummaryRecord>,
    /// Free-text lines
    pub comments: Vec<CommentRecord>,
    /// The first plan line, if any
    pub plans: Vec<PlanRecord>,
    /// Passing assertions
    pub pass: Vec<AssertionRecord>,
    /// Failing assertions, with diagnostics
    pub fail: Vec<AssertionRecord>,
    /// Structural errors, filled in at end of stream
    pub errors: Vec<ErrorRecord>,
}

impl ParseAggregate {
    /// Create an empty aggregate
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The plan that validation is checked against
    #[must_use]
    pub fn plan(&self) -> Option<&PlanRecord> {
        self.plans.first()
    }

    /// Tally assertions
    #[must_use]
    pub fn counts(&self) -> Counts {
        Counts {
            total: self.asserts.len(),
            passed: self.pass.len(),
            failed: self.fail.len(),
        }
    }

    /// Check if the run had no failing assertions and no structural errors
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.fail.is_empty() && self.errors.is_empty()
    }

    /// Encode as compact JSON
    ///
    /// # Errors
    ///
    /// Returns `TapError::Json` if encoding fails.
    pub fn to_json(&self) -> Result<String, TapError> {
        serde_json::to_string(self).map_err(TapError::from)
    }

    /// Encode as JSON indented with two spaces
    ///
    /// # Errors
    ///
    /// Returns `TapError::Json` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, TapError> {
        serde_json::to_string_pretty(self).map_err(TapError::from)
    }
}
