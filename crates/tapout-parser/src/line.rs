// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Classification of single TAP lines
//!
//! [`Line::classify`] is stateless: it looks at one line (terminator already
//! stripped) and returns its kind together with the values captured from it.
//! Rules are tried in a fixed priority order and the first match wins:
//!
//! 1. `TAP version 13`
//! 2. `1..4` plans, optionally `1..0 # SKIP reason`
//! 3. `ok` / `not ok` assertions
//! 4. `  ---` diagnostic block start
//! 5. `  ...` diagnostic block end
//! 6. `# tests 4` style summary counters
//! 7. `# title` test lines
//! 8. anything else

use crate::record::SummaryKind;
use regex::Regex;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^TAP\s+version\s+(\d+)\s*$").expect("Invalid version regex")
});

static PLAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.\.(\d+)\s*(#\s*(?i:skip)\S*(?:\s+(.*?))?)?\s*$")
        .expect("Invalid plan regex")
});

static ASSERTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(not )?ok\b(?:\s+(\d+))?(?:\s+(?:-\s*)?(.*?))?\s*$")
        .expect("Invalid assertion regex")
});

static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#\s+(tests|pass|fail|todo)\s+(\d+)\s*$").expect("Invalid summary regex")
});

/// Prefix of the line opening a diagnostic block
pub const BLOCK_START: &str = "  ---";

/// Prefix of the line closing a diagnostic block
pub const BLOCK_END: &str = "  ...";

/// Values captured from an `ok` / `not ok` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionLine {
    /// Absence of the `not ` prefix
    pub ok: bool,
    /// Number following `ok`, if present and representable
    pub number: Option<u64>,
    /// Remaining text with any `-` separator removed
    pub title: String,
}

/// Values captured from a plan line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    /// Plan start
    pub from: u64,
    /// Plan end
    pub to: u64,
    /// Text after a `# SKIP` directive; empty when the directive has no reason
    pub skip_reason: Option<String>,
}

/// A classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `TAP version N`
    Version {
        /// Declared version, `None` if it overflows
        version: Option<u64>,
    },
    /// `from..to`
    Plan(PlanLine),
    /// `ok` / `not ok`
    Assertion(AssertionLine),
    /// `  ---`
    BlockStart,
    /// `  ...`
    BlockEnd,
    /// `# pass 3`
    Summary {
        /// Counter name
        name: SummaryKind,
        /// Reported value, `None` if it overflows
        count: Option<u64>,
    },
    /// `# title`
    Test {
        /// Trimmed text after `#`
        title: String,
    },
    /// Anything else
    Unrecognized,
}

impl Line {
    /// Classify one line
    #[must_use]
    pub fn classify(line: &str) -> Self {
        if let Some(caps) = VERSION.captures(line) {
            return Self::Version {
                version: caps[1].parse().ok(),
            };
        }

        if let Some(caps) = PLAN.captures(line) {
            // Bounds that overflow cannot describe a real plan
            if let (Ok(from), Ok(to)) = (caps[1].parse(), caps[2].parse()) {
                let skip_reason = caps.get(3).map(|_| {
                    caps.get(4)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                });
                return Self::Plan(PlanLine {
                    from,
                    to,
                    skip_reason,
                });
            }
        }

        if let Some(caps) = ASSERTION.captures(line) {
            return Self::Assertion(AssertionLine {
                ok: caps.get(1).is_none(),
                number: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                title: caps
                    .get(3)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            });
        }

        if line.starts_with(BLOCK_START) {
            return Self::BlockStart;
        }

        if line.starts_with(BLOCK_END) {
            return Self::BlockEnd;
        }

        if let Some(caps) = SUMMARY.captures(line) {
            if let Some(name) = SummaryKind::from_name(&caps[1]) {
                return Self::Summary {
                    name,
                    count: caps[2].parse().ok(),
                };
            }
        }

        if let Some(rest) = line.strip_prefix('#') {
            let title = rest.trim();
            if !title.is_empty() {
                return Self::Test {
                    title: title.to_string(),
                };
            }
        }

        Self::Unrecognized
    }

    /// Check if this is a `# pass N` summary line
    #[must_use]
    pub fn is_pass_summary(&self) -> bool {
        matches!(
            self,
            Self::Summary {
                name: SummaryKind::Pass,
                ..
            }
        )
    }

    /// Check if this line starts a new top-level record
    ///
    /// Such a line can never be part of a diagnostic block body.
    #[must_use]
    pub fn is_top_level_record(&self) -> bool {
        matches!(
            self,
            Self::Version { .. }
                | Self::Plan(_)
                | Self::Assertion(_)
                | Self::Summary { .. }
                | Self::Test { .. }
        )
    }
}
