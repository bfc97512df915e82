// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for tapout-parser

use thiserror::Error;

/// Errors that can occur while reading or encoding a TAP stream
///
/// Malformed TAP never produces one of these: unknown lines become comments
/// and plan inconsistencies are reported inside the aggregate.
#[derive(Debug, Error)]
pub enum TapError {
    /// Error reading from the line source (includes invalid UTF-8)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error encoding records as JSON
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural problems detected once the stream has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Assertions were made but no plan line was seen
    #[error("no plan provided")]
    NoPlan,

    /// The assertion count does not match the plan range
    #[error("incorrect number of assertions made")]
    IncorrectCount,

    /// The lowest assertion number differs from the plan start
    #[error("first assertion number does not equal the plan start")]
    FirstNumberMismatch,

    /// The highest assertion number differs from the plan end
    #[error("last assertion number does not equal the plan end")]
    LastNumberMismatch,
}
