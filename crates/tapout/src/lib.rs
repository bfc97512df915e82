// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapout library
//!
//! This module exports the command line configuration and the conversion
//! loop of the tapout binary for use in integration tests and as a library.

pub mod config;
pub mod run;
