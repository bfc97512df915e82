// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the line classifier
//!
//! This fuzzes `Line::classify` with single lines of arbitrary text.

#![no_main]

use libfuzzer_sys::fuzz_target;

use tapout_parser::line::Line;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Classification should never panic
        let _ = Line::classify(input);
    }
});
