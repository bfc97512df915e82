// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for streaming parser
//!
//! This fuzzes the `TapParser` which processes TAP output line-by-line
//! incrementally.

#![no_main]

use libfuzzer_sys::fuzz_target;

use tapout_parser::{Event, TapParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut parser = TapParser::new();
        let mut fails = 0;

        // Process each line - parser should never panic
        for line in input.lines() {
            fails += parser
                .process_line(line)
                .iter()
                .filter(|e| matches!(e, Event::Fail(_)))
                .count();
        }

        // Finalize should never panic
        let outcome = parser.finish();
        fails += outcome
            .events
            .iter()
            .filter(|e| matches!(e, Event::Fail(_)))
            .count();

        assert_eq!(fails, outcome.aggregate.fail.len());
    }
});
