// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for tapout-parser
//!
//! These tests parse recorded TAP output from fixture files and check the
//! records, events and JSON encoding end to end.

use similar_asserts::assert_eq;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tapout_parser::{
    AssertionKind, Event, EventKind, ParseAggregate, Subscribers, SummaryKind, parse_reader,
    parse_str,
};

/// Get the fixtures directory for test data
fn fixtures_dir() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn parse_fixture(name: &str) -> (Vec<Event>, ParseAggregate) {
    let file = File::open(fixtures_dir().join(name)).expect("Failed to open fixture");
    let mut events = Vec::new();
    let aggregate = parse_reader(
        BufReader::new(file),
        Subscribers::new().on_any(|event| events.push(event.clone())),
    )
    .expect("Fixture should parse");
    (events, aggregate)
}

#[test]
fn test_yaml_fixture_record_counts() {
    let (_, aggregate) = parse_fixture("tape-yaml.tap");

    assert_eq!(aggregate.versions.len(), 1);
    assert_eq!(aggregate.tests.len(), 3);
    assert_eq!(aggregate.asserts.len(), 7);
    assert_eq!(aggregate.pass.len(), 5);
    assert_eq!(aggregate.fail.len(), 2);
    assert_eq!(aggregate.comments.len(), 1);
    assert_eq!(aggregate.plans.len(), 1);
    assert_eq!(aggregate.results.len(), 3);
    // Failures short-circuit plan validation
    assert!(aggregate.errors.is_empty());
}

#[test]
fn test_yaml_fixture_tests_and_comments() {
    let (_, aggregate) = parse_fixture("tape-yaml.tap");

    let titles: Vec<&str> = aggregate.tests.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["test 1", "test 2", "test 3"]);
    assert_eq!(aggregate.tests[0].raw, "# test 1");

    let comment = &aggregate.comments[0];
    assert_eq!(comment.raw, "this is a console log");
    assert_eq!(comment.test_number, 1);

    let first = &aggregate.asserts[0];
    assert_eq!(first.title, "first assertion has yaml,");
    assert!(first.ok);
    assert_eq!(first.number, Some(1));
    assert_eq!(first.test_number, 1);
    // The block under a passing assertion is dropped
    assert!(first.diagnostic.is_none());
}

#[test]
fn test_yaml_fixture_equal_failure() {
    let (_, aggregate) = parse_fixture("tape-yaml.tap");

    let failure = &aggregate.fail[0];
    assert_eq!(failure.number, Some(3));
    assert_eq!(failure.test_number, 2);
    assert_eq!(failure.kind, AssertionKind::Assert);

    let diagnostic = failure.diagnostic.as_ref().expect("diagnostic");
    assert_eq!(diagnostic.text("operator"), Some("equal"));
    assert_eq!(diagnostic.text("expected"), Some("you"));
    assert_eq!(diagnostic.text("actual"), Some("me"));

    let frame = diagnostic
        .get("at")
        .and_then(|v| v.as_frame())
        .expect("at frame");
    assert_eq!(frame.file, "/work/test/index.js");
    assert_eq!((frame.line, frame.character), (12, 5));

    assert_eq!(
        diagnostic.raw.as_deref(),
        Some(
            "    operator: equal\n    expected: 'you'\n    actual:   'me'\n    at: Test.<anonymous> (/work/test/index.js:12:5)"
        )
    );
    assert_eq!(diagnostic.stack, None);
}

#[test]
fn test_yaml_fixture_deep_equal_failure() {
    let (_, aggregate) = parse_fixture("tape-yaml.tap");

    let failure = &aggregate.fail[1];
    assert_eq!(failure.number, Some(5));
    assert_eq!(failure.test_number, 3);

    let diagnostic = failure.diagnostic.as_ref().expect("diagnostic");
    assert_eq!(diagnostic.text("operator"), Some("deepEqual"));
    assert_eq!(diagnostic.text("expected"), Some("{ a: 1 }"));
    assert_eq!(diagnostic.text("actual"), Some("{ a: 2 }"));
    assert_eq!(
        diagnostic.stack.as_deref(),
        Some(
            "Error: should be deeply equal\n\
             at Test.assert (/work/node_modules/tape/lib/test.js:224:54)\n\
             at Test.bound [as _assert] (/work/node_modules/tape/lib/test.js:76:32)\n"
        )
    );

    // Failing assertions appear identically in both lists
    assert_eq!(aggregate.asserts[4], *failure);
}

#[test]
fn test_yaml_fixture_plan_and_summaries() {
    let (_, aggregate) = parse_fixture("tape-yaml.tap");

    let plan = aggregate.plan().expect("plan");
    assert_eq!((plan.from, plan.to), (1, 7));
    assert_eq!(plan.skip_reason, None);

    let results: Vec<(SummaryKind, u64)> =
        aggregate.results.iter().map(|r| (r.name, r.count)).collect();
    assert_eq!(
        results,
        vec![
            (SummaryKind::Tests, 7),
            (SummaryKind::Pass, 5),
            (SummaryKind::Fail, 2),
        ]
    );
    assert_eq!(aggregate.versions[0].version, Some(13));
}

#[test]
fn test_yaml_fixture_event_order() {
    let (events, _) = parse_fixture("tape-yaml.tap");

    let kinds: Vec<EventKind> = events.iter().map(Event::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Version,
            EventKind::Test,
            EventKind::Assert,
            EventKind::Pass,
            EventKind::Assert,
            EventKind::Pass,
            EventKind::Comment,
            EventKind::Test,
            EventKind::Assert,
            EventKind::Fail,
            EventKind::Assert,
            EventKind::Pass,
            EventKind::Test,
            EventKind::Assert,
            EventKind::Fail,
            EventKind::Assert,
            EventKind::Pass,
            EventKind::Assert,
            EventKind::Pass,
            EventKind::Plan,
            EventKind::Result,
            EventKind::Result,
            EventKind::Result,
        ]
    );
}

#[test]
fn test_passing_fixture_suppresses_ok_banner() {
    let (_, aggregate) = parse_fixture("tape-passing.tap");

    assert_eq!(aggregate.tests.len(), 2);
    assert_eq!(aggregate.pass.len(), 4);
    assert!(aggregate.comments.is_empty());
    assert!(aggregate.errors.is_empty());
    assert!(aggregate.all_passed());
    assert_eq!(aggregate.asserts[3].title, "(unnamed assert)");

    let counts = aggregate.counts();
    assert_eq!((counts.total, counts.passed, counts.failed), (4, 4, 0));
}

#[test]
fn test_plan_count_fixture_relabels_failure() {
    let (events, aggregate) = parse_fixture("plan-count.tap");

    let failure = &aggregate.fail[0];
    assert_eq!(failure.kind, AssertionKind::Plan);
    assert_eq!(failure.title, "plan != count");

    let diagnostic = failure.diagnostic.as_ref().expect("diagnostic");
    assert_eq!(diagnostic.text("operator"), Some("count"));
    assert_eq!(diagnostic.text("expected"), Some("3"));
    assert_eq!(diagnostic.text("actual"), Some("2"));
    assert!(diagnostic.get("at").is_none());

    let fail_events = events
        .iter()
        .filter(|e| e.kind() == EventKind::Fail)
        .count();
    assert_eq!(fail_events, 1);

    let json = serde_json::to_value(&aggregate).expect("Should encode");
    assert_eq!(json["fail"][0]["type"], "plan");
}

#[test]
fn test_aggregate_json_shape() {
    let (_, aggregate) = parse_fixture("tape-yaml.tap");
    let json: serde_json::Value =
        serde_json::from_str(&aggregate.to_json_pretty().expect("Should encode"))
            .expect("Valid JSON");

    assert_eq!(json["tests"][1]["number"], 2);
    assert_eq!(json["asserts"][2]["testNumber"], 2);
    assert_eq!(json["asserts"][2]["diagnostic"]["operator"], "equal");
    assert_eq!(json["asserts"][2]["diagnostic"]["at"]["line"], 12);
    assert!(json["pass"][0].get("diagnostic").is_none());
    assert_eq!(json["comments"][0]["testNumber"], 1);
    assert_eq!(json["plans"][0]["from"], 1);
    assert_eq!(json["results"][1]["name"], "pass");
    assert_eq!(json["versions"][0]["raw"], "TAP version 13");
    assert!(json["errors"].as_array().expect("errors array").is_empty());
}

#[test]
fn test_parsing_is_deterministic() {
    let input = std::fs::read_to_string(fixtures_dir().join("tape-yaml.tap"))
        .expect("Failed to read fixture");

    let first = parse_str(&input, Subscribers::new())
        .to_json()
        .expect("Should encode");
    let second = parse_str(&input, Subscribers::new())
        .to_json()
        .expect("Should encode");
    assert_eq!(first, second);
}

#[test]
fn test_structural_errors() {
    let cases = [
        ("", vec![]),
        ("1..2\nok 1 a\nok 2 b\n", vec![]),
        ("1..2\nok 1 a\n", vec!["incorrect number of assertions made"]),
        ("ok 1 a\n", vec!["no plan provided"]),
        (
            "1..2\nok 2 a\nok 3 b\n",
            vec!["first assertion number does not equal the plan start"],
        ),
        (
            "1..3\nok 1 a\nok 2 b\nok 2 c\n",
            vec!["last assertion number does not equal the plan end"],
        ),
        ("1..3\nnot ok 1 a\n", vec![]),
        ("1..0 # SKIP nothing to do\n", vec![]),
    ];

    for (input, expected) in cases {
        let aggregate = parse_str(input, Subscribers::new());
        let messages: Vec<&str> = aggregate
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(messages, expected, "input: {input:?}");
    }
}

#[test]
fn test_skip_plan_reason() {
    let aggregate = parse_str("1..0 # SKIP no browser available\n", Subscribers::new());
    assert_eq!(
        aggregate.plans[0].skip_reason.as_deref(),
        Some("no browser available")
    );

    let json = serde_json::to_value(&aggregate).expect("Should encode");
    assert_eq!(json["plans"][0]["skipReason"], "no browser available");
}

#[test]
fn test_events_serialize_as_json_lines() {
    let mut lines = Vec::new();
    let _aggregate = parse_str(
        "# t\nnot ok 1 a\n",
        Subscribers::new().on_any(|event| {
            lines.push(serde_json::to_string(event).expect("Should encode"));
        }),
    );

    assert_eq!(lines.len(), 3);
    let fail: serde_json::Value = serde_json::from_str(&lines[2]).expect("Valid JSON");
    assert_eq!(fail["event"], "fail");
    assert_eq!(fail["record"]["title"], "a");
    assert_eq!(fail["record"]["testNumber"], 1);

    let back: Event = serde_json::from_str(&lines[0]).expect("Should decode");
    assert_eq!(back.kind(), EventKind::Test);
}
