// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-of-stream plan validation

use crate::error::PlanError;
use crate::record::{AssertionRecord, ParseAggregate};

/// Cross-check the first plan against the recorded assertions
///
/// Returns at most one error. Streams with failing assertions are not
/// checked further since each failure is already reported on its own.
#[must_use]
pub fn validate(aggregate: &ParseAggregate) -> Vec<PlanError> {
    check(aggregate).into_iter().collect()
}

fn check(aggregate: &ParseAggregate) -> Option<PlanError> {
    let count = aggregate.asserts.len();

    let Some(plan) = aggregate.plan() else {
        return (count > 0).then_some(PlanError::NoPlan);
    };

    if aggregate.asserts.iter().any(AssertionRecord::failed) {
        return None;
    }

    if i128::try_from(count).ok() != Some(plan.expected_count()) {
        return Some(PlanError::IncorrectCount);
    }

    if count == 0 {
        return None;
    }

    let numbers = || aggregate.asserts.iter().filter_map(|a| a.number);
    if numbers().min() != Some(plan.from) {
        Some(PlanError::FirstNumberMismatch)
    } else if numbers().max() != Some(plan.to) {
        Some(PlanError::LastNumberMismatch)
    } else {
        None
    }
}
