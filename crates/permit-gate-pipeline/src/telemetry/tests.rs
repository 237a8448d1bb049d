// crates/permit-gate-pipeline/src/telemetry/tests.rs
// ============================================================================
// Module: Telemetry Unit Tests
// Description: Unit coverage for metric label stability.
// Purpose: Pin the label strings downstream dashboards match on.
// Dependencies: permit-gate-pipeline
// ============================================================================

//! ## Overview
//! Pins the outcome label strings and the latency bucket ordering.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use super::EXECUTION_LATENCY_BUCKETS_MS;
use super::ExecutionOutcomeLabel;

#[test]
fn outcome_labels_are_stable() {
    assert_eq!(ExecutionOutcomeLabel::Succeeded.as_str(), "succeeded");
    assert_eq!(ExecutionOutcomeLabel::ReturnedFailure.as_str(), "returned_failure");
    assert_eq!(ExecutionOutcomeLabel::ThrownFailure.as_str(), "thrown_failure");
}

#[test]
fn latency_buckets_are_strictly_increasing() {
    let increasing = EXECUTION_LATENCY_BUCKETS_MS
        .windows(2)
        .all(|pair| pair[0] < pair[1]);
    assert!(increasing);
}
