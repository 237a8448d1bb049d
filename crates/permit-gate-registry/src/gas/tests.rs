// crates/permit-gate-registry/src/gas/tests.rs
// ============================================================================
// Module: Gas Margin Unit Tests
// Description: Unit and property coverage for the gas safety margin.
// Purpose: Pin the exact x120/100 truncating semantics.
// Dependencies: permit-gate-registry, proptest
// ============================================================================

//! ## Overview
//! Pins the documented margin examples and checks the margin bounds over
//! arbitrary estimates.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use proptest::prelude::proptest;

use super::apply_gas_margin;

#[test]
fn margin_matches_documented_examples() {
    assert_eq!(apply_gas_margin(1_000), 1_200);
    assert_eq!(apply_gas_margin(1_001), 1_201);
    assert_eq!(apply_gas_margin(0), 0);
    assert_eq!(apply_gas_margin(1), 1);
    assert_eq!(apply_gas_margin(5), 6);
}

#[test]
fn margin_saturates_at_u64_max() {
    assert_eq!(apply_gas_margin(u64::MAX), u64::MAX);
}

proptest! {
    #[test]
    fn margin_never_shrinks_the_estimate(estimate in 0_u64..=u64::MAX / 2) {
        let limit = apply_gas_margin(estimate);
        assert!(limit >= estimate);
        // Exact truncating arithmetic: limit equals (estimate * 120) / 100.
        let expected = u128::from(estimate) * 120 / 100;
        assert_eq!(u128::from(limit), expected);
    }
}
