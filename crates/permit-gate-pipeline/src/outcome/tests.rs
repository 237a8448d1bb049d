// crates/permit-gate-pipeline/src/outcome/tests.rs
// ============================================================================
// Module: Result Interpretation Unit Tests
// Description: Unit coverage for the fixed interpretation precedence.
// Purpose: Pin the reason synthesis and the JSON-over-log-scan precedence.
// Dependencies: permit-gate-pipeline, permit-gate-core
// ============================================================================

//! ## Overview
//! Pins the documented interpretation examples: structured errors win over
//! log markers, reason synthesis appends details in order, and clean results
//! interpret as success.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use permit_gate_core::RawExecutionResult;

use super::interpret_execution_result;
use crate::error::PipelineError;

/// Builds a raw result from response and log text.
fn raw(response: &str, logs: &str) -> RawExecutionResult {
    RawExecutionResult { response: response.to_string(), logs: logs.to_string() }
}

#[test]
fn structured_error_wins_over_log_scan() {
    let result = raw(
        r#"{"status":"error","error":"bad input","details":{"reason":"x","code":42}}"#,
        "prelude Error: oops\nmore",
    );
    match interpret_execution_result(&result) {
        Some(PipelineError::StructuredExecutionError { reason }) => {
            assert_eq!(reason, "bad input\nReason: x\nCode: 42");
        }
        other => panic!("expected structured error, got {other:?}"),
    }
}

#[test]
fn structured_error_appends_nested_details_message() {
    let result = raw(
        r#"{"status":"error","error":"denied","details":{"error":{"message":"limit hit"}}}"#,
        "",
    );
    match interpret_execution_result(&result) {
        Some(PipelineError::StructuredExecutionError { reason }) => {
            assert_eq!(reason, "denied\nDetails: limit hit");
        }
        other => panic!("expected structured error, got {other:?}"),
    }
}

#[test]
fn structured_error_without_error_member_uses_fallback() {
    let result = raw(r#"{"status":"error"}"#, "");
    match interpret_execution_result(&result) {
        Some(PipelineError::StructuredExecutionError { reason }) => {
            assert_eq!(reason, "Unknown error");
        }
        other => panic!("expected structured error, got {other:?}"),
    }
}

#[test]
fn non_json_response_falls_back_to_log_scan() {
    let result = raw("plain text", "line one\nsomewhere Error: oops\nmore");
    match interpret_execution_result(&result) {
        Some(PipelineError::LogScanExecutionError { reason }) => {
            assert_eq!(reason, "Lit Action error: oops");
        }
        other => panic!("expected log scan error, got {other:?}"),
    }
}

#[test]
fn log_scan_reads_to_end_without_trailing_newline() {
    let result = raw("plain text", "Error:   trailing space   ");
    match interpret_execution_result(&result) {
        Some(PipelineError::LogScanExecutionError { reason }) => {
            assert_eq!(reason, "Lit Action error: trailing space");
        }
        other => panic!("expected log scan error, got {other:?}"),
    }
}

#[test]
fn non_error_status_is_a_success() {
    let result = raw(r#"{"status":"ok","value":7}"#, "no markers here");
    assert!(interpret_execution_result(&result).is_none());
}

#[test]
fn clean_result_is_a_success() {
    let result = raw("done", "all quiet");
    assert!(interpret_execution_result(&result).is_none());
}
