// crates/permit-gate-pipeline/src/outcome.rs
// ============================================================================
// Module: Result Interpretation
// Description: Deterministic interpretation of raw execution results.
// Purpose: Turn free-text response and log fields into a fixed-precedence
// success or failure outcome.
// Dependencies: crate::error, permit-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Interpretation runs in fixed precedence: a parsed response whose `status`
//! is `"error"` wins, then a literal `Error:` marker in the logs, and only
//! then is the invocation a success. Reason strings are synthesized exactly
//! the same way every time so downstream tooling can match on them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use permit_gate_core::RawExecutionResult;

use crate::error::PipelineError;

// ============================================================================
// SECTION: Pipeline Stages
// ============================================================================

/// Stage of the execution pipeline state machine.
///
/// # Invariants
/// - Variants are stable and ordered; a failed outcome names the stage that
///   terminated the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum PipelineStage {
    /// Tool identifier resolved against the catalog.
    ToolResolved,
    /// Delegatee permission checked, with optional interactive grant.
    PermissionChecked,
    /// Caller and prompted parameters merged.
    ParametersCollected,
    /// On-ledger policy fetched and decoded.
    PolicyFetched,
    /// Parameters validated against the decoded policy.
    ParametersValidated,
    /// Execution dispatched and the raw result interpreted.
    Executed,
}

impl PipelineStage {
    /// Returns a stable label for the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolResolved => "tool_resolved",
            Self::PermissionChecked => "permission_checked",
            Self::ParametersCollected => "parameters_collected",
            Self::PolicyFetched => "policy_fetched",
            Self::ParametersValidated => "parameters_validated",
            Self::Executed => "executed",
        }
    }
}

// ============================================================================
// SECTION: Execution Outcome
// ============================================================================

/// Final pipeline outcome for one invocation.
///
/// # Invariants
/// - `Failed` is the non-throwing failure shape; reasons are the display text
///   of the tagged error that terminated the pipeline.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The invocation succeeded.
    Succeeded {
        /// Raw result returned by the execution backend.
        result: RawExecutionResult,
    },
    /// The invocation terminated in an expected failure.
    Failed {
        /// Stage that terminated the pipeline.
        stage: PipelineStage,
        /// Human-readable failure reason.
        reason: String,
        /// Raw result, when execution was dispatched before failing.
        result: Option<RawExecutionResult>,
    },
}

impl ExecutionOutcome {
    /// Returns true for a successful invocation.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns the failure reason, when the invocation failed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }
}

// ============================================================================
// SECTION: Interpretation
// ============================================================================

/// Literal marker scanned for in raw execution logs.
const LOG_ERROR_MARKER: &str = "Error:";

/// Prefix attached to log-scan failure reasons.
const LOG_ERROR_PREFIX: &str = "Lit Action error: ";

/// Fallback reason for structured errors without an `error` member.
const UNKNOWN_ERROR_REASON: &str = "Unknown error";

/// Interprets a raw execution result, returning the failure when one exists.
///
/// Precedence is fixed: the structured response path wins over the log scan,
/// and only when both pass is the result a success (`None`).
#[must_use]
pub fn interpret_execution_result(raw: &RawExecutionResult) -> Option<PipelineError> {
    if let Some(reason) = structured_error_reason(&raw.response) {
        return Some(PipelineError::StructuredExecutionError { reason });
    }
    log_scan_reason(&raw.logs)
        .map(|extracted| PipelineError::LogScanExecutionError {
            reason: format!("{LOG_ERROR_PREFIX}{extracted}"),
        })
}

/// Synthesizes the failure reason from a structured error response.
///
/// Returns `None` when the response does not parse or its `status` is not
/// `"error"`.
fn structured_error_reason(response: &str) -> Option<String> {
    let value: Value = serde_json::from_str(response).ok()?;
    if value.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }
    let mut reason = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ERROR_REASON)
        .to_string();
    if let Some(details) = value.get("details") {
        if let Some(detail_reason) = details.get("reason").and_then(Value::as_str) {
            reason.push_str("\nReason: ");
            reason.push_str(detail_reason);
        }
        if let Some(code) = details.get("code").and_then(scalar_text) {
            reason.push_str("\nCode: ");
            reason.push_str(&code);
        }
        if let Some(message) = details
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
        {
            reason.push_str("\nDetails: ");
            reason.push_str(message);
        }
    }
    Some(reason)
}

/// Renders a scalar detail member as plain text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Extracts the error line following the literal log marker.
fn log_scan_reason(logs: &str) -> Option<String> {
    let start = logs.find(LOG_ERROR_MARKER)? + LOG_ERROR_MARKER.len();
    let rest = &logs[start..];
    let line = rest.split('\n').next().unwrap_or(rest);
    Some(line.trim().to_string())
}

#[cfg(test)]
mod tests;
