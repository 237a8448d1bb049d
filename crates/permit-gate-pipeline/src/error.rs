// crates/permit-gate-pipeline/src/error.rs
// ============================================================================
// Module: Pipeline Errors
// Description: Closed error taxonomy for the execution pipeline.
// Purpose: Separate expected, returned failures from thrown wraps.
// Dependencies: permit-gate-core, thiserror
// ============================================================================

//! ## Overview
//! Every expected pipeline failure is a tagged variant whose display text is
//! the reason callers see in a failed outcome. `ExecutionFailed` is the one
//! thrown shape: unexpected dependency failures are wrapped into it and
//! propagate as an error instead of a returned failure value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;

use thiserror::Error as ThisError;

use permit_gate_core::ToolCid;

// ============================================================================
// SECTION: Pipeline Errors
// ============================================================================

/// Execution pipeline errors.
///
/// # Invariants
/// - `PermissionDenied` renders exactly `Permission denied by user`.
/// - `StructuredExecutionError` and `LogScanExecutionError` render the
///   synthesized reason verbatim.
#[derive(Debug, ThisError)]
pub enum PipelineError {
    /// The pipeline has no live signer yet.
    #[error("tool execution pipeline not initialized")]
    NotInitialized,
    /// The tool identifier has no catalog entry.
    #[error("unknown tool: {tool}")]
    UnknownTool {
        /// Unresolvable tool identifier.
        tool: ToolCid,
    },
    /// The operator declined the permission grant.
    #[error("Permission denied by user")]
    PermissionDenied,
    /// Registering the permission or policy failed.
    #[error("policy registration failed for tool {tool}: {message}")]
    PolicyRegistrationFailed {
        /// Tool the registration targeted.
        tool: ToolCid,
        /// Folded registration failure text.
        message: String,
    },
    /// The operator cancelled parameter collection.
    #[error("parameter collection cancelled: {message}")]
    ParameterCollectionCancelled {
        /// Cancellation context.
        message: String,
    },
    /// Parameter collection produced unusable input.
    #[error("parameter collection invalid: {message}")]
    ParameterCollectionInvalid {
        /// Failure context.
        message: String,
    },
    /// Parameters violated the decoded policy.
    #[error("policy validation failed for tool {tool}: {message}")]
    PolicyValidationFailed {
        /// Tool whose policy rejected the parameters.
        tool: ToolCid,
        /// Validation failure text, including the offending parameter.
        message: String,
    },
    /// The execution response reported a structured error status.
    #[error("{reason}")]
    StructuredExecutionError {
        /// Synthesized failure reason.
        reason: String,
    },
    /// The execution logs carried an error marker.
    #[error("{reason}")]
    LogScanExecutionError {
        /// Synthesized failure reason.
        reason: String,
    },
    /// An unexpected dependency failure; the thrown shape.
    #[error("tool execution failed for {tool}: {source}")]
    ToolExecutionFailed {
        /// Tool whose invocation failed.
        tool: ToolCid,
        /// Underlying unexpected failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}
