// crates/permit-gate-pipeline/src/lib.rs
// ============================================================================
// Module: Permit Gate Pipeline
// Description: Staged gate for tool invocations on behalf of a PKP.
// Purpose: Check permission, resolve and decode policy, validate parameters,
// dispatch execution, and interpret the raw result deterministically.
// Dependencies: permit-gate-core, permit-gate-registry, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The execution pipeline advances through fixed stages: resolve the tool,
//! check permission (with an optional human-in-the-loop grant), collect
//! parameters, fetch and decode the active policy, validate parameters, and
//! dispatch execution. Expected failures come back as a non-throwing
//! [`ExecutionOutcome::Failed`] value; anything unexpected escapes as an
//! error. Both control paths are part of the contract and callers must handle
//! both.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod callbacks;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callbacks::ParameterPrompt;
pub use callbacks::PermissionPrompt;
pub use callbacks::PipelineCallbacks;
pub use callbacks::PolicyDraft;
pub use callbacks::PolicyFailurePrompt;
pub use callbacks::PolicyPrompt;
pub use callbacks::PromptError;
pub use callbacks::RegistrationListener;
pub use error::PipelineError;
pub use outcome::ExecutionOutcome;
pub use outcome::PipelineStage;
pub use outcome::interpret_execution_result;
pub use pipeline::ExecutionContext;
pub use pipeline::ExecutionPipeline;
pub use pipeline::ExecutionRequest;
pub use telemetry::EXECUTION_LATENCY_BUCKETS_MS;
pub use telemetry::ExecutionOutcomeLabel;
pub use telemetry::MetricsSink;
