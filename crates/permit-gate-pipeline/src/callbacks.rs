// crates/permit-gate-pipeline/src/callbacks.rs
// ============================================================================
// Module: Pipeline Callbacks
// Description: Capability interfaces for human-in-the-loop pipeline branches.
// Purpose: Keep the pipeline contract enumerable and testable without a UI.
// Dependencies: permit-gate-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each optional branch of the pipeline is a one-method capability trait,
//! injected per invocation. The surrounding application decides how a prompt
//! is rendered; the pipeline only consumes the answer. Prompts distinguish
//! cancellation from failure so parameter collection can report both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use permit_gate_core::DecodedPolicy;
use permit_gate_core::ParameterMap;
use permit_gate_core::ParameterName;
use permit_gate_core::ParameterValidationError;
use permit_gate_core::PendingTransaction;
use permit_gate_core::PolicyVersion;
use permit_gate_core::ToolCid;
use permit_gate_core::ToolPolicy;

// ============================================================================
// SECTION: Prompt Errors
// ============================================================================

/// Prompt capability errors.
///
/// # Invariants
/// - `Cancelled` means the operator declined to answer; `Failed` means the
///   prompt machinery itself broke.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The operator cancelled the prompt.
    #[error("prompt cancelled: {0}")]
    Cancelled(String),
    /// The prompt could not be delivered or answered.
    #[error("prompt failed: {0}")]
    Failed(String),
}

// ============================================================================
// SECTION: Policy Draft
// ============================================================================

/// Policy proposed interactively during a permission grant.
///
/// # Invariants
/// - `policy` is the caller-shaped value; wire encoding happens at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDraft {
    /// Proposed policy value.
    pub policy: Value,
    /// Version attached to the proposal.
    pub version: PolicyVersion,
}

// ============================================================================
// SECTION: Capability Traits
// ============================================================================

/// Asks whether an unpermitted tool may be granted to the caller.
pub trait PermissionPrompt {
    /// Returns true when the grant is approved.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the prompt cannot be answered.
    fn confirm(&self, tool: &ToolCid) -> Result<bool, PromptError>;
}

/// Collects values for parameters still missing after the caller's input.
pub trait ParameterPrompt {
    /// Returns values for the named missing parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Cancelled`] when the operator aborts collection
    /// and [`PromptError::Failed`] when collection breaks.
    fn collect(
        &self,
        tool: &ToolCid,
        missing: &[ParameterName],
    ) -> Result<ParameterMap, PromptError>;
}

/// Optionally proposes a policy while granting a new permission.
pub trait PolicyPrompt {
    /// Returns a policy draft, or `None` to grant without a policy.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the prompt cannot be answered.
    fn propose(
        &self,
        tool: &ToolCid,
        current: Option<&ToolPolicy>,
    ) -> Result<Option<PolicyDraft>, PromptError>;
}

/// Offers one chance to revise parameters after a validation failure.
pub trait PolicyFailurePrompt {
    /// Returns replacement parameters, or `None` to accept the failure.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the prompt cannot be answered.
    fn revise(
        &self,
        tool: &ToolCid,
        parameters: &ParameterMap,
        policy: &DecodedPolicy,
        error: &ParameterValidationError,
    ) -> Result<Option<ParameterMap>, PromptError>;
}

/// Notified after a policy registration transaction is broadcast.
pub trait RegistrationListener {
    /// Receives the pending registration transaction.
    fn policy_registered(&self, transaction: &PendingTransaction);
}

// ============================================================================
// SECTION: Callback Bundle
// ============================================================================

/// Callback bundle injected per pipeline invocation.
///
/// # Invariants
/// - `permission` and `parameters` are mandatory; the remaining capabilities
///   are optional branches.
pub struct PipelineCallbacks<'a> {
    /// Permission grant prompt.
    pub permission: &'a dyn PermissionPrompt,
    /// Missing-parameter collection prompt.
    pub parameters: &'a dyn ParameterPrompt,
    /// Optional policy proposal prompt used during grants.
    pub new_policy: Option<&'a dyn PolicyPrompt>,
    /// Optional one-shot parameter revision prompt.
    pub failed_policy: Option<&'a dyn PolicyFailurePrompt>,
    /// Optional registration notification hook.
    pub registered: Option<&'a dyn RegistrationListener>,
}
