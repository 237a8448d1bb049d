// crates/permit-gate-registry/src/mutation.rs
// ============================================================================
// Module: Mutation Vocabulary
// Description: Closed set of policy-store mutations and their wire forms.
// Purpose: Keep calldata encoding closed over the contract surface.
// Dependencies: permit-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`MutationSpec`] names one mutating function of the policy store together
//! with its arguments. The enum is the single source of truth for the write
//! surface: encoding, decoding, and the loopback provider all match on it.
//! Delegatee arguments are carried as plain ledger addresses on the wire; the
//! zero-address invariant is re-checked where calldata is applied, exactly as
//! the deployed contract does.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use permit_gate_core::LedgerAddress;
use permit_gate_core::ParameterName;
use permit_gate_core::ParameterValue;
use permit_gate_core::PkpTokenId;
use permit_gate_core::PolicyVersion;
use permit_gate_core::ToolCid;

// ============================================================================
// SECTION: Policy Value Encoding
// ============================================================================

/// Encodes a caller-supplied policy value for the wire.
///
/// Objects are encoded as a tuple (their member values in canonical key
/// order); any other JSON value is encoded as its primitive form.
#[must_use]
pub fn encode_policy_value(policy: &Value) -> Value {
    match policy {
        Value::Object(members) => {
            let mut keys: Vec<&String> = members.keys().collect();
            keys.sort();
            Value::Array(
                keys.into_iter().filter_map(|key| members.get(key)).cloned().collect(),
            )
        }
        other => other.clone(),
    }
}

// ============================================================================
// SECTION: Mutation Specification
// ============================================================================

/// One mutating call against the policy store.
///
/// # Invariants
/// - Variants and their wire tags are stable; the selector is derived from
///   the tag.
/// - `SetPolicy::policy` already carries the wire encoding produced by
///   [`encode_policy_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args", rename_all = "camelCase")]
pub enum MutationSpec {
    /// Registers a tool under the PKP.
    RegisterTool {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool to register.
        tool: ToolCid,
    },
    /// Permits a registered tool for a delegatee.
    PermitTool {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee granted the permit.
        delegatee: LedgerAddress,
    },
    /// Revokes a delegatee's permit for a tool.
    UnpermitTool {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee whose permit is revoked.
        delegatee: LedgerAddress,
    },
    /// Sets the policy for a triple.
    SetPolicy {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
        /// Wire-encoded policy value.
        policy: Value,
        /// Version attached to the policy.
        version: PolicyVersion,
    },
    /// Removes the policy for a triple.
    RemovePolicy {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
    },
    /// Enables or disables the policy for a triple.
    SetPolicyEnabled {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
        /// Desired enforcement state.
        enabled: bool,
    },
    /// Sets a named parameter value for a triple.
    SetParameter {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
        /// Parameter name.
        name: ParameterName,
        /// Parameter value.
        value: ParameterValue,
    },
    /// Removes a named parameter value for a triple.
    RemoveParameter {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
        /// Parameter name.
        name: ParameterName,
    },
    /// Sets a batch of named parameter values atomically.
    BatchSetParameters {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
        /// Parameter names, positionally matched to `values`.
        names: Vec<ParameterName>,
        /// Parameter values, positionally matched to `names`.
        values: Vec<ParameterValue>,
    },
    /// Removes a batch of named parameter values atomically.
    BatchRemoveParameters {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: LedgerAddress,
        /// Parameter names to remove.
        names: Vec<ParameterName>,
    },
}

impl MutationSpec {
    /// Builds a `SetPolicy` mutation, applying the wire encoding rule to the
    /// caller's policy value.
    #[must_use]
    pub fn set_policy(
        pkp: PkpTokenId,
        tool: ToolCid,
        delegatee: LedgerAddress,
        policy: &Value,
        version: PolicyVersion,
    ) -> Self {
        Self::SetPolicy { pkp, tool, delegatee, policy: encode_policy_value(policy), version }
    }

    /// Returns the wire name of the mutated function.
    #[must_use]
    pub const fn function(&self) -> &'static str {
        match self {
            Self::RegisterTool { .. } => "registerTool",
            Self::PermitTool { .. } => "permitTool",
            Self::UnpermitTool { .. } => "unpermitTool",
            Self::SetPolicy { .. } => "setPolicy",
            Self::RemovePolicy { .. } => "removePolicy",
            Self::SetPolicyEnabled { .. } => "setPolicyEnabled",
            Self::SetParameter { .. } => "setParameter",
            Self::RemoveParameter { .. } => "removeParameter",
            Self::BatchSetParameters { .. } => "batchSetParameters",
            Self::BatchRemoveParameters { .. } => "batchRemoveParameters",
        }
    }

    /// Returns the tool the mutation targets.
    #[must_use]
    pub const fn tool(&self) -> &ToolCid {
        match self {
            Self::RegisterTool { tool, .. }
            | Self::PermitTool { tool, .. }
            | Self::UnpermitTool { tool, .. }
            | Self::SetPolicy { tool, .. }
            | Self::RemovePolicy { tool, .. }
            | Self::SetPolicyEnabled { tool, .. }
            | Self::SetParameter { tool, .. }
            | Self::RemoveParameter { tool, .. }
            | Self::BatchSetParameters { tool, .. }
            | Self::BatchRemoveParameters { tool, .. } => tool,
        }
    }

    /// Returns the policy payload carried by the mutation, when any.
    #[must_use]
    pub const fn policy_payload(&self) -> Option<&Value> {
        match self {
            Self::SetPolicy { policy, .. } => Some(policy),
            _ => None,
        }
    }
}
