// crates/permit-gate-core/src/core/policy.rs
// ============================================================================
// Module: Policy and Parameter State
// Description: Opaque policy blobs, versions, and named parameter values.
// Purpose: Model the per-triple state the ledger persists for tool permits.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Policies and parameters are opaque to Permit Gate: the core stores and
//! routes byte blobs without interpreting them. A policy is scoped to a
//! (PKP, tool, delegatee) triple, carries a version string, and can be
//! enabled or disabled independently of its content. Absence of a policy
//! means "no constraint currently registered," not "denied."

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ParameterName;
use crate::core::identifiers::PolicyVersion;

// ============================================================================
// SECTION: Policy Blob
// ============================================================================

/// Opaque policy payload bytes.
///
/// # Invariants
/// - Contents are never interpreted by the core; decoding is delegated to the
///   tool's descriptor.
/// - An empty blob means no policy constraint is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyBlob(Vec<u8>);

impl PolicyBlob {
    /// Creates a policy blob from raw bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw policy bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true when the blob carries no policy content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// SECTION: Tool Policy
// ============================================================================

/// Policy registered for a (PKP, tool, delegatee) triple.
///
/// # Invariants
/// - `enabled` toggles enforcement without altering the blob or version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPolicy {
    /// Opaque policy payload.
    pub blob: PolicyBlob,
    /// Version string attached to the payload.
    pub version: PolicyVersion,
    /// Whether the policy is currently enforced.
    pub enabled: bool,
}

impl ToolPolicy {
    /// Creates an enabled policy from a blob and version.
    #[must_use]
    pub const fn new(blob: PolicyBlob, version: PolicyVersion) -> Self {
        Self { blob, version, enabled: true }
    }
}

// ============================================================================
// SECTION: Parameter Values
// ============================================================================

/// Opaque named parameter value.
///
/// # Invariants
/// - Contents are never interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterValue(Vec<u8>);

impl ParameterValue {
    /// Creates a parameter value from raw bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw value bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Ordered map of parameter names to values for one triple.
pub type ParameterMap = BTreeMap<ParameterName, ParameterValue>;
