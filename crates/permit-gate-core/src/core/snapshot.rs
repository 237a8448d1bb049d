// crates/permit-gate-core/src/core/snapshot.rs
// ============================================================================
// Module: Registered Tool Snapshot
// Description: Partitioned per-PKP view of registered tools and delegatees.
// Purpose: Reconcile on-chain tool state with externally resolved metadata.
// Dependencies: crate::core::{identifiers, policy}, serde
// ============================================================================

//! ## Overview
//! The snapshot partitions a PKP's registered tools into three disjoint
//! classes: tools with resolvable metadata and at least one policy, tools
//! with resolvable metadata and no policy, and tools whose CID has no
//! resolvable metadata yet but carries on-chain policy state. The third class
//! exists because on-chain registration can outpace metadata publication.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DelegateeAddress;
use crate::core::identifiers::ToolCid;
use crate::core::policy::ToolPolicy;

// ============================================================================
// SECTION: Partition Classes
// ============================================================================

/// Registered tool with resolvable metadata and at least one policy.
///
/// # Invariants
/// - `delegatee_policies` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolWithPolicy {
    /// Content-addressed tool identifier.
    pub cid: ToolCid,
    /// Resolved tool name.
    pub name: String,
    /// Resolved tool description.
    pub description: String,
    /// Policies keyed by delegatee.
    pub delegatee_policies: BTreeMap<DelegateeAddress, ToolPolicy>,
}

/// Registered tool with resolvable metadata and no policy.
///
/// # Invariants
/// - No delegatee of the PKP has a policy registered for this tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolWithoutPolicy {
    /// Content-addressed tool identifier.
    pub cid: ToolCid,
    /// Resolved tool name.
    pub name: String,
    /// Resolved tool description.
    pub description: String,
    /// Delegatees currently permitted to invoke the tool.
    pub permitted_delegatees: Vec<DelegateeAddress>,
}

/// Registered tool whose CID has no resolvable metadata yet.
///
/// # Invariants
/// - `delegatee_policies` reflects on-chain state for the unresolved CID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownToolWithPolicy {
    /// Content-addressed tool identifier.
    pub cid: ToolCid,
    /// Policies keyed by delegatee.
    pub delegatee_policies: BTreeMap<DelegateeAddress, ToolPolicy>,
}

// ============================================================================
// SECTION: Snapshot View
// ============================================================================

/// Per-PKP partition of registered tools into the three disjoint classes.
///
/// # Invariants
/// - A CID appears in exactly one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredToolsView {
    /// Tools with resolvable metadata and at least one policy.
    pub tools_with_policies: Vec<ToolWithPolicy>,
    /// Tools with resolvable metadata and no policy.
    pub tools_without_policies: Vec<ToolWithoutPolicy>,
    /// Tools with on-chain policy state and unresolvable metadata.
    pub unknown_tools_with_policies: Vec<UnknownToolWithPolicy>,
}

impl RegisteredToolsView {
    /// Returns true when every partition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools_with_policies.is_empty()
            && self.tools_without_policies.is_empty()
            && self.unknown_tools_with_policies.is_empty()
    }
}
