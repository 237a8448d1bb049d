// crates/permit-gate-core/src/core/events.rs
// ============================================================================
// Module: Ledger Audit Events
// Description: Audit events emitted for every applied policy-store mutation.
// Purpose: Provide a stable, append-only record of permit and policy changes.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Every applied mutation against the policy store emits exactly one event.
//! Failed mutations, including rejected batches, emit nothing. Events carry
//! the full scope triple so downstream indexers never need to join against
//! call context.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DelegateeAddress;
use crate::core::identifiers::ParameterName;
use crate::core::identifiers::PkpTokenId;
use crate::core::identifiers::PolicyVersion;
use crate::core::identifiers::ToolCid;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit event emitted by the policy store.
///
/// # Invariants
/// - Variants are stable for serialization and indexer matching.
/// - Emitted if and only if the corresponding mutation was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A tool was registered under a PKP.
    ToolRegistered {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Registered tool.
        tool: ToolCid,
    },
    /// A tool was permitted for a delegatee.
    ToolPermitted {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Permitted tool.
        tool: ToolCid,
        /// Delegatee granted the permit.
        delegatee: DelegateeAddress,
    },
    /// A tool permit was revoked for a delegatee.
    ToolUnpermitted {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Unpermitted tool.
        tool: ToolCid,
        /// Delegatee whose permit was revoked.
        delegatee: DelegateeAddress,
    },
    /// A policy blob was set for a triple.
    PolicySet {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: DelegateeAddress,
        /// Version attached to the new blob.
        version: PolicyVersion,
    },
    /// A policy was removed for a triple.
    PolicyRemoved {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: DelegateeAddress,
    },
    /// A policy was enabled for a triple.
    PolicyEnabled {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: DelegateeAddress,
    },
    /// A policy was disabled for a triple.
    PolicyDisabled {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: DelegateeAddress,
    },
    /// A named parameter value was set for a triple.
    ParameterSet {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: DelegateeAddress,
        /// Parameter name that was set.
        name: ParameterName,
    },
    /// A named parameter value was removed for a triple.
    ParameterRemoved {
        /// PKP scope.
        pkp: PkpTokenId,
        /// Tool scope.
        tool: ToolCid,
        /// Delegatee scope.
        delegatee: DelegateeAddress,
        /// Parameter name that was removed.
        name: ParameterName,
    },
}
