// crates/permit-gate-providers/src/loopback.rs
// ============================================================================
// Module: Loopback Ledger Provider
// Description: Provider applying broadcast calldata to the in-memory ledger.
// Purpose: Exercise the full submission cycle without a running node.
// Dependencies: permit-gate-core, permit-gate-registry, serde_jcs, serde_json,
// sha2, time
// ============================================================================

//! ## Overview
//! The loopback provider stands in for a ledger node: gas estimates follow a
//! deterministic per-byte cost model and broadcasts are decoded back into
//! mutations and applied to the reference in-memory ledger. Signature
//! recovery is out of scope for the loopback path; the provider applies
//! mutations as a configured sender identity and contract preconditions are
//! still enforced by the ledger.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use permit_gate_core::DelegateeAddress;
use permit_gate_core::InMemoryPolicyLedger;
use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerError;
use permit_gate_core::LedgerProvider;
use permit_gate_core::PendingTransaction;
use permit_gate_core::PolicyBlob;
use permit_gate_core::PolicyLedger;
use permit_gate_core::ProviderError;
use permit_gate_core::SignedTransaction;
use permit_gate_core::TransactionRequest;
use permit_gate_core::TxHash;
use permit_gate_registry::MutationSpec;
use permit_gate_registry::decode_mutation;
use sha2::Digest;
use sha2::Sha256;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Gas Model
// ============================================================================

/// Base gas charged for any transaction.
pub const BASE_GAS: u64 = 21_000;

/// Gas charged per calldata byte.
pub const GAS_PER_BYTE: u64 = 16;

// ============================================================================
// SECTION: Broadcast Record
// ============================================================================

/// Record of one accepted loopback broadcast.
///
/// # Invariants
/// - `transaction` is the decoded payload exactly as broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRecord {
    /// Decoded signed transaction.
    pub transaction: SignedTransaction,
    /// Wall-clock time the broadcast was received.
    pub received_at: OffsetDateTime,
}

// ============================================================================
// SECTION: Loopback Provider
// ============================================================================

/// Provider looping broadcasts back onto the in-memory ledger.
///
/// # Invariants
/// - Broadcasts are applied atomically: a rejected mutation leaves the ledger
///   unchanged and fails the broadcast.
pub struct LoopbackProvider {
    /// Reference ledger mutations are applied to.
    ledger: Arc<InMemoryPolicyLedger>,
    /// Sender identity mutations are applied as.
    sender: LedgerAddress,
    /// Accepted broadcasts, latest last.
    broadcasts: Mutex<Vec<BroadcastRecord>>,
}

impl LoopbackProvider {
    /// Creates a loopback provider applying mutations as `sender`.
    #[must_use]
    pub fn new(ledger: Arc<InMemoryPolicyLedger>, sender: LedgerAddress) -> Self {
        Self { ledger, sender, broadcasts: Mutex::new(Vec::new()) }
    }

    /// Returns the most recently accepted broadcast, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the broadcast log lock is poisoned.
    pub fn last_broadcast(&self) -> Result<Option<BroadcastRecord>, ProviderError> {
        Ok(self
            .broadcasts
            .lock()
            .map_err(|_| ProviderError::Broadcast("broadcast log lock poisoned".to_string()))?
            .last()
            .cloned())
    }

    /// Applies a decoded mutation to the reference ledger.
    fn apply(&self, mutation: MutationSpec) -> Result<(), LedgerError> {
        let caller = self.sender;
        match mutation {
            MutationSpec::RegisterTool { pkp, tool } => {
                self.ledger.register_tool(caller, pkp, &tool)
            }
            MutationSpec::PermitTool { pkp, tool, delegatee } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.permit_tool(caller, pkp, &tool, &delegatee)
            }
            MutationSpec::UnpermitTool { pkp, tool, delegatee } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.unpermit_tool(caller, pkp, &tool, &delegatee)
            }
            MutationSpec::SetPolicy { pkp, tool, delegatee, policy, version } => {
                let delegatee = require_delegatee(delegatee)?;
                let blob = serde_jcs::to_vec(&policy)
                    .map(PolicyBlob::new)
                    .map_err(|err| LedgerError::Ledger(format!("policy encoding failed: {err}")))?;
                self.ledger.set_policy(caller, pkp, &tool, &delegatee, blob, version)
            }
            MutationSpec::RemovePolicy { pkp, tool, delegatee } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.remove_policy(caller, pkp, &tool, &delegatee)
            }
            MutationSpec::SetPolicyEnabled { pkp, tool, delegatee, enabled } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.set_policy_enabled(caller, pkp, &tool, &delegatee, enabled)
            }
            MutationSpec::SetParameter { pkp, tool, delegatee, name, value } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.set_parameter(caller, pkp, &tool, &delegatee, name, value)
            }
            MutationSpec::RemoveParameter { pkp, tool, delegatee, name } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.remove_parameter(caller, pkp, &tool, &delegatee, &name)
            }
            MutationSpec::BatchSetParameters { pkp, tool, delegatee, names, values } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.batch_set_parameters(caller, pkp, &tool, &delegatee, names, values)
            }
            MutationSpec::BatchRemoveParameters { pkp, tool, delegatee, names } => {
                let delegatee = require_delegatee(delegatee)?;
                self.ledger.batch_remove_parameters(caller, pkp, &tool, &delegatee, names)
            }
        }
    }
}

impl LedgerProvider for LoopbackProvider {
    fn estimate_gas(
        &self,
        _from: &LedgerAddress,
        request: &TransactionRequest,
    ) -> Result<u64, ProviderError> {
        let data_len = u64::try_from(request.data.len())
            .map_err(|_| ProviderError::Estimate("calldata length out of range".to_string()))?;
        Ok(BASE_GAS.saturating_add(data_len.saturating_mul(GAS_PER_BYTE)))
    }

    fn broadcast(&self, raw: &[u8]) -> Result<PendingTransaction, ProviderError> {
        let signed: SignedTransaction = serde_json::from_slice(raw)
            .map_err(|err| ProviderError::Broadcast(format!("malformed broadcast: {err}")))?;
        let mutation = decode_mutation(&signed.transaction.data)
            .map_err(|err| ProviderError::Broadcast(format!("malformed calldata: {err}")))?;
        self.apply(mutation)
            .map_err(|err| ProviderError::Broadcast(format!("mutation rejected: {err}")))?;
        let hash = TxHash::new(Sha256::digest(raw).into());
        self.broadcasts
            .lock()
            .map_err(|_| ProviderError::Broadcast("broadcast log lock poisoned".to_string()))?
            .push(BroadcastRecord {
                transaction: signed,
                received_at: OffsetDateTime::now_utc(),
            });
        Ok(PendingTransaction { hash })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Re-checks the zero-address invariant on wire-level delegatees.
fn require_delegatee(address: LedgerAddress) -> Result<DelegateeAddress, LedgerError> {
    DelegateeAddress::from_address(address).ok_or(LedgerError::InvalidDelegatee)
}

#[cfg(test)]
mod tests;
