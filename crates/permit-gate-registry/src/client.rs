// crates/permit-gate-registry/src/client.rs
// ============================================================================
// Module: Registry Client
// Description: Write path for policy mutations and read passthroughs.
// Purpose: Encode, estimate, sign, and broadcast policy-store transactions.
// Dependencies: crate::{calldata, gas, mutation}, permit-gate-core, thiserror
// ============================================================================

//! ## Overview
//! The registry client turns a mutation intent into a submitted transaction:
//! encode calldata, estimate gas from the PKP address, apply the fixed safety
//! margin, hand the canonical digest to the external signing capability, and
//! broadcast the signed payload. Whatever step fails, callers observe one
//! error shape carrying the attempted tool, the policy payload, and the
//! underlying cause. Reads pass through to the ledger untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;
use std::sync::Arc;

use thiserror::Error as ThisError;

use permit_gate_core::DelegateeAddress;
use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerError;
use permit_gate_core::LedgerProvider;
use permit_gate_core::ParameterName;
use permit_gate_core::ParameterValue;
use permit_gate_core::PendingTransaction;
use permit_gate_core::PkpTokenId;
use permit_gate_core::PolicyLedger;
use permit_gate_core::SignedTransaction;
use permit_gate_core::SigningCapability;
use permit_gate_core::ToolCid;
use permit_gate_core::ToolPolicy;
use permit_gate_core::TransactionRequest;
use permit_gate_core::UnsignedTransaction;

use crate::calldata::encode_mutation;
use crate::gas::apply_gas_margin;
use crate::mutation::MutationSpec;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry client errors.
///
/// # Invariants
/// - Submission failures always surface as `PolicyRegistrationFailed`; the
///   step that failed is only visible through the source chain.
#[derive(Debug, ThisError)]
pub enum RegistryError {
    /// A mutation submission failed at some step.
    #[error("policy registration failed for tool {tool}: {source}")]
    PolicyRegistrationFailed {
        /// Tool the mutation targeted.
        tool: ToolCid,
        /// Policy payload attached to the mutation, when any.
        policy: Option<serde_json::Value>,
        /// Underlying step failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A read-only query failed at the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ============================================================================
// SECTION: Registry Client
// ============================================================================

/// Client for the on-ledger policy store.
///
/// # Invariants
/// - Holds no key material; signing is delegated per call.
#[derive(Clone)]
pub struct RegistryClient {
    /// Ledger read surface.
    ledger: Arc<dyn PolicyLedger + Send + Sync>,
    /// Address of the deployed policy store.
    store_address: LedgerAddress,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient").field("store_address", &self.store_address).finish()
    }
}

impl RegistryClient {
    /// Creates a client bound to a deployed policy store.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn PolicyLedger + Send + Sync>,
        store_address: LedgerAddress,
    ) -> Self {
        Self { ledger, store_address }
    }

    /// Returns the address of the deployed policy store.
    #[must_use]
    pub const fn store_address(&self) -> LedgerAddress {
        self.store_address
    }

    /// Submits a policy mutation as a signed transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PolicyRegistrationFailed`] when any step of
    /// the submission fails; the raw step error is available as the source.
    pub fn submit_policy_mutation(
        &self,
        pkp_address: &LedgerAddress,
        signer: &dyn SigningCapability,
        provider: &dyn LedgerProvider,
        mutation: &MutationSpec,
    ) -> Result<PendingTransaction, RegistryError> {
        self.submit_steps(pkp_address, signer, provider, mutation).map_err(|source| {
            RegistryError::PolicyRegistrationFailed {
                tool: mutation.tool().clone(),
                policy: mutation.policy_payload().cloned(),
                source,
            }
        })
    }

    /// Runs the six submission steps, surfacing the first failure raw.
    fn submit_steps(
        &self,
        pkp_address: &LedgerAddress,
        signer: &dyn SigningCapability,
        provider: &dyn LedgerProvider,
        mutation: &MutationSpec,
    ) -> Result<PendingTransaction, Box<dyn Error + Send + Sync>> {
        let data = encode_mutation(mutation)?;
        let request = TransactionRequest { to: self.store_address, data };
        let estimate = provider.estimate_gas(pkp_address, &request)?;
        let transaction = UnsignedTransaction {
            to: request.to,
            data: request.data,
            gas_limit: apply_gas_margin(estimate),
        };
        let digest = transaction.digest()?;
        let signature = signer.sign(&digest)?;
        let signed = SignedTransaction { transaction, signature };
        let raw = signed.canonical_bytes()?;
        Ok(provider.broadcast(&raw)?)
    }

    /// Reads the policy for a triple.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn policy(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<Option<ToolPolicy>, RegistryError> {
        Ok(self.ledger.policy(pkp, tool, delegatee)?)
    }

    /// Reads the registered tool CIDs for a PKP.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn registered_tools(&self, pkp: PkpTokenId) -> Result<Vec<ToolCid>, RegistryError> {
        Ok(self.ledger.registered_tools(pkp)?)
    }

    /// Reads the tools a delegatee is permitted to invoke.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn permitted_tools(
        &self,
        pkp: PkpTokenId,
        delegatee: &DelegateeAddress,
    ) -> Result<Vec<ToolCid>, RegistryError> {
        Ok(self.ledger.permitted_tools(pkp, delegatee)?)
    }

    /// Reads the delegatees permitted for a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn permitted_delegatees(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
    ) -> Result<Vec<DelegateeAddress>, RegistryError> {
        Ok(self.ledger.permitted_delegatees(pkp, tool)?)
    }

    /// Reads whether the delegatee holds a permit for the tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn is_tool_permitted(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<bool, RegistryError> {
        Ok(self.ledger.is_tool_permitted(pkp, tool, delegatee)?)
    }

    /// Reads the ordered parameter name list for a triple.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn parameter_names(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<Vec<ParameterName>, RegistryError> {
        Ok(self.ledger.parameter_names(pkp, tool, delegatee)?)
    }

    /// Reads a named parameter value for a triple.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Ledger`] when the read fails.
    pub fn parameter(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: &ParameterName,
    ) -> Result<Option<ParameterValue>, RegistryError> {
        Ok(self.ledger.parameter(pkp, tool, delegatee, name)?)
    }
}
