// crates/permit-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Permit Gate Interfaces
// Description: Backend-agnostic interfaces for the ledger, signing, and tools.
// Purpose: Define the contract surfaces used by the registry, admin, and
// execution layers without embedding backend-specific details.
// Dependencies: crate::core, serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Permit Gate integrates with external systems: the
//! authoritative policy ledger, the transaction provider, the external signing
//! capability, the tool metadata catalog, and the execution backend.
//! Implementations must be deterministic with respect to their inputs and
//! fail closed on missing or invalid data.
//!
//! Security posture: interface implementations consume untrusted inputs; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identifiers::DelegateeAddress;
use crate::core::identifiers::LedgerAddress;
use crate::core::identifiers::ParameterName;
use crate::core::identifiers::PkpTokenId;
use crate::core::identifiers::PolicyVersion;
use crate::core::identifiers::ToolCid;
use crate::core::identifiers::TxHash;
use crate::core::policy::ParameterMap;
use crate::core::policy::ParameterValue;
use crate::core::policy::PolicyBlob;
use crate::core::policy::ToolPolicy;

// ============================================================================
// SECTION: Policy Ledger
// ============================================================================

/// Policy ledger errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `NotInitialized` renders exactly `Tool policy manager not initialized`;
///   the execution layer swallows that variant and no other.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The delegatee resolved to the zero address.
    #[error("invalid delegatee: the zero address cannot act for a pkp")]
    InvalidDelegatee,
    /// The PKP has no owner registered on the ledger.
    #[error("unknown pkp: {pkp}")]
    UnknownPkp {
        /// PKP token identifier that was not found.
        pkp: PkpTokenId,
    },
    /// The tool is not registered under the PKP.
    #[error("tool {tool} is not registered for pkp {pkp}")]
    ToolNotRegistered {
        /// PKP scope of the rejected call.
        pkp: PkpTokenId,
        /// Tool that is not registered.
        tool: ToolCid,
    },
    /// The caller is not the PKP owner.
    #[error("caller {caller} is not the owner of pkp {pkp}")]
    NotOwner {
        /// PKP scope of the rejected call.
        pkp: PkpTokenId,
        /// Address that attempted the mutation.
        caller: LedgerAddress,
    },
    /// No policy exists for the triple.
    #[error("no policy registered for tool {tool} and delegatee {delegatee}")]
    PolicyNotFound {
        /// Tool scope of the rejected call.
        tool: ToolCid,
        /// Delegatee scope of the rejected call.
        delegatee: DelegateeAddress,
    },
    /// Batch name and value arrays differ in length.
    #[error("parameter batch length mismatch: {names} names, {values} values")]
    LengthMismatch {
        /// Number of names supplied.
        names: usize,
        /// Number of values supplied.
        values: usize,
    },
    /// The policy manager backing the ledger surface is not wired up yet.
    #[error("Tool policy manager not initialized")]
    NotInitialized,
    /// The ledger backend reported an error.
    #[error("ledger error: {0}")]
    Ledger(String),
}

/// Authoritative policy and parameter store scoped per PKP.
///
/// Reads are unrestricted; mutations are owner-gated and must fail before any
/// state change when a precondition does not hold.
pub trait PolicyLedger {
    /// Returns all tool CIDs registered under the PKP.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read.
    fn registered_tools(&self, pkp: PkpTokenId) -> Result<Vec<ToolCid>, LedgerError>;

    /// Returns the tools a delegatee is permitted to invoke for the PKP.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read.
    fn permitted_tools(
        &self,
        pkp: PkpTokenId,
        delegatee: &DelegateeAddress,
    ) -> Result<Vec<ToolCid>, LedgerError>;

    /// Returns the delegatees permitted to invoke a tool for the PKP.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read.
    fn permitted_delegatees(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
    ) -> Result<Vec<DelegateeAddress>, LedgerError>;

    /// Returns true when the delegatee holds a permit for the tool.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read.
    fn is_tool_permitted(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<bool, LedgerError>;

    /// Returns the policy registered for the triple, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read, including
    /// [`LedgerError::NotInitialized`] when the policy manager is not wired.
    fn policy(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<Option<ToolPolicy>, LedgerError>;

    /// Returns the ordered parameter name list for the triple.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read.
    fn parameter_names(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<Vec<ParameterName>, LedgerError>;

    /// Returns the value for a named parameter, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read.
    fn parameter(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: &ParameterName,
    ) -> Result<Option<ParameterValue>, LedgerError>;

    /// Registers a tool under the PKP (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the caller is not the PKP owner.
    fn register_tool(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
    ) -> Result<(), LedgerError>;

    /// Permits a registered tool for a delegatee (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn permit_tool(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<(), LedgerError>;

    /// Revokes a delegatee's permit for a tool (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn unpermit_tool(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<(), LedgerError>;

    /// Sets the policy blob and version for the triple.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn set_policy(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        blob: PolicyBlob,
        version: PolicyVersion,
    ) -> Result<(), LedgerError>;

    /// Removes the policy for the triple (no-op when absent).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn remove_policy(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<(), LedgerError>;

    /// Enables or disables the policy registered for the triple.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PolicyNotFound`] when no policy exists, or
    /// another [`LedgerError`] when a mutation precondition fails.
    fn set_policy_enabled(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        enabled: bool,
    ) -> Result<(), LedgerError>;

    /// Sets a named parameter value for the triple.
    ///
    /// Registers the name in the per-triple name list only when absent and
    /// overwrites the value unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn set_parameter(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: ParameterName,
        value: ParameterValue,
    ) -> Result<(), LedgerError>;

    /// Removes a named parameter value for the triple (no-op when absent).
    ///
    /// Removal uses swap-with-last deletion; order among the remaining names
    /// is not preserved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn remove_parameter(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: &ParameterName,
    ) -> Result<(), LedgerError>;

    /// Sets a batch of named parameter values as one atomic mutation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LengthMismatch`] before any element is applied
    /// when the arrays differ in length, or another [`LedgerError`] when a
    /// mutation precondition fails.
    fn batch_set_parameters(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        names: Vec<ParameterName>,
        values: Vec<ParameterValue>,
    ) -> Result<(), LedgerError>;

    /// Removes a batch of named parameter values as one atomic mutation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a mutation precondition fails.
    fn batch_remove_parameters(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        names: Vec<ParameterName>,
    ) -> Result<(), LedgerError>;
}

// ============================================================================
// SECTION: Transactions
// ============================================================================

/// Transaction codec errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TransactionCodecError {
    /// Canonical serialization failed.
    #[error("transaction canonicalization failed: {0}")]
    Canonicalize(String),
}

/// Call request used for gas estimation before a gas limit is assigned.
///
/// # Invariants
/// - `data` is the fully encoded calldata for the target function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Target contract address.
    pub to: LedgerAddress,
    /// Encoded calldata.
    pub data: Vec<u8>,
}

/// Finalized unsigned transaction ready for signing.
///
/// # Invariants
/// - `gas_limit` already includes the client-side safety margin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Target contract address.
    pub to: LedgerAddress,
    /// Encoded calldata.
    pub data: Vec<u8>,
    /// Gas limit with safety margin applied.
    pub gas_limit: u64,
}

impl UnsignedTransaction {
    /// Computes the canonical signing digest of the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionCodecError`] when canonical serialization fails.
    pub fn digest(&self) -> Result<TxHash, TransactionCodecError> {
        let bytes = serde_jcs::to_vec(self)
            .map_err(|err| TransactionCodecError::Canonicalize(err.to_string()))?;
        Ok(TxHash::new(Sha256::digest(&bytes).into()))
    }
}

/// Opaque signature returned by the external signing capability.
///
/// # Invariants
/// - Contents are never interpreted by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Creates a signature from raw bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw signature bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Signed transaction ready for broadcast.
///
/// # Invariants
/// - `signature` covers the digest of `transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Finalized unsigned transaction.
    pub transaction: UnsignedTransaction,
    /// Signature over the transaction digest.
    pub signature: Signature,
}

impl SignedTransaction {
    /// Serializes the signed transaction into canonical broadcast bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionCodecError`] when canonical serialization fails.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, TransactionCodecError> {
        serde_jcs::to_vec(self)
            .map_err(|err| TransactionCodecError::Canonicalize(err.to_string()))
    }
}

/// Handle for a broadcast transaction awaiting inclusion.
///
/// # Invariants
/// - `hash` identifies the broadcast payload, not a confirmed receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Digest of the broadcast transaction.
    pub hash: TxHash,
}

// ============================================================================
// SECTION: Ledger Provider
// ============================================================================

/// Ledger provider errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Gas estimation failed.
    #[error("gas estimation failed: {0}")]
    Estimate(String),
    /// Broadcast was rejected or could not be delivered.
    #[error("broadcast failed: {0}")]
    Broadcast(String),
    /// Transport-level failure talking to the ledger node.
    #[error("ledger transport error: {0}")]
    Transport(String),
}

/// Connected ledger node used for estimation and broadcast.
pub trait LedgerProvider {
    /// Estimates gas for the request as if sent from `from`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the estimate cannot be obtained.
    fn estimate_gas(
        &self,
        from: &LedgerAddress,
        request: &TransactionRequest,
    ) -> Result<u64, ProviderError>;

    /// Broadcasts canonical signed-transaction bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when broadcast fails.
    fn broadcast(&self, raw: &[u8]) -> Result<PendingTransaction, ProviderError>;
}

// ============================================================================
// SECTION: Signing Capability
// ============================================================================

/// Signing capability errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The signing backend declined or failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// External signing capability; key custody never enters this core.
pub trait SigningCapability {
    /// Signs a transaction digest.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] when the signature cannot be produced.
    fn sign(&self, digest: &TxHash) -> Result<Signature, SigningError>;
}

// ============================================================================
// SECTION: Tool Catalog
// ============================================================================

/// Tool catalog errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog backend reported an error.
    #[error("tool catalog error: {0}")]
    Catalog(String),
}

/// Policy decoding errors reported by a tool descriptor.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PolicyCodecError {
    /// The policy blob could not be decoded for the tool.
    #[error("policy decode failed: {0}")]
    Decode(String),
    /// The policy version is not supported by the tool.
    #[error("unsupported policy version: {0}")]
    UnsupportedVersion(String),
}

/// Parameter validation errors reported by a tool descriptor.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ParameterValidationError {
    /// A supplied parameter violated the decoded policy.
    #[error("parameter validation failed: {message}")]
    Invalid {
        /// Human-readable validation failure.
        message: String,
        /// Offending parameter, when attributable.
        parameter: Option<ParameterName>,
    },
}

/// Policy decoded into the tool's structured form.
///
/// # Invariants
/// - Structure is owned by the tool; the core treats it as opaque JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedPolicy(serde_json::Value);

impl DecodedPolicy {
    /// Creates a decoded policy from a JSON value.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the decoded policy as JSON.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Externally resolved tool metadata plus tool-specific policy logic.
pub trait ToolDescriptor {
    /// Returns the resolved tool name.
    fn name(&self) -> &str;

    /// Returns the resolved tool description.
    fn description(&self) -> &str;

    /// Decodes an opaque policy blob into the tool's structured form.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyCodecError`] when the blob cannot be decoded.
    fn decode_policy(&self, blob: &PolicyBlob) -> Result<DecodedPolicy, PolicyCodecError>;

    /// Validates collected parameters against a decoded policy.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterValidationError`] when a parameter violates the policy.
    fn validate_parameters(
        &self,
        parameters: &ParameterMap,
        policy: &DecodedPolicy,
    ) -> Result<(), ParameterValidationError>;
}

/// External registry resolving tool CIDs to descriptors.
pub trait ToolCatalog {
    /// Resolves a tool CID to its descriptor, or `None` when unpublished.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog cannot be queried.
    fn resolve(&self, cid: &ToolCid) -> Result<Option<Arc<dyn ToolDescriptor>>, CatalogError>;
}

// ============================================================================
// SECTION: Tool Executor
// ============================================================================

/// Tool executor errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Transport-level failure dispatching the execution.
    #[error("tool execution transport error: {0}")]
    Transport(String),
}

/// Raw result returned by the execution backend.
///
/// # Invariants
/// - `response` and `logs` are free text; interpretation is the execution
///   layer's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExecutionResult {
    /// Free-text response payload, frequently JSON.
    pub response: String,
    /// Free-text execution logs.
    pub logs: String,
}

/// External signer abstraction dispatching tool executions.
pub trait ToolExecutor {
    /// Executes a tool with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the execution cannot be dispatched.
    fn execute(
        &self,
        tool: &ToolCid,
        parameters: &ParameterMap,
    ) -> Result<RawExecutionResult, ExecutorError>;
}
