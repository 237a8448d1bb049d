// crates/permit-gate-core/src/lib.rs
// ============================================================================
// Module: Permit Gate Core
// Description: Data model, interfaces, and reference runtime for tool permits.
// Purpose: Define the ledger-side policy store semantics and the contract
// surfaces consumed by the registry, admin, and execution layers.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Permit Gate mediates which delegated identities ("delegatees") may invoke
//! which signable tools on behalf of a programmable key-pair (PKP) identity.
//! This crate owns the authoritative data model: strongly typed identifiers,
//! per-delegatee policy and parameter state, audit events, and the
//! backend-agnostic interfaces every other crate builds on. A reference
//! in-memory ledger in [`runtime`] implements the full contract semantics for
//! local development and tests.
//! Invariants:
//! - Policy and parameter state is scoped to a (PKP, tool, delegatee) triple.
//! - Mutations are owner-gated and fail closed before any state change.
//! - Delegatee addresses are never the zero address.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::events::LedgerEvent;
pub use crate::core::identifiers::DelegateeAddress;
pub use crate::core::identifiers::LedgerAddress;
pub use crate::core::identifiers::ParameterName;
pub use crate::core::identifiers::PkpTokenId;
pub use crate::core::identifiers::PolicyVersion;
pub use crate::core::identifiers::ToolCid;
pub use crate::core::identifiers::TxHash;
pub use crate::core::policy::ParameterMap;
pub use crate::core::policy::ParameterValue;
pub use crate::core::policy::PolicyBlob;
pub use crate::core::policy::ToolPolicy;
pub use crate::core::snapshot::RegisteredToolsView;
pub use crate::core::snapshot::ToolWithPolicy;
pub use crate::core::snapshot::ToolWithoutPolicy;
pub use crate::core::snapshot::UnknownToolWithPolicy;
pub use crate::interfaces::CatalogError;
pub use crate::interfaces::DecodedPolicy;
pub use crate::interfaces::ExecutorError;
pub use crate::interfaces::LedgerError;
pub use crate::interfaces::LedgerProvider;
pub use crate::interfaces::ParameterValidationError;
pub use crate::interfaces::PendingTransaction;
pub use crate::interfaces::PolicyCodecError;
pub use crate::interfaces::PolicyLedger;
pub use crate::interfaces::ProviderError;
pub use crate::interfaces::RawExecutionResult;
pub use crate::interfaces::Signature;
pub use crate::interfaces::SignedTransaction;
pub use crate::interfaces::SigningCapability;
pub use crate::interfaces::SigningError;
pub use crate::interfaces::ToolCatalog;
pub use crate::interfaces::ToolDescriptor;
pub use crate::interfaces::ToolExecutor;
pub use crate::interfaces::TransactionCodecError;
pub use crate::interfaces::TransactionRequest;
pub use crate::interfaces::UnsignedTransaction;
pub use crate::runtime::InMemoryPolicyLedger;
