// crates/permit-gate-registry/src/lib.rs
// ============================================================================
// Module: Permit Gate Registry
// Description: Transactional client for the on-ledger policy store.
// Purpose: Turn policy and parameter mutation intents into signed, broadcast
// transactions with deterministic gas margins.
// Dependencies: permit-gate-core, serde, serde_jcs, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! The registry crate owns the write path against the policy store: a closed
//! mutation vocabulary, canonical calldata encoding, gas estimation with a
//! fixed safety margin, signing hand-off, and broadcast. Every submission
//! failure is folded into a single registration error so callers never branch
//! on step-specific causes. Read-only queries pass straight through to the
//! ledger with no transaction machinery.
//! Invariants:
//! - Calldata encoding is canonical and deterministic (JCS + sha-256 selector).
//! - The gas margin is exactly estimate x 120 / 100 in integer arithmetic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod calldata;
pub mod client;
pub mod gas;
pub mod mutation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use calldata::CalldataError;
pub use calldata::decode_mutation;
pub use calldata::encode_mutation;
pub use calldata::selector;
pub use client::RegistryClient;
pub use client::RegistryError;
pub use gas::apply_gas_margin;
pub use mutation::MutationSpec;
pub use mutation::encode_policy_value;
