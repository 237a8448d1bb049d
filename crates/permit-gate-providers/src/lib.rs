// crates/permit-gate-providers/src/lib.rs
// ============================================================================
// Module: Permit Gate Providers
// Description: Ledger provider implementations for estimation and broadcast.
// Purpose: Connect the registry client to a ledger node, or loop it back onto
// the in-memory reference ledger for local development and tests.
// Dependencies: permit-gate-core, permit-gate-registry, reqwest, serde_json,
// serde_jcs, sha2, time
// ============================================================================

//! ## Overview
//! This crate ships two [`permit_gate_core::LedgerProvider`] implementations:
//! an HTTP JSON-RPC provider issuing bounded, fail-closed requests against a
//! ledger node, and a loopback provider that decodes broadcast calldata and
//! applies it to an [`permit_gate_core::InMemoryPolicyLedger`]. The loopback
//! path exercises the full encode, sign, broadcast, and apply cycle without a
//! running node.
//!
//! Security posture: broadcast payloads are untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod loopback;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpLedgerProvider;
pub use http::HttpLedgerProviderConfig;
pub use loopback::BroadcastRecord;
pub use loopback::LoopbackProvider;
