// crates/permit-gate-providers/src/loopback/tests.rs
// ============================================================================
// Module: Loopback Provider Unit Tests
// Description: Unit coverage for the loopback gas model and apply path.
// Purpose: Ensure broadcasts fail closed on invalid calldata and delegatees.
// Dependencies: permit-gate-providers, permit-gate-core, permit-gate-registry
// ============================================================================

//! ## Overview
//! Covers the deterministic gas model, rejection of zero-address delegatees
//! arriving on the wire, and rejection of malformed broadcast payloads.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use permit_gate_core::InMemoryPolicyLedger;
use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerProvider;
use permit_gate_core::PkpTokenId;
use permit_gate_core::ProviderError;
use permit_gate_core::Signature;
use permit_gate_core::SignedTransaction;
use permit_gate_core::ToolCid;
use permit_gate_core::TransactionRequest;
use permit_gate_core::UnsignedTransaction;
use permit_gate_registry::MutationSpec;
use permit_gate_registry::encode_mutation;

use super::BASE_GAS;
use super::GAS_PER_BYTE;
use super::LoopbackProvider;

/// Builds an address whose last byte is `tag`.
fn address(tag: u8) -> LedgerAddress {
    let mut bytes = [0_u8; 20];
    bytes[19] = tag;
    LedgerAddress::new(bytes)
}

/// Builds a loopback provider over a fresh ledger applying as `sender`.
fn provider(sender: LedgerAddress) -> LoopbackProvider {
    LoopbackProvider::new(Arc::new(InMemoryPolicyLedger::new()), sender)
}

/// Wraps calldata in a canonical signed transaction payload.
fn raw_broadcast(data: Vec<u8>) -> Vec<u8> {
    let signed = SignedTransaction {
        transaction: UnsignedTransaction { to: address(0xc0), data, gas_limit: 30_000 },
        signature: Signature::new(vec![0x5f]),
    };
    signed.canonical_bytes().expect("canonical bytes")
}

#[test]
fn estimate_follows_per_byte_cost_model() {
    let provider = provider(address(0xaa));
    let request = TransactionRequest { to: address(0xc0), data: vec![0_u8; 10] };
    let estimate = provider.estimate_gas(&address(0xaa), &request).expect("estimate");
    assert_eq!(estimate, BASE_GAS + 10 * GAS_PER_BYTE);
}

#[test]
fn broadcast_rejects_zero_delegatee_before_any_mutation() {
    let sender = address(0xaa);
    let loopback = provider(sender);
    let mutation = MutationSpec::PermitTool {
        pkp: PkpTokenId::from_raw(1).expect("non-zero pkp"),
        tool: ToolCid::new("QmTool"),
        delegatee: LedgerAddress::new([0_u8; 20]),
    };
    let raw = raw_broadcast(encode_mutation(&mutation).expect("encode"));
    let result = loopback.broadcast(&raw);
    match result {
        Err(ProviderError::Broadcast(message)) => {
            assert!(message.contains("invalid delegatee"));
        }
        other => panic!("expected broadcast rejection, got {other:?}"),
    }
    assert!(loopback.last_broadcast().expect("log").is_none());
}

#[test]
fn broadcast_rejects_malformed_payload() {
    let loopback = provider(address(0xaa));
    let result = loopback.broadcast(b"not json");
    assert!(matches!(result, Err(ProviderError::Broadcast(_))));
}

#[test]
fn broadcast_rejects_tampered_calldata() {
    let loopback = provider(address(0xaa));
    let mutation = MutationSpec::RegisterTool {
        pkp: PkpTokenId::from_raw(1).expect("non-zero pkp"),
        tool: ToolCid::new("QmTool"),
    };
    let mut data = encode_mutation(&mutation).expect("encode");
    data[0] ^= 0xff;
    let result = loopback.broadcast(&raw_broadcast(data));
    assert!(matches!(result, Err(ProviderError::Broadcast(_))));
}
