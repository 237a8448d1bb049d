// crates/permit-gate-core/src/core/identifiers/tests.rs
// ============================================================================
// Module: Identifier Unit Tests
// Description: Unit coverage for identifier construction invariants.
// Purpose: Ensure hex parsing and zero-address rejection fail closed.
// Dependencies: permit-gate-core
// ============================================================================

//! ## Overview
//! Tests the construction boundaries of the identifier newtypes: non-zero PKP
//! token ids, hex address parsing, and the delegatee zero-address invariant.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use super::DelegateeAddress;
use super::LedgerAddress;
use super::PkpTokenId;
use super::TxHash;

#[test]
fn pkp_token_id_rejects_zero() {
    assert!(PkpTokenId::from_raw(0).is_none());
    let id = PkpTokenId::from_raw(7).expect("non-zero id");
    assert_eq!(id.get(), 7);
}

#[test]
fn address_round_trips_hex() {
    let text = "0x00112233445566778899aabbccddeeff00112233";
    let address = LedgerAddress::from_hex(text).expect("well-formed address");
    assert_eq!(address.to_string(), text);
    assert!(!address.is_zero());
}

#[test]
fn address_parses_without_prefix() {
    let address = LedgerAddress::from_hex("00112233445566778899aabbccddeeff00112233");
    assert!(address.is_some());
}

#[test]
fn address_rejects_malformed_hex() {
    assert!(LedgerAddress::from_hex("0x1234").is_none());
    assert!(LedgerAddress::from_hex("0xzz112233445566778899aabbccddeeff00112233").is_none());
}

#[test]
fn delegatee_rejects_zero_address() {
    let zero = LedgerAddress::new([0_u8; 20]);
    assert!(zero.is_zero());
    assert!(DelegateeAddress::from_address(zero).is_none());
}

#[test]
fn delegatee_accepts_non_zero_address() {
    let mut bytes = [0_u8; 20];
    bytes[19] = 1;
    let delegatee = DelegateeAddress::from_address(LedgerAddress::new(bytes));
    assert!(delegatee.is_some());
}

#[test]
fn tx_hash_round_trips_hex() {
    let bytes = [0xab_u8; 32];
    let hash = TxHash::new(bytes);
    let parsed = TxHash::from_hex(&hash.to_string()).expect("well-formed hash");
    assert_eq!(parsed, hash);
}
