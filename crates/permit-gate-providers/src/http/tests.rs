// crates/permit-gate-providers/src/http/tests.rs
// ============================================================================
// Module: HTTP Provider Unit Tests
// Description: Unit coverage for the JSON-RPC ledger provider.
// Purpose: Ensure RPC parsing is strict and limits fail closed.
// Dependencies: permit-gate-providers, tiny_http
// ============================================================================

//! ## Overview
//! Runs the provider against a local single-shot HTTP server and verifies
//! estimate parsing, broadcast hash extraction, and scheme rejection.

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

use std::thread;

use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerProvider;
use permit_gate_core::ProviderError;
use permit_gate_core::TransactionRequest;
use reqwest::Url;

use super::HttpLedgerProvider;
use super::HttpLedgerProviderConfig;

/// Spawns a single-shot server answering every request with `body`.
fn single_shot_server(body: &'static str) -> (Url, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let endpoint: Url =
        format!("http://127.0.0.1:{}/", addr.port()).parse().expect("endpoint url");
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = request.respond(tiny_http::Response::from_string(body));
        }
    });
    (endpoint, handle)
}

/// Builds a provider config for a local cleartext test endpoint.
fn local_config(endpoint: Url) -> HttpLedgerProviderConfig {
    let mut config = HttpLedgerProviderConfig::new(endpoint);
    config.allow_http = true;
    config
}

/// Builds a minimal transaction request.
fn request() -> TransactionRequest {
    TransactionRequest {
        to: LedgerAddress::from_hex("0x000000000000000000000000000000000000c0de")
            .expect("address"),
        data: vec![1, 2, 3],
    }
}

#[test]
fn estimate_parses_decimal_quantity() {
    let (endpoint, handle) = single_shot_server(r#"{"jsonrpc":"2.0","id":1,"result":12345}"#);
    let provider = HttpLedgerProvider::new(local_config(endpoint)).expect("provider");
    let from = LedgerAddress::from_hex("0x00000000000000000000000000000000000000aa")
        .expect("address");
    let estimate = provider.estimate_gas(&from, &request()).expect("estimate");
    assert_eq!(estimate, 12_345);
    handle.join().expect("server thread");
}

#[test]
fn estimate_rejects_non_numeric_result() {
    let (endpoint, handle) =
        single_shot_server(r#"{"jsonrpc":"2.0","id":1,"result":"not-a-number"}"#);
    let provider = HttpLedgerProvider::new(local_config(endpoint)).expect("provider");
    let from = LedgerAddress::from_hex("0x00000000000000000000000000000000000000aa")
        .expect("address");
    let result = provider.estimate_gas(&from, &request());
    assert!(matches!(result, Err(ProviderError::Estimate(_))));
    handle.join().expect("server thread");
}

#[test]
fn broadcast_extracts_transaction_hash() {
    let body = concat!(
        r#"{"jsonrpc":"2.0","id":1,"result":{"hash":"#,
        r#""0x1111111111111111111111111111111111111111111111111111111111111111"}}"#,
    );
    let (endpoint, handle) = single_shot_server(body);
    let provider = HttpLedgerProvider::new(local_config(endpoint)).expect("provider");
    let pending = provider.broadcast(&[0xde, 0xad]).expect("broadcast");
    assert_eq!(
        pending.hash.to_string(),
        "0x1111111111111111111111111111111111111111111111111111111111111111"
    );
    handle.join().expect("server thread");
}

#[test]
fn broadcast_surfaces_rpc_errors() {
    let (endpoint, handle) = single_shot_server(
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#,
    );
    let provider = HttpLedgerProvider::new(local_config(endpoint)).expect("provider");
    let result = provider.broadcast(&[0xde, 0xad]);
    match result {
        Err(ProviderError::Broadcast(message)) => assert!(message.contains("nonce too low")),
        other => panic!("expected broadcast error, got {other:?}"),
    }
    handle.join().expect("server thread");
}

#[test]
fn cleartext_endpoint_is_rejected_by_default() {
    let endpoint: Url = "http://127.0.0.1:1/".parse().expect("endpoint url");
    let result = HttpLedgerProvider::new(HttpLedgerProviderConfig::new(endpoint));
    assert!(matches!(result, Err(ProviderError::Transport(_))));
}
