// crates/permit-gate-providers/src/http.rs
// ============================================================================
// Module: HTTP Ledger Provider
// Description: JSON-RPC ledger provider over bounded blocking HTTP.
// Purpose: Provide estimation and broadcast against a ledger node with strict
// limits.
// Dependencies: permit-gate-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The HTTP provider speaks a minimal JSON-RPC dialect to a ledger node:
//! `pg_estimateGas` returns a decimal gas quantity and
//! `pg_sendRawTransaction` returns the transaction hash of an accepted
//! broadcast. Requests are bounded: cleartext HTTP is rejected unless
//! explicitly allowed, responses are size-capped, and any unexpected shape
//! fails closed.
//! Security posture: node responses are untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerProvider;
use permit_gate_core::PendingTransaction;
use permit_gate_core::ProviderError;
use permit_gate_core::TransactionRequest;
use permit_gate_core::TxHash;
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP ledger provider.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` endpoints.
/// - `max_response_bytes` is enforced as a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpLedgerProviderConfig {
    /// Ledger node JSON-RPC endpoint.
    pub endpoint: Url,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl HttpLedgerProviderConfig {
    /// Creates a configuration with default limits for an endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            allow_http: false,
            timeout_ms: 10_000,
            max_response_bytes: 1024 * 1024,
            user_agent: "permit-gate/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Provider Implementation
// ============================================================================

/// Ledger provider speaking JSON-RPC over blocking HTTP.
///
/// # Invariants
/// - Responses exceeding configured limits fail closed.
/// - Node-reported errors surface verbatim in the provider error text.
pub struct HttpLedgerProvider {
    /// Provider configuration, including limits.
    config: HttpLedgerProviderConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpLedgerProvider {
    /// Creates a provider for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the endpoint scheme is not allowed or
    /// the HTTP client cannot be created.
    pub fn new(config: HttpLedgerProviderConfig) -> Result<Self, ProviderError> {
        match config.endpoint.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            other => {
                return Err(ProviderError::Transport(format!(
                    "endpoint scheme not allowed: {other}"
                )));
            }
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| ProviderError::Transport(format!("http client build failed: {err}")))?;
        Ok(Self { config, client })
    }

    /// Issues one JSON-RPC call and returns the `result` member.
    fn rpc(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&body)
            .send()
            .map_err(|err| ProviderError::Transport(format!("rpc request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(ProviderError::Transport(format!(
                "rpc status {} from ledger node",
                response.status().as_u16()
            )));
        }
        let bytes = read_limited(response, self.config.max_response_bytes)?;
        let envelope: Value = serde_json::from_slice(&bytes)
            .map_err(|err| ProviderError::Transport(format!("rpc response malformed: {err}")))?;
        if let Some(error) = envelope.get("error") {
            return Err(ProviderError::Transport(format!("rpc error: {error}")));
        }
        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ProviderError::Transport("rpc response missing result".to_string()))
    }
}

impl LedgerProvider for HttpLedgerProvider {
    fn estimate_gas(
        &self,
        from: &LedgerAddress,
        request: &TransactionRequest,
    ) -> Result<u64, ProviderError> {
        let params = json!([{
            "from": from.to_string(),
            "to": request.to.to_string(),
            "data": encode_hex(&request.data),
        }]);
        let result = self
            .rpc("pg_estimateGas", params)
            .map_err(|err| ProviderError::Estimate(err.to_string()))?;
        result
            .as_u64()
            .ok_or_else(|| ProviderError::Estimate("estimate is not a u64 quantity".to_string()))
    }

    fn broadcast(&self, raw: &[u8]) -> Result<PendingTransaction, ProviderError> {
        let result = self
            .rpc("pg_sendRawTransaction", json!([encode_hex(raw)]))
            .map_err(|err| ProviderError::Broadcast(err.to_string()))?;
        let hash_text = result
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Broadcast("broadcast result missing hash".to_string()))?;
        let hash = TxHash::from_hex(hash_text).ok_or_else(|| {
            ProviderError::Broadcast(format!("malformed transaction hash: {hash_text}"))
        })?;
        Ok(PendingTransaction { hash })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Encodes bytes as a `0x`-prefixed lowercase hex string for the RPC wire.
fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        // Writing into a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Reads a response body up to a hard byte limit, failing closed beyond it.
fn read_limited(
    response: reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, ProviderError> {
    let mut body = Vec::new();
    let limit = u64::try_from(max_bytes)
        .map_err(|_| ProviderError::Transport("response limit out of range".to_string()))?;
    let mut bounded = response.take(limit.saturating_add(1));
    bounded
        .read_to_end(&mut body)
        .map_err(|err| ProviderError::Transport(format!("rpc body read failed: {err}")))?;
    if body.len() > max_bytes {
        return Err(ProviderError::Transport("rpc response exceeds size limit".to_string()));
    }
    Ok(body)
}

#[cfg(test)]
mod tests;
