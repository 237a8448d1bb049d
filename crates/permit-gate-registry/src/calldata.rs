// crates/permit-gate-registry/src/calldata.rs
// ============================================================================
// Module: Calldata Codec
// Description: Canonical calldata encoding for policy-store mutations.
// Purpose: Produce deterministic, selector-prefixed call payloads.
// Dependencies: crate::mutation, serde_jcs, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Calldata is a 4-byte selector followed by the canonical JCS serialization
//! of the mutation. The selector is the leading bytes of the sha-256 digest
//! of the function's wire name, so independently built clients agree on every
//! byte. Decoding verifies the selector against the decoded function before
//! accepting the payload.
//!
//! Security posture: calldata arriving at a provider is untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::mutation::MutationSpec;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Calldata codec errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CalldataError {
    /// Canonical serialization of the mutation failed.
    #[error("calldata encoding failed: {0}")]
    Encode(String),
    /// The payload could not be decoded as a known mutation.
    #[error("calldata decoding failed: {0}")]
    Decode(String),
    /// The selector does not match the decoded function.
    #[error("calldata selector mismatch for function {function}")]
    SelectorMismatch {
        /// Function name decoded from the payload body.
        function: String,
    },
}

// ============================================================================
// SECTION: Selector
// ============================================================================

/// Width of the calldata selector prefix in bytes.
pub const SELECTOR_WIDTH: usize = 4;

/// Computes the selector for a function wire name.
#[must_use]
pub fn selector(function: &str) -> [u8; SELECTOR_WIDTH] {
    let digest = Sha256::digest(function.as_bytes());
    let mut out = [0_u8; SELECTOR_WIDTH];
    out.copy_from_slice(&digest[..SELECTOR_WIDTH]);
    out
}

// ============================================================================
// SECTION: Encode / Decode
// ============================================================================

/// Encodes a mutation into selector-prefixed canonical calldata.
///
/// # Errors
///
/// Returns [`CalldataError::Encode`] when canonical serialization fails.
pub fn encode_mutation(spec: &MutationSpec) -> Result<Vec<u8>, CalldataError> {
    let body = serde_jcs::to_vec(spec).map_err(|err| CalldataError::Encode(err.to_string()))?;
    let mut data = Vec::with_capacity(SELECTOR_WIDTH + body.len());
    data.extend_from_slice(&selector(spec.function()));
    data.extend_from_slice(&body);
    Ok(data)
}

/// Decodes selector-prefixed calldata back into a mutation.
///
/// # Errors
///
/// Returns [`CalldataError::Decode`] on a truncated or malformed payload and
/// [`CalldataError::SelectorMismatch`] when the prefix disagrees with the
/// decoded function.
pub fn decode_mutation(data: &[u8]) -> Result<MutationSpec, CalldataError> {
    if data.len() < SELECTOR_WIDTH {
        return Err(CalldataError::Decode("payload shorter than selector".into()));
    }
    let (prefix, body) = data.split_at(SELECTOR_WIDTH);
    let spec: MutationSpec =
        serde_json::from_slice(body).map_err(|err| CalldataError::Decode(err.to_string()))?;
    if prefix != selector(spec.function()) {
        return Err(CalldataError::SelectorMismatch { function: spec.function().to_string() });
    }
    Ok(spec)
}
