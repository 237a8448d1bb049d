// crates/permit-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Permit Gate Identifiers
// Description: Canonical opaque identifiers for PKPs, tools, and delegatees.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Permit Gate.
//! Identifiers are opaque and serialize as numbers or strings on the wire.
//! Numeric identifiers enforce non-zero, 1-based invariants at construction
//! boundaries; addresses enforce the zero-address invariant where the data
//! model requires it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as DeError;

// ============================================================================
// SECTION: Hex Helpers
// ============================================================================

/// Encodes bytes as lowercase hex without a prefix.
fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Decodes a single hex character into its nibble value.
fn hex_nibble(ch: u8) -> Option<u8> {
    char::from(ch).to_digit(16).and_then(|value| u8::try_from(value).ok())
}

/// Decodes a fixed-width hex string, with or without a `0x` prefix.
fn decode_hex_fixed<const N: usize>(text: &str) -> Option<[u8; N]> {
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    if stripped.len() != N * 2 {
        return None;
    }
    let mut out = [0_u8; N];
    for (index, pair) in stripped.as_bytes().chunks_exact(2).enumerate() {
        let hi = hex_nibble(pair[0])?;
        let lo = hex_nibble(pair[1])?;
        out[index] = (hi << 4) | lo;
    }
    Some(out)
}

// ============================================================================
// SECTION: PKP Token Identifier
// ============================================================================

/// PKP token identifier anchoring all policy state.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PkpTokenId(NonZeroU64);

impl PkpTokenId {
    /// Creates a new PKP token identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a PKP token identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for PkpTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: Ledger Addresses
// ============================================================================

/// Width of a ledger account address in bytes.
pub const ADDRESS_WIDTH: usize = 20;

/// Ledger account address with a lowercase hex wire form.
///
/// # Invariants
/// - Serializes as a `0x`-prefixed lowercase hex string.
/// - The zero address is representable; callers requiring non-zero addresses
///   use [`DelegateeAddress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerAddress([u8; ADDRESS_WIDTH]);

impl LedgerAddress {
    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; ADDRESS_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Parses an address from hex text (returns `None` on malformed input).
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        decode_hex_fixed::<ADDRESS_WIDTH>(text).map(Self)
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_WIDTH] {
        &self.0
    }

    /// Returns true when every byte of the address is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", encode_hex(&self.0))
    }
}

impl Serialize for LedgerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LedgerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text)
            .ok_or_else(|| DeError::custom(format!("malformed ledger address: {text}")))
    }
}

/// Delegatee address proven non-zero at construction.
///
/// # Invariants
/// - Never the zero address; construction rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DelegateeAddress(LedgerAddress);

impl DelegateeAddress {
    /// Creates a delegatee address (returns `None` for the zero address).
    #[must_use]
    pub fn from_address(address: LedgerAddress) -> Option<Self> {
        if address.is_zero() { None } else { Some(Self(address)) }
    }

    /// Parses a delegatee address from hex text (returns `None` on malformed
    /// or zero input).
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        LedgerAddress::from_hex(text).and_then(Self::from_address)
    }

    /// Returns the underlying ledger address.
    #[must_use]
    pub const fn address(&self) -> LedgerAddress {
        self.0
    }
}

impl fmt::Display for DelegateeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for DelegateeAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let address = LedgerAddress::deserialize(deserializer)?;
        Self::from_address(address)
            .ok_or_else(|| DeError::custom("delegatee address must not be the zero address"))
    }
}

// ============================================================================
// SECTION: Tool and Parameter Identifiers
// ============================================================================

/// Content-addressed tool identifier (CID).
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCid(String);

impl ToolCid {
    /// Creates a new tool identifier.
    #[must_use]
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named parameter identifier scoped to a (PKP, tool, delegatee) triple.
///
/// # Invariants
/// - Opaque UTF-8 string; uniqueness within a triple is enforced by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterName(String);

impl ParameterName {
    /// Creates a new parameter name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Policy version string attached to a policy blob.
///
/// # Invariants
/// - Opaque UTF-8 string; ordering between versions is not defined by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyVersion(String);

impl PolicyVersion {
    /// Creates a new policy version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Returns the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Transaction Hash
// ============================================================================

/// Width of a transaction digest in bytes.
pub const TX_HASH_WIDTH: usize = 32;

/// Canonical transaction digest with a lowercase hex wire form.
///
/// # Invariants
/// - Serializes as a `0x`-prefixed lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; TX_HASH_WIDTH]);

impl TxHash {
    /// Creates a transaction hash from raw digest bytes.
    #[must_use]
    pub const fn new(bytes: [u8; TX_HASH_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Parses a transaction hash from hex text (returns `None` on malformed input).
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        decode_hex_fixed::<TX_HASH_WIDTH>(text).map(Self)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TX_HASH_WIDTH] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", encode_hex(&self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text)
            .ok_or_else(|| DeError::custom(format!("malformed transaction hash: {text}")))
    }
}

#[cfg(test)]
mod tests;
