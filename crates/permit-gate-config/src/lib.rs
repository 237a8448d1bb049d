// crates/permit-gate-config/src/lib.rs
// ============================================================================
// Module: Permit Gate Config
// Description: Canonical configuration model with fail-closed loading.
// Purpose: Load and validate deployment settings for the registry and
// execution layers from TOML.
// Dependencies: permit-gate-core, serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration covers the ledger connection (endpoint, policy store
//! address, chain id) and execution limits. Loading is strict: over-long
//! paths, oversized files, and non-UTF-8 content are rejected before parsing,
//! and every parsed value is validated before a config is returned. Absent
//! optional settings fall back to documented defaults.
//!
//! Security posture: config files are untrusted input; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Component;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use permit_gate_core::LedgerAddress;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum config path length in bytes.
const MAX_PATH_LENGTH: usize = 4_096;

/// Maximum length of one path component in bytes.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;

/// Maximum config file size in bytes (1 MiB).
const MAX_FILE_SIZE: u64 = 1_048_576;

/// Default chain identifier for local development ledgers.
const DEFAULT_CHAIN_ID: u64 = 1;

/// Default RPC timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default maximum RPC response size in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Message prefixes are stable; operators and tests match on them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config path exceeds the maximum length.
    #[error("config path exceeds max length: {0} bytes")]
    PathTooLong(usize),
    /// One path component exceeds the maximum length.
    #[error("config path component too long: {0} bytes")]
    PathComponentTooLong(usize),
    /// The config file exceeds the size limit.
    #[error("config file exceeds size limit: {0} bytes")]
    FileTooLarge(u64),
    /// The config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// The config file could not be read.
    #[error("config file read failed: {0}")]
    Io(String),
    /// The config file could not be parsed as TOML.
    #[error("config parse failed: {0}")]
    Parse(String),
    /// A parsed value failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Ledger connection settings.
///
/// # Invariants
/// - `endpoint` is `https://` unless `allow_http` is set.
/// - `store_address` is a well-formed, non-zero contract address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Ledger node JSON-RPC endpoint.
    pub endpoint: String,
    /// Deployed policy store contract address.
    pub store_address: String,
    /// Chain identifier (>= 1).
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Allow cleartext HTTP endpoints (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
    /// RPC timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum RPC response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

/// Default chain identifier.
const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

/// Default RPC timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default maximum RPC response size.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Top-level Permit Gate configuration.
///
/// # Invariants
/// - A returned config has passed full validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermitGateConfig {
    /// Ledger connection settings.
    pub ledger: LedgerConfig,
}

impl PermitGateConfig {
    /// Loads configuration from a TOML file with strict input guards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path, file size, encoding, parse, or
    /// validation checks fail.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Err(ConfigError::Invalid("config path is required".to_string()));
        };
        check_path(path)?;
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(ConfigError::FileTooLarge(metadata.len()));
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        let config: Self =
            toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every parsed value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = Url::parse(&self.ledger.endpoint)
            .map_err(|err| ConfigError::Invalid(format!("ledger endpoint: {err}")))?;
        match endpoint.scheme() {
            "https" => {}
            "http" if self.ledger.allow_http => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "ledger endpoint scheme not allowed: {other}"
                )));
            }
        }
        let store = LedgerAddress::from_hex(&self.ledger.store_address).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "malformed store address: {}",
                self.ledger.store_address
            ))
        })?;
        if store.is_zero() {
            return Err(ConfigError::Invalid("store address must not be zero".to_string()));
        }
        if self.ledger.chain_id == 0 {
            return Err(ConfigError::Invalid("chain id must be >= 1".to_string()));
        }
        if self.ledger.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout must be non-zero".to_string()));
        }
        if self.ledger.max_response_bytes == 0 {
            return Err(ConfigError::Invalid("response limit must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Returns the validated policy store address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the stored text is malformed;
    /// unreachable after [`Self::validate`].
    pub fn store_address(&self) -> Result<LedgerAddress, ConfigError> {
        LedgerAddress::from_hex(&self.ledger.store_address).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "malformed store address: {}",
                self.ledger.store_address
            ))
        })
    }
}

// ============================================================================
// SECTION: Path Guards
// ============================================================================

/// Rejects over-long paths and path components before any file I/O.
fn check_path(path: &Path) -> Result<(), ConfigError> {
    let length = path.as_os_str().len();
    if length > MAX_PATH_LENGTH {
        return Err(ConfigError::PathTooLong(length));
    }
    for component in path.components() {
        if let Component::Normal(part) = component {
            let part_length = part.len();
            if part_length > MAX_PATH_COMPONENT_LENGTH {
                return Err(ConfigError::PathComponentTooLong(part_length));
            }
        }
    }
    Ok(())
}
