// Somnia Playground - backend services for the Somnia browser IDE
// Copyright (C) 2025 Somnia Playground Developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Process-wide configuration for the playground backend.
//!
//! [`PlaygroundConfig`] is built exactly once at startup from the
//! environment (plus CLI overrides) and then passed by reference into the
//! deployment orchestrator, the registry side protocol, and the HTTP
//! handlers. No call site reads the environment implicitly mid-function.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::env;

/// Static description of a target network.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NetworkProfile {
    /// Human-readable network name.
    pub name: &'static str,
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Default public JSON-RPC endpoint.
    pub rpc_url: &'static str,
    /// Block explorer base URL (no trailing slash).
    pub explorer_url: &'static str,
    /// Native token symbol.
    pub symbol: &'static str,
}

/// The Somnia "Shannon" testnet, the only network the playground targets.
pub const SOMNIA_TESTNET: NetworkProfile = NetworkProfile {
    name: "Somnia Testnet",
    chain_id: 50312,
    rpc_url: "https://dream-rpc.somnia.network",
    explorer_url: "https://shannon-explorer.somnia.network",
    symbol: "STT",
};

impl NetworkProfile {
    /// Explorer URL for an account or contract address.
    pub fn address_explorer_url(&self, address: impl fmt::Display) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    /// Explorer URL for a transaction hash.
    pub fn tx_explorer_url(&self, tx_hash: impl fmt::Display) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// Unfilled template value some deploy scripts leave behind when the
/// registry has never been deployed. Treated as "not configured", never as
/// an address.
pub const REGISTRY_ADDRESS_PLACEHOLDER: &str = "0xREGISTRY_ADDRESS_FROM_DEPLOY";

/// Why a configured registry address string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryAddressError {
    /// The value is not a `0x`-prefixed 40-hex-digit address.
    #[error("invalid registry address value: {0}")]
    Malformed(String),
    /// The value is the unfilled deploy-template placeholder.
    #[error("registry address is the unfilled placeholder {REGISTRY_ADDRESS_PLACEHOLDER}")]
    Placeholder,
}

/// Checks a configured registry address string.
///
/// Returns the trimmed address on success. The placeholder left by an
/// unconfigured deploy template is explicitly rejected rather than being
/// treated as absent, so a misconfigured deployment is visible in logs.
pub fn validate_registry_address(raw: &str) -> Result<&str, RegistryAddressError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(REGISTRY_ADDRESS_PLACEHOLDER) {
        return Err(RegistryAddressError::Placeholder);
    }
    let hex = raw.strip_prefix("0x").ok_or_else(|| RegistryAddressError::Malformed(raw.into()))?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RegistryAddressError::Malformed(raw.into()));
    }
    Ok(raw)
}

/// Backend configuration resolved once at process start.
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    /// JSON-RPC endpoint for the target chain.
    pub rpc_url: String,
    /// Raw configured registry contract address, if any. Validated lazily
    /// by [`validate_registry_address`] so an invalid value degrades to
    /// "registry skipped" rather than failing startup.
    pub registry_address: Option<String>,
    /// Server-held treasury signing key for registry bookkeeping.
    pub treasury_private_key: Option<String>,
    /// Gemini API key for the assistant panel.
    pub gemini_api_key: Option<String>,
    /// Gemini API base URL override (tests point this at a mock server).
    pub gemini_api_base: Option<String>,
    /// Target network profile.
    pub network: NetworkProfile,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            rpc_url: SOMNIA_TESTNET.rpc_url.to_string(),
            registry_address: None,
            treasury_private_key: None,
            gemini_api_key: None,
            gemini_api_base: None,
            network: SOMNIA_TESTNET,
        }
    }
}

impl PlaygroundConfig {
    /// Builds the configuration from the process environment.
    ///
    /// Empty and whitespace-only values are treated as unset. The treasury
    /// key falls back to the legacy `REGISTRY_SIGNER_PRIVATE_KEY` variable.
    pub fn from_env() -> Self {
        Self {
            rpc_url: read_env(env::SOMNIA_RPC_URL)
                .unwrap_or_else(|| SOMNIA_TESTNET.rpc_url.to_string()),
            registry_address: read_env(env::REGISTRY_ADDRESS),
            treasury_private_key: read_env(env::TREASURY_PRIVATE_KEY)
                .or_else(|| read_env(env::REGISTRY_SIGNER_PRIVATE_KEY)),
            gemini_api_key: read_env(env::GEMINI_API_KEY),
            gemini_api_base: read_env(env::GEMINI_API_BASE),
            network: SOMNIA_TESTNET,
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn valid_registry_address_passes() {
        let addr = "0x00000000000000000000000000000000000000a1";
        assert_eq!(validate_registry_address(addr), Ok(addr));
        // Surrounding whitespace is tolerated.
        assert_eq!(validate_registry_address("  0x00000000000000000000000000000000000000a1 "), Ok(addr));
    }

    #[test]
    fn placeholder_registry_address_is_rejected() {
        assert_eq!(
            validate_registry_address(REGISTRY_ADDRESS_PLACEHOLDER),
            Err(RegistryAddressError::Placeholder)
        );
        // The original templates upper-case the value when comparing.
        assert_eq!(
            validate_registry_address("0XREGISTRY_ADDRESS_FROM_DEPLOY"),
            Err(RegistryAddressError::Placeholder)
        );
    }

    #[test]
    fn malformed_registry_addresses_are_rejected() {
        for bad in ["", "0x", "0x1234", "1234", "0xzz000000000000000000000000000000000000zz"] {
            assert!(matches!(
                validate_registry_address(bad),
                Err(RegistryAddressError::Malformed(_))
            ));
        }
        // 39 and 41 hex digits.
        assert!(validate_registry_address(&format!("0x{}", "a".repeat(39))).is_err());
        assert!(validate_registry_address(&format!("0x{}", "a".repeat(41))).is_err());
    }

    #[test]
    fn explorer_urls_follow_the_shannon_layout() {
        let profile = SOMNIA_TESTNET;
        assert_eq!(
            profile.address_explorer_url("0xabc"),
            "https://shannon-explorer.somnia.network/address/0xabc"
        );
        assert_eq!(
            profile.tx_explorer_url("0xdef"),
            "https://shannon-explorer.somnia.network/tx/0xdef"
        );
    }

    #[test]
    #[serial]
    fn from_env_treats_blank_values_as_unset() {
        std::env::set_var(env::REGISTRY_ADDRESS, "   ");
        std::env::set_var(env::TREASURY_PRIVATE_KEY, "");
        std::env::set_var(env::REGISTRY_SIGNER_PRIVATE_KEY, "0xfeed");
        let config = PlaygroundConfig::from_env();
        assert_eq!(config.registry_address, None);
        // Legacy fallback variable is honored.
        assert_eq!(config.treasury_private_key.as_deref(), Some("0xfeed"));
        assert_eq!(config.network.chain_id, 50312);
        std::env::remove_var(env::REGISTRY_ADDRESS);
        std::env::remove_var(env::TREASURY_PRIVATE_KEY);
        std::env::remove_var(env::REGISTRY_SIGNER_PRIVATE_KEY);
    }
}
