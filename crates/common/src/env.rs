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

//! Environment variable name constants for playground configuration.
//!
//! These constants are the single source of truth for every environment
//! variable the backend reads. Configuration is resolved once at process
//! start (see [`crate::PlaygroundConfig::from_env`]) and passed by
//! reference afterwards; nothing reads the environment mid-request.

/// JSON-RPC endpoint of the target Somnia chain.
///
/// When unset, the Somnia testnet public endpoint
/// (`https://dream-rpc.somnia.network`) is used. Also available as the
/// `--rpc-url` CLI argument, which takes precedence.
pub const SOMNIA_RPC_URL: &str = "SOMNIA_RPC_URL";

/// Address of the on-chain deployment registry contract.
///
/// Must be a `0x`-prefixed 40-hex-digit address. The literal placeholder
/// value left behind by an unconfigured deploy template
/// (`0xREGISTRY_ADDRESS_FROM_DEPLOY`) is rejected as "not configured"
/// rather than treated as a real address. When absent or invalid, registry
/// bookkeeping is skipped; user deployments are unaffected.
pub const REGISTRY_ADDRESS: &str = "REGISTRY_ADDRESS";

/// Private key of the server-held treasury signer.
///
/// This key authorizes registry bookkeeping transactions only. It is never
/// used to sign user deployments and must be distinct from any end user
/// key.
pub const TREASURY_PRIVATE_KEY: &str = "TREASURY_PRIVATE_KEY";

/// Legacy alias for [`TREASURY_PRIVATE_KEY`], consulted as a fallback.
pub const REGISTRY_SIGNER_PRIVATE_KEY: &str = "REGISTRY_SIGNER_PRIVATE_KEY";

/// API key for the Gemini generative AI service backing the assistant
/// panel. When unset, the assistant endpoints return a configuration
/// error; everything else keeps working.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Override for the Gemini API base URL.
///
/// Intended for tests that stand in a mock server for the real API.
/// Defaults to `https://generativelanguage.googleapis.com/v1beta`.
pub const GEMINI_API_BASE: &str = "GEMINI_API_BASE";
