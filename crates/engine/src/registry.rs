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

//! On-chain deployment registry side protocol.
//!
//! After a successful deployment the playground records the new contract
//! in a registry contract, signed by the server-held treasury key. The
//! whole protocol is best effort: an unconfigured or misconfigured
//! registry is a skip, a failed submission is a log line, and neither
//! ever fails the deployment that triggered it. The standalone register endpoint uses
//! [`Registrar::submit`] instead and surfaces the same errors strictly.

use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, SolCall};
use playground_common::{validate_registry_address, PlaygroundConfig, RegistryAddressError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{fees::FeePolicy, gas};

sol! {
    /// The playground deployment registry, as deployed on the Somnia
    /// testnet.
    interface IPlaygroundRegistry {
        function registerDeployment(address contractAddress, string metadataURI);
    }
}

/// Metadata recorded with a registration when the caller supplies none.
pub const DEFAULT_METADATA_TAG: &str = "playground:v1";

/// Gas limit used when the registry call cannot be estimated.
pub const REGISTRY_FALLBACK_GAS_LIMIT: u64 = 1_000_000;

/// Why a registration could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// No registry address is configured.
    #[error("Registry address not configured")]
    AddressMissing,
    /// The configured address is the unfilled deploy-template
    /// placeholder.
    #[error("Registry contract not deployed yet. Run the registry deployment script first.")]
    AddressPlaceholder,
    /// The configured address is not a valid address string.
    #[error("Invalid registry address: {0}")]
    AddressInvalid(String),
    /// No treasury key is configured on the server.
    #[error("Server signer key not configured")]
    TreasuryKeyMissing,
    /// The configured treasury key does not parse as a private key.
    #[error("Server signer key is malformed")]
    TreasuryKeyInvalid,
    /// The registration transaction could not be submitted or did not
    /// confirm.
    #[error("Registry registration failed: {0}")]
    Submission(String),
}

/// Result of the best-effort registration path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOutcome {
    /// The registration transaction confirmed.
    Registered {
        /// Hash of the registry transaction.
        tx_hash: B256,
    },
    /// Registration was not attempted; the registry is not (fully)
    /// configured.
    Skipped {
        /// Human-readable reason, taken from the precondition error.
        reason: String,
    },
    /// Registration was attempted and failed.
    Failed {
        /// Human-readable failure, taken from the submission error.
        error: String,
    },
}

impl RegistryOutcome {
    /// The registry transaction hash, when one was confirmed.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Self::Registered { tx_hash } => Some(*tx_hash),
            Self::Skipped { .. } | Self::Failed { .. } => None,
        }
    }
}

/// Submits `registerDeployment` calls signed by the treasury key.
///
/// Holds configuration only; a fresh wallet-backed provider is built per
/// submission so the treasury signer never lives in long-lived state.
pub struct Registrar {
    rpc_url: String,
    registry_address: Option<String>,
    treasury_key: Option<String>,
    fees: FeePolicy,
}

impl Registrar {
    /// Builds a registrar from the startup configuration.
    pub fn new(config: &PlaygroundConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            registry_address: config.registry_address.clone(),
            treasury_key: config.treasury_private_key.clone(),
            fees: FeePolicy::SOMNIA_TESTNET,
        }
    }

    /// Whether the preconditions for registering are met at all.
    pub fn is_configured(&self) -> bool {
        self.registry_target().is_ok() && self.treasury_key.is_some()
    }

    /// Best-effort registration: any configuration gap (missing or
    /// invalid) becomes [`RegistryOutcome::Skipped`], submission
    /// failures become [`RegistryOutcome::Failed`], and nothing
    /// propagates to the caller.
    pub async fn register(&self, contract: Address, metadata_uri: Option<&str>) -> RegistryOutcome {
        match self.submit(contract, metadata_uri).await {
            Ok(tx_hash) => {
                info!(contract = %contract, tx = %tx_hash, "deployment registered");
                RegistryOutcome::Registered { tx_hash }
            }
            Err(
                e @ (RegisterError::AddressMissing
                | RegisterError::AddressPlaceholder
                | RegisterError::TreasuryKeyMissing),
            ) => {
                debug!(contract = %contract, reason = %e, "registry registration skipped");
                RegistryOutcome::Skipped { reason: e.to_string() }
            }
            Err(e @ (RegisterError::AddressInvalid(_) | RegisterError::TreasuryKeyInvalid)) => {
                // Still a skip, but a louder one: someone set a value and
                // got it wrong.
                warn!(contract = %contract, reason = %e, "registry misconfigured, registration skipped");
                RegistryOutcome::Skipped { reason: e.to_string() }
            }
            Err(e) => {
                warn!(contract = %contract, error = %e, "registry registration failed");
                RegistryOutcome::Failed { error: e.to_string() }
            }
        }
    }

    /// Strict registration: every precondition and submission failure is
    /// returned to the caller. Waits for the registry receipt.
    pub async fn submit(
        &self,
        contract: Address,
        metadata_uri: Option<&str>,
    ) -> Result<B256, RegisterError> {
        let registry = self.registry_target()?;
        let signer = self.treasury_signer()?;
        let from = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&self.rpc_url)
            .await
            .map_err(|e| RegisterError::Submission(e.to_string()))?;

        let call = IPlaygroundRegistry::registerDeploymentCall {
            contractAddress: contract,
            metadataURI: metadata_uri.unwrap_or(DEFAULT_METADATA_TAG).to_string(),
        };
        let input: Bytes = call.abi_encode().into();

        let base = TransactionRequest::default()
            .with_from(from)
            .with_to(registry)
            .with_input(input);

        let gas_limit = match self.provider_estimate(&provider, base.clone()).await {
            Some(estimate) => estimate,
            None => REGISTRY_FALLBACK_GAS_LIMIT,
        };

        let tx = base
            .with_gas_limit(gas_limit)
            .with_max_priority_fee_per_gas(self.fees.max_priority_fee_per_gas)
            .with_max_fee_per_gas(self.fees.max_fee_per_gas);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| RegisterError::Submission(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!(tx = %tx_hash, gas_limit, "registry transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| RegisterError::Submission(e.to_string()))?;
        if !receipt.status() {
            return Err(RegisterError::Submission("registry transaction reverted".to_string()));
        }
        Ok(tx_hash)
    }

    /// Live estimate inflated by 50%, or `None` when estimation fails.
    async fn provider_estimate<P: Provider>(
        &self,
        provider: &P,
        tx: TransactionRequest,
    ) -> Option<u64> {
        match provider.estimate_gas(tx).await {
            Ok(estimate) => Some(gas::inflate_estimate(estimate)),
            Err(e) => {
                warn!(error = %e, fallback = REGISTRY_FALLBACK_GAS_LIMIT, "registry gas estimation failed");
                None
            }
        }
    }

    fn registry_target(&self) -> Result<Address, RegisterError> {
        let raw = self.registry_address.as_deref().ok_or(RegisterError::AddressMissing)?;
        let validated = validate_registry_address(raw).map_err(|e| match e {
            RegistryAddressError::Placeholder => RegisterError::AddressPlaceholder,
            RegistryAddressError::Malformed(value) => RegisterError::AddressInvalid(value),
        })?;
        validated
            .parse()
            .map_err(|_| RegisterError::AddressInvalid(validated.to_string()))
    }

    fn treasury_signer(&self) -> Result<PrivateKeySigner, RegisterError> {
        let key = self.treasury_key.as_deref().ok_or(RegisterError::TreasuryKeyMissing)?;
        key.parse().map_err(|_| RegisterError::TreasuryKeyInvalid)
    }
}
