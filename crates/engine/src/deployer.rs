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

//! The deployment state machine.
//!
//! A deployment is a strictly sequential flow: fund check, compile, gas
//! budgeting, submission, bounded confirmation, then a best-effort
//! registry side call. Each phase either advances or terminates the
//! attempt with a [`DeployError`]; there is no retry and no backward
//! transition. The registry call runs only after success and can never
//! fail the deployment itself.

use std::time::Duration;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::{debug, info, warn};

use crate::{
    compiler::{Compile, CompilationArtifact},
    error::DeployError,
    fees::FeePolicy,
    gas::{self, GasPolicy},
    registry::Registrar,
};

/// Default bound on waiting for the creation receipt.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Phases of a deployment attempt, in order. Used for progress tracing;
/// the flow itself is encoded by [`Deployer::deploy_artifact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    /// Nothing started yet.
    Idle,
    /// Source is being compiled.
    Compiling,
    /// Deriving the gas limit from an estimate or the size formula.
    BudgetingGas,
    /// Waiting for the transaction to be signed.
    AwaitingSignature,
    /// The signed transaction has been handed to the RPC endpoint.
    Submitted,
    /// Waiting for the creation receipt.
    Confirming,
    /// A contract address has been confirmed.
    Succeeded,
    /// The attempt terminated with an error.
    Failed,
}

/// Knobs of a deployment attempt. The defaults are the playground's
/// production values.
#[derive(Debug, Clone, Copy)]
pub struct DeployPolicy {
    /// Fallback gas formula when no live estimate is obtainable.
    pub gas: GasPolicy,
    /// EIP-1559 fees attached to the creation transaction.
    pub fees: FeePolicy,
    /// Bound on waiting for the creation receipt.
    pub confirm_timeout: Duration,
}

impl Default for DeployPolicy {
    fn default() -> Self {
        Self {
            gas: GasPolicy::REGISTRY_DEPLOY,
            fees: FeePolicy::SOMNIA_TESTNET,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }
}

/// A confirmed deployment.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Address of the newly created contract.
    pub contract_address: Address,
    /// Hash of the creation transaction.
    pub transaction_hash: B256,
    /// The account that signed the creation transaction.
    pub deployer: Address,
    /// Gas limit that was attached to the transaction.
    pub gas_limit: u64,
    /// Registry transaction hash, when the best-effort side call went
    /// through. `None` when the registry is unconfigured or the call
    /// failed; never an error.
    pub registry_tx_hash: Option<B256>,
}

/// Drives deployments against a wallet-backed provider.
///
/// The provider must be able to sign for `from` (built with a wallet
/// filler); the deployer itself never touches key material.
pub struct Deployer<P> {
    provider: P,
    from: Address,
    policy: DeployPolicy,
}

impl<P: Provider> Deployer<P> {
    /// Creates a deployer with the production policy.
    pub fn new(provider: P, from: Address) -> Self {
        Self { provider, from, policy: DeployPolicy::default() }
    }

    /// Overrides the deployment policy.
    pub fn with_policy(mut self, policy: DeployPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Full deployment path: compile `source`, then deploy the artifact.
    ///
    /// The balance precondition runs before the compiler so that an
    /// unfunded signer never pays the compilation latency.
    pub async fn deploy_source(
        &self,
        compiler: &dyn Compile,
        source: &str,
        contract_name: Option<&str>,
        registrar: Option<&Registrar>,
    ) -> Result<Deployment, DeployError> {
        debug!(phase = ?DeployPhase::Idle, from = %self.from, "starting deployment attempt");
        let result = async {
            self.ensure_funded().await?;

            debug!(phase = ?DeployPhase::Compiling, "compiling source");
            let artifact = compiler.compile(source, contract_name)?;

            self.deploy_compiled(&artifact, registrar).await
        }
        .await;
        self.trace_outcome(result)
    }

    /// Deploys an already-compiled artifact.
    pub async fn deploy_artifact(
        &self,
        artifact: &CompilationArtifact,
        registrar: Option<&Registrar>,
    ) -> Result<Deployment, DeployError> {
        debug!(phase = ?DeployPhase::Idle, from = %self.from, "starting deployment attempt");
        let result = async {
            self.ensure_funded().await?;
            self.deploy_compiled(artifact, registrar).await
        }
        .await;
        self.trace_outcome(result)
    }

    /// Terminal phase trace for a finished attempt.
    fn trace_outcome(
        &self,
        result: Result<Deployment, DeployError>,
    ) -> Result<Deployment, DeployError> {
        if let Err(e) = &result {
            warn!(phase = ?DeployPhase::Failed, error = %e, "deployment attempt terminated");
        }
        result
    }

    /// Zero balance is a terminal failure before anything is attempted.
    async fn ensure_funded(&self) -> Result<(), DeployError> {
        let balance =
            self.provider.get_balance(self.from).await.map_err(|e| DeployError::from_rpc(&e))?;
        if balance.is_zero() {
            return Err(DeployError::InsufficientFunds);
        }
        Ok(())
    }

    async fn deploy_compiled(
        &self,
        artifact: &CompilationArtifact,
        registrar: Option<&Registrar>,
    ) -> Result<Deployment, DeployError> {
        // Malformed bytecode fails fast; no partial budget, no submission.
        let code = artifact.bytecode_bytes()?;
        let byte_len = code.len() as u64;

        debug!(phase = ?DeployPhase::BudgetingGas, byte_len, "deriving gas limit");
        let estimate_tx = TransactionRequest::default()
            .with_from(self.from)
            .with_deploy_code(code.clone());
        let gas_limit = match self.provider.estimate_gas(estimate_tx).await {
            Ok(estimate) => {
                let inflated = gas::inflate_estimate(estimate);
                debug!(estimate, inflated, "using inflated on-chain estimate");
                inflated
            }
            Err(e) => {
                let budget = self.policy.gas.budget_for_len(byte_len);
                warn!(error = %e, fallback = budget.total, "gas estimation failed, using size formula");
                budget.total
            }
        };

        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_deploy_code(code)
            .with_gas_limit(gas_limit)
            .with_max_priority_fee_per_gas(self.policy.fees.max_priority_fee_per_gas)
            .with_max_fee_per_gas(self.policy.fees.max_fee_per_gas);

        debug!(phase = ?DeployPhase::AwaitingSignature, gas_limit, "submitting creation transaction");
        let pending =
            self.provider.send_transaction(tx).await.map_err(|e| DeployError::from_rpc(&e))?;
        let transaction_hash = *pending.tx_hash();
        debug!(phase = ?DeployPhase::Submitted, tx = %transaction_hash, "transaction accepted");

        debug!(phase = ?DeployPhase::Confirming, timeout = ?self.policy.confirm_timeout, "awaiting receipt");
        let receipt = tokio::time::timeout(self.policy.confirm_timeout, pending.get_receipt())
            .await
            .map_err(|_| DeployError::Timeout)?
            .map_err(|e| DeployError::from_message(&e.to_string()))?;

        if !receipt.status() {
            return Err(DeployError::TransactionReverted);
        }
        let contract_address = receipt.contract_address.ok_or_else(|| {
            DeployError::Unknown("Transaction confirmed but no contract address found".to_string())
        })?;

        info!(
            phase = ?DeployPhase::Succeeded,
            contract = %contract_address,
            tx = %transaction_hash,
            gas_limit,
            "deployment confirmed"
        );

        // Best effort: a registry failure is logged inside the registrar
        // and reported as an absent hash, never as a deployment failure.
        let registry_tx_hash = match registrar {
            Some(registrar) => registrar.register(contract_address, None).await.tx_hash(),
            None => None,
        };

        Ok(Deployment {
            contract_address,
            transaction_hash,
            deployer: self.from,
            gas_limit,
            registry_tx_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_production_values() {
        let policy = DeployPolicy::default();
        assert_eq!(policy.gas, GasPolicy::REGISTRY_DEPLOY);
        assert_eq!(policy.fees, FeePolicy::SOMNIA_TESTNET);
        assert_eq!(policy.confirm_timeout, Duration::from_secs(60));
    }
}
