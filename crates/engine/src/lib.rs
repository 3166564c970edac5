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

//! Deployment orchestration core for the Somnia Playground.
//!
//! This crate contains everything between "the user pressed Deploy" and a
//! confirmed contract address on the Somnia testnet:
//!
//! - [`gas`]: the Somnia-aware gas budget calculator
//! - [`fees`]: the fixed EIP-1559 fee policy for the testnet
//! - [`compiler`]: local Solidity compilation via svm-managed solc
//! - [`deployer`]: the sequential deployment state machine
//! - [`registry`]: the best-effort on-chain registry side protocol
//! - [`error`]: the user-facing failure taxonomy

pub mod compiler;
pub mod deployer;
pub mod error;
pub mod fees;
pub mod gas;
pub mod registry;

pub use compiler::{Compile, CompilationArtifact, SolcCompiler};
pub use deployer::{DeployPhase, DeployPolicy, Deployer, Deployment};
pub use error::DeployError;
pub use fees::FeePolicy;
pub use gas::{GasBudget, GasPolicy};
pub use registry::{RegisterError, Registrar, RegistryOutcome};
