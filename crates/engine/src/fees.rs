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

//! Fixed EIP-1559 fee policy for the Somnia testnet.
//!
//! Fees are policy constants, not live fee-market data; every transaction
//! the playground submits (deployments and registry calls alike) carries
//! the same dual-fee fields so legacy gas-price handling never kicks in.

const GWEI: u128 = 1_000_000_000;

/// EIP-1559 fee fields attached to every submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    /// Tip paid to the block proposer, in wei per gas.
    pub max_priority_fee_per_gas: u128,
    /// Absolute per-gas ceiling, in wei.
    pub max_fee_per_gas: u128,
}

impl FeePolicy {
    /// 2 gwei priority fee, 50 gwei ceiling.
    pub const SOMNIA_TESTNET: Self =
        Self { max_priority_fee_per_gas: 2 * GWEI, max_fee_per_gas: 50 * GWEI };
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::SOMNIA_TESTNET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn somnia_constants_are_in_gwei() {
        let fees = FeePolicy::default();
        assert_eq!(fees.max_priority_fee_per_gas, 2_000_000_000);
        assert_eq!(fees.max_fee_per_gas, 50_000_000_000);
        assert!(fees.max_fee_per_gas > fees.max_priority_fee_per_gas);
    }
}
