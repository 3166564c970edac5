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

//! Somnia-aware gas budgeting.
//!
//! Somnia charges substantially more per deployed byte than generic EVM
//! estimators assume, and an underestimated deployment reverts without
//! refunding gas already burned. The budget here is therefore derived from
//! the creation bytecode size with a fixed overhead and a proportional
//! safety buffer, and a live `eth_estimateGas` result is only ever used
//! after inflation by [`inflate_estimate`].
//!
//! The formula used to be copy-pasted across every deploy call site with
//! drifting constants; it now lives in one place, parameterized by
//! [`GasPolicy`]. Both constant sets observed in the wild survive as named
//! policies.

use serde::Serialize;
use thiserror::Error;

/// Creation bytecode that violates the hex-string precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBytecode {
    /// Missing the `0x` prefix.
    #[error("creation bytecode must be 0x-prefixed")]
    MissingPrefix,
    /// Odd number of hex digits.
    #[error("creation bytecode has an odd number of hex digits")]
    OddLength,
    /// A character outside `[0-9a-fA-F]`.
    #[error("creation bytecode contains a non-hex character")]
    NonHex,
}

/// Tunable constants for the bytecode-size gas formula.
///
/// `gas = cost + overhead + (cost + overhead) * numerator / denominator`
/// where `cost = byte_len * per_byte_cost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GasPolicy {
    /// Somnia deployment cost per byte of creation bytecode.
    pub per_byte_cost: u64,
    /// Fixed allowance for constructor execution, logs, storage writes and
    /// cold account accesses.
    pub fixed_overhead: u64,
    /// Safety buffer numerator.
    pub buffer_numerator: u64,
    /// Safety buffer denominator.
    pub buffer_denominator: u64,
}

impl GasPolicy {
    /// Policy used by the registry deploy script and every user-facing
    /// deployment path: 3M overhead, +50% buffer.
    pub const REGISTRY_DEPLOY: Self = Self {
        per_byte_cost: 3125,
        fixed_overhead: 3_000_000,
        buffer_numerator: 1,
        buffer_denominator: 2,
    };

    /// Leaner policy used by the standalone token deploy script: 1.5M
    /// overhead, +25% buffer.
    pub const TOKEN_DEPLOY: Self = Self {
        per_byte_cost: 3125,
        fixed_overhead: 1_500_000,
        buffer_numerator: 1,
        buffer_denominator: 4,
    };

    /// Computes the budget for a `0x`-prefixed hex creation bytecode.
    ///
    /// Malformed bytecode is a precondition failure; no partial budget is
    /// computed. `"0x"` is well-formed and yields the overhead-only
    /// budget, which is always strictly positive.
    pub fn budget(&self, bytecode: &str) -> Result<GasBudget, InvalidBytecode> {
        Ok(self.budget_for_len(creation_byte_len(bytecode)?))
    }

    /// Computes the budget for an already-known bytecode length.
    ///
    /// Pure: depends only on the length and the policy constants, and is
    /// monotonically non-decreasing in the length.
    pub fn budget_for_len(&self, byte_len: u64) -> GasBudget {
        let bytecode_cost = byte_len.saturating_mul(self.per_byte_cost);
        let base = bytecode_cost.saturating_add(self.fixed_overhead);
        let buffer = base / self.buffer_denominator * self.buffer_numerator
            + base % self.buffer_denominator * self.buffer_numerator / self.buffer_denominator;
        GasBudget {
            bytecode_cost,
            overhead: self.fixed_overhead,
            buffer,
            total: base.saturating_add(buffer),
        }
    }
}

/// A fully derived deployment gas budget.
///
/// Computed once per deployment attempt and discarded after use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GasBudget {
    /// `byte_len * per_byte_cost`.
    pub bytecode_cost: u64,
    /// The policy's fixed overhead.
    pub overhead: u64,
    /// Proportional safety buffer on top of cost + overhead.
    pub buffer: u64,
    /// The gas limit to attach to the transaction.
    pub total: u64,
}

/// Number of bytes encoded by a `0x`-prefixed hex string.
///
/// The `0x` prefix is not counted. Fails fast on malformed input.
pub fn creation_byte_len(bytecode: &str) -> Result<u64, InvalidBytecode> {
    let hex = bytecode.strip_prefix("0x").ok_or(InvalidBytecode::MissingPrefix)?;
    if hex.len() % 2 != 0 {
        return Err(InvalidBytecode::OddLength);
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(InvalidBytecode::NonHex);
    }
    Ok((hex.len() / 2) as u64)
}

/// Inflates a live on-chain gas estimate by 50%.
///
/// Somnia's cost model for cold storage and account access diverges from
/// generic EVM estimators, so a raw estimate is never trusted directly.
/// The same multiplier backs the registry call's estimate handling.
pub fn inflate_estimate(estimate: u64) -> u64 {
    (u128::from(estimate) * 150 / 100).min(u128::from(u64::MAX)) as u64
}
