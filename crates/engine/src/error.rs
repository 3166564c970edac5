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

//! User-facing failure taxonomy for deployment attempts.
//!
//! Failures originating in external collaborators (compiler diagnostics,
//! chain RPC error text) are surfaced verbatim; classification only maps
//! known structured error codes and message substrings onto the taxonomy
//! for user-facing phrasing. Anything unmatched falls through to
//! [`DeployError::Unknown`] carrying the raw upstream message. Nothing
//! here is retried automatically.

use alloy_transport::{RpcError, TransportErrorKind};
use thiserror::Error;

/// EIP-1193 "user rejected the request" error code, emitted by browser
/// wallets when the signature prompt is dismissed.
const USER_REJECTED_REQUEST: i64 = 4001;

/// Terminal failure of a deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// The signer's balance is zero; nothing was attempted.
    #[error("Insufficient balance. Please add STT tokens to your wallet.")]
    InsufficientFunds,
    /// The compiler rejected the source. The payload is the compiler's own
    /// error text, unmodified.
    #[error("Compilation failed: {0}")]
    CompilationFailed(String),
    /// The user declined the signature request.
    #[error("Signature request was rejected in the wallet.")]
    SignatureRejected,
    /// Gas estimation or gas accounting failed upstream.
    #[error("Gas estimation failed. The contract may have issues or the network is congested.")]
    GasEstimationFailed,
    /// The creation transaction reverted on chain.
    #[error("Transaction reverted. Check your contract code for errors.")]
    TransactionReverted,
    /// The RPC endpoint was unreachable or misbehaved at the transport
    /// level.
    #[error("Network error. Please check your connection and try again.")]
    NetworkError,
    /// No receipt arrived within the confirmation bound. The transaction
    /// may still confirm later; no reconciliation is attempted.
    #[error("Deployment timed out waiting for confirmation. The transaction may still confirm on chain.")]
    Timeout,
    /// Unclassified upstream error, raw message preserved.
    #[error("{0}")]
    Unknown(String),
}

impl DeployError {
    /// Classifies a JSON-RPC layer error.
    ///
    /// Structured error codes are preferred; substring matching on the
    /// message is the fallback for responses lacking a useful code.
    pub fn from_rpc(err: &RpcError<TransportErrorKind>) -> Self {
        if let Some(payload) = err.as_error_resp() {
            if payload.code == USER_REJECTED_REQUEST {
                return Self::SignatureRejected;
            }
            return Self::from_message(payload.message.as_ref());
        }
        if matches!(err, RpcError::Transport(_)) {
            return Self::NetworkError;
        }
        Self::from_message(&err.to_string())
    }

    /// Substring classification, mirroring the phrasing rules the
    /// playground UI has always applied.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
            Self::InsufficientFunds
        } else if lower.contains("user rejected") || lower.contains("user denied") {
            Self::SignatureRejected
        } else if lower.contains("revert") {
            Self::TransactionReverted
        } else if lower.contains("gas") {
            Self::GasEstimationFailed
        } else if lower.contains("network") || lower.contains("connection") {
            Self::NetworkError
        } else {
            Self::Unknown(message.to_string())
        }
    }
}

impl From<crate::gas::InvalidBytecode> for DeployError {
    fn from(err: crate::gas::InvalidBytecode) -> Self {
        // Malformed bytecode is a terminal precondition failure, not a
        // retryable chain error.
        Self::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use alloy_json_rpc::ErrorPayload;

    use super::*;

    fn rpc_error(code: i64, message: &str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.to_string().into(),
            data: None,
        })
    }

    #[test]
    fn structured_rejection_code_wins() {
        // EIP-1193 4001 is a rejection even if the message says nothing.
        let err = rpc_error(4001, "request failed");
        assert_eq!(DeployError::from_rpc(&err), DeployError::SignatureRejected);
    }

    #[test]
    fn insufficient_funds_is_classified_from_message() {
        let err = rpc_error(-32000, "insufficient funds for gas * price + value");
        assert_eq!(DeployError::from_rpc(&err), DeployError::InsufficientFunds);
    }

    #[test]
    fn revert_takes_precedence_over_gas() {
        // "out of gas" style reverts mention both words; revert wins, as
        // it did in the original phrasing rules.
        assert_eq!(
            DeployError::from_message("execution reverted: out of gas"),
            DeployError::TransactionReverted
        );
        assert_eq!(
            DeployError::from_message("intrinsic gas too low"),
            DeployError::GasEstimationFailed
        );
    }

    #[test]
    fn unmatched_messages_keep_the_raw_text() {
        let raw = "some very specific upstream failure";
        match DeployError::from_message(raw) {
            DeployError::Unknown(msg) => assert_eq!(msg, raw),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn compiler_text_is_preserved_verbatim() {
        let err = DeployError::CompilationFailed("X".to_string());
        assert!(err.to_string().contains('X'));
    }
}
