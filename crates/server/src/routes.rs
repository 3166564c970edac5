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

//! Request handlers and JSON shapes for the playground API.
//!
//! All bodies are JSON. Failures on the compile, deploy and register
//! flows carry `{success: false, error}`: validation problems are HTTP
//! 400, configuration gaps on the server side are 500. The assistant
//! endpoints keep their historical plain `{error}` shape. Compilation
//! failures are not HTTP errors: the editor renders them inline, so
//! they come back as 200 with `success: false`.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_json_abi::JsonAbi;
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use axum::{extract::State, http::StatusCode, response::Json};
use playground_engine::{CompilationArtifact, DeployError, Deployer, RegisterError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::server::AppState;

/// Body of `POST /api/compile`. `code` is a legacy alias for `source`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    /// Solidity source text.
    pub source: Option<String>,
    /// Legacy alias for `source`.
    pub code: Option<String>,
    /// Optional contract name hint.
    pub contract_name: Option<String>,
}

/// Body of `POST /api/deploy` (server-key path).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    /// `0x`-prefixed creation bytecode.
    pub bytecode: Option<String>,
    /// Contract ABI as JSON.
    pub abi: Option<Value>,
    /// Deployer private key, `0x` plus 64 hex digits.
    pub private_key: Option<String>,
    /// Optional contract name for registry metadata and logs.
    pub contract_name: Option<String>,
}

/// Body of `POST /api/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Address of the deployed contract to record.
    #[serde(rename = "contractAddress")]
    pub contract_address: Option<String>,
    /// Optional metadata URI; defaults to the playground tag.
    #[serde(rename = "metadataURI")]
    pub metadata_uri: Option<String>,
}

/// Body of `POST /api/assistant`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    /// The user's question.
    pub message: Option<String>,
    /// Contract currently open in the editor, for context.
    pub contract_code: Option<String>,
}

type ApiResponse = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ApiResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "success": false, "error": message })))
}

fn server_error(message: &str) -> ApiResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "success": false, "error": message })))
}

/// Failure shape for the assistant endpoints, which answer a bare
/// `error` field without the `success` discriminator.
fn assistant_error(status: StatusCode, message: &str) -> ApiResponse {
    (status, Json(json!({ "error": message })))
}

/// `POST /api/compile`: compile the editor buffer.
pub async fn compile(
    State(state): State<AppState>,
    Json(req): Json<CompileRequest>,
) -> ApiResponse {
    let Some(source) = req.source.or(req.code).filter(|s| !s.trim().is_empty()) else {
        return bad_request("Missing source code");
    };

    // solc runs synchronously and may install a toolchain on first use.
    let compiler = state.compiler.clone();
    let name = req.contract_name.clone();
    let compiled =
        tokio::task::spawn_blocking(move || compiler.compile(&source, name.as_deref())).await;

    match compiled {
        Ok(Ok(artifact)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "contractName": artifact.contract_name,
                "abi": artifact.abi,
                "bytecode": artifact.bytecode,
                "message": "Compilation successful",
            })),
        ),
        Ok(Err(e)) => {
            info!(error = %e, "compilation rejected");
            (StatusCode::OK, Json(json!({ "success": false, "error": e.to_string() })))
        }
        Err(e) => {
            error!(error = %e, "compiler task panicked");
            server_error("Internal compiler error")
        }
    }
}

/// `POST /api/deploy`: deploy a pre-compiled artifact with the
/// caller-supplied key. The key is used for this one request and never
/// stored.
pub async fn deploy(State(state): State<AppState>, Json(req): Json<DeployRequest>) -> ApiResponse {
    let (Some(bytecode), Some(abi)) = (req.bytecode, req.abi) else {
        return bad_request("Missing bytecode or ABI");
    };
    let Some(key) = req.private_key else {
        return bad_request("Missing private key");
    };
    if !valid_private_key(&key) {
        return bad_request("Invalid private key format");
    }
    let Ok(signer) = key.parse::<PrivateKeySigner>() else {
        return bad_request("Invalid private key format");
    };
    let abi: JsonAbi = match serde_json::from_value(abi) {
        Ok(abi) => abi,
        Err(_) => return bad_request("Invalid ABI"),
    };

    let from = signer.address();
    let provider = match ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect(&state.config.rpc_url)
        .await
    {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "failed to connect to RPC endpoint");
            return server_error(&DeployError::NetworkError.to_string());
        }
    };

    let artifact = CompilationArtifact {
        contract_name: req.contract_name.unwrap_or_else(|| "Contract".to_string()),
        abi,
        bytecode,
    };

    let deployer = Deployer::new(provider, from);
    match deployer.deploy_artifact(&artifact, Some(&state.registrar)).await {
        Ok(deployment) => {
            let network = &state.config.network;
            let mut body = json!({
                "success": true,
                "contractAddress": deployment.contract_address.to_string(),
                "transactionHash": deployment.transaction_hash.to_string(),
                "deployerAddress": deployment.deployer.to_string(),
                "networkInfo": {
                    "chainId": network.chain_id,
                    "networkName": network.name,
                    "symbol": network.symbol,
                    "explorerUrl": network.explorer_url,
                    "contractUrl": network.address_explorer_url(deployment.contract_address),
                    "txUrl": network.tx_explorer_url(deployment.transaction_hash),
                },
            });
            if let Some(tx) = deployment.registry_tx_hash {
                body["registryTxHash"] = json!(tx.to_string());
            }
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            warn!(error = %e, "deployment failed");
            (deploy_error_status(&e), Json(json!({ "success": false, "error": e.to_string() })))
        }
    }
}

/// `POST /api/register`: record a deployment in the on-chain registry,
/// signed by the server's treasury key. Unlike the best-effort call in
/// the deploy flow, failures here are surfaced to the caller.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResponse {
    let Some(raw) = req.contract_address else {
        return bad_request("Missing contract address");
    };
    let Ok(contract) = raw.parse::<Address>() else {
        return bad_request("Invalid contract address");
    };

    match state.registrar.submit(contract, req.metadata_uri.as_deref()).await {
        Ok(tx_hash) => {
            (StatusCode::OK, Json(json!({ "success": true, "txHash": tx_hash.to_string() })))
        }
        Err(
            e @ (RegisterError::AddressMissing
            | RegisterError::AddressPlaceholder
            | RegisterError::AddressInvalid(_)),
        ) => bad_request(&e.to_string()),
        Err(e) => {
            warn!(error = %e, contract = %contract, "registration failed");
            server_error(&e.to_string())
        }
    }
}

/// `POST /api/assistant`: proxy a question to Gemini with Somnia docs
/// context.
pub async fn assistant(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> ApiResponse {
    let Some(message) = req.message.filter(|m| !m.trim().is_empty()) else {
        return assistant_error(StatusCode::BAD_REQUEST, "Message is required");
    };
    let Some(client) = state.assistant else {
        return assistant_error(StatusCode::INTERNAL_SERVER_ERROR, "Gemini API key not configured");
    };

    match client.chat(&message, req.contract_code.as_deref()).await {
        Ok(text) => (StatusCode::OK, Json(json!({ "success": true, "response": text }))),
        Err(e) => {
            error!(error = %e, "assistant request failed");
            assistant_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// `GET /api/models`: list the Gemini models available to the
/// configured key.
pub async fn models(State(state): State<AppState>) -> ApiResponse {
    let Some(client) = state.assistant else {
        return assistant_error(StatusCode::INTERNAL_SERVER_ERROR, "Gemini API key not configured");
    };
    match client.list_models().await {
        Ok(names) => (StatusCode::OK, Json(json!({ "models": names }))),
        Err(e) => {
            error!(error = %e, "model listing failed");
            assistant_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// `GET /health`: liveness and uptime.
pub async fn health(State(state): State<AppState>) -> ApiResponse {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "playground-server",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": now.saturating_sub(state.started_at),
            "timestamp": now,
        })),
    )
}

/// `0x` followed by exactly 64 hex digits.
fn valid_private_key(key: &str) -> bool {
    match key.strip_prefix("0x") {
        Some(hex) => hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

fn deploy_error_status(err: &DeployError) -> StatusCode {
    match err {
        DeployError::InsufficientFunds
        | DeployError::CompilationFailed(_)
        | DeployError::SignatureRejected => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_bodies_carry_the_success_discriminator() {
        let (status, Json(body)) = bad_request("nope");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "nope");

        let (status, Json(body)) = server_error("broken");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "broken");

        // The assistant shape stays a bare error field.
        let (_, Json(body)) = assistant_error(StatusCode::INTERNAL_SERVER_ERROR, "down");
        assert_eq!(body["error"], "down");
        assert!(body.get("success").is_none());
    }

    #[test]
    fn private_key_format() {
        assert!(valid_private_key(&format!("0x{}", "a1".repeat(32))));
        assert!(!valid_private_key(&"a1".repeat(33)));
        assert!(!valid_private_key("0x1234"));
        assert!(!valid_private_key(&format!("0x{}", "zz".repeat(32))));
        assert!(!valid_private_key(""));
    }

    #[test]
    fn deploy_errors_map_to_statuses() {
        assert_eq!(
            deploy_error_status(&DeployError::InsufficientFunds),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            deploy_error_status(&DeployError::Timeout),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            deploy_error_status(&DeployError::NetworkError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
