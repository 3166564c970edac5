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

//! Endpoint tests against a server bound to an ephemeral port.

use playground_common::{PlaygroundConfig, SOMNIA_TESTNET};
use playground_server::PlaygroundServer;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn base_config() -> PlaygroundConfig {
    PlaygroundConfig {
        rpc_url: SOMNIA_TESTNET.rpc_url.to_string(),
        registry_address: None,
        treasury_private_key: None,
        gemini_api_key: None,
        gemini_api_base: None,
        network: SOMNIA_TESTNET,
    }
}

/// Binds the server to an ephemeral port and returns its base URL.
async fn spawn_server(config: PlaygroundConfig) -> String {
    let server = PlaygroundServer::new(config);
    let app = server.router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn post(base: &str, route: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}{route}"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = response.status().as_u16();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn health_reports_liveness() {
    let base = spawn_server(base_config()).await;
    let response = reqwest::get(format!("{base}/health")).await.expect("request");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.expect("json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "playground-server");
    assert!(body["uptime"].is_u64());
}

#[tokio::test]
async fn compile_requires_source() {
    let base = spawn_server(base_config()).await;
    let (status, body) = post(&base, "/api/compile", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing source code");

    let (status, body) = post(&base, "/api/compile", json!({ "source": "   " })).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn compile_rejects_non_contracts_inline() {
    let base = spawn_server(base_config()).await;
    // No pragma, no contract: rejected before solc is ever resolved, and
    // reported as an editor-level failure, not an HTTP error.
    let (status, body) = post(&base, "/api/compile", json!({ "source": "hello world" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .expect("error text")
        .contains("Missing pragma or contract declaration"));
}

#[tokio::test]
async fn deploy_validates_the_request() {
    let base = spawn_server(base_config()).await;

    let (status, body) = post(&base, "/api/deploy", json!({ "abi": [] })).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing bytecode or ABI");

    let (status, body) =
        post(&base, "/api/deploy", json!({ "bytecode": "0x6080", "abi": [] })).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing private key");

    let (status, body) = post(
        &base,
        "/api/deploy",
        json!({ "bytecode": "0x6080", "abi": [], "privateKey": "0x1234" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid private key format");
}

#[tokio::test]
async fn register_validates_the_contract_address() {
    let base = spawn_server(base_config()).await;

    let (status, body) = post(&base, "/api/register", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing contract address");

    let (status, body) =
        post(&base, "/api/register", json!({ "contractAddress": "not-an-address" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid contract address");
}

#[tokio::test]
async fn register_rejects_an_unconfigured_registry() {
    let base = spawn_server(base_config()).await;
    let (status, body) = post(
        &base,
        "/api/register",
        json!({ "contractAddress": "0x2222222222222222222222222222222222222222" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Registry address not configured");
}

#[tokio::test]
async fn register_rejects_the_placeholder_registry() {
    let config = PlaygroundConfig {
        registry_address: Some("0xREGISTRY_ADDRESS_FROM_DEPLOY".to_string()),
        ..base_config()
    };
    let base = spawn_server(config).await;
    let (status, body) = post(
        &base,
        "/api/register",
        json!({ "contractAddress": "0x2222222222222222222222222222222222222222" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().expect("error").contains("not deployed yet"));
}

#[tokio::test]
async fn register_without_a_treasury_key_is_a_server_error() {
    let config = PlaygroundConfig {
        registry_address: Some("0x4444444444444444444444444444444444444444".to_string()),
        ..base_config()
    };
    let base = spawn_server(config).await;
    let (status, body) = post(
        &base,
        "/api/register",
        json!({ "contractAddress": "0x2222222222222222222222222222222222222222" }),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Server signer key not configured");
}

#[tokio::test]
async fn assistant_requires_a_message_and_a_key() {
    let base = spawn_server(base_config()).await;

    let (status, body) = post(&base, "/api/assistant", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Message is required");
    // Assistant failures keep the bare error shape.
    assert!(body.get("success").is_none());

    let (status, body) = post(&base, "/api/assistant", json!({ "message": "hi" })).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Gemini API key not configured");
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn assistant_proxies_gemini_responses() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Use the faucet." }] } }]
        })))
        .mount(&gemini)
        .await;

    let config = PlaygroundConfig {
        gemini_api_key: Some("test-key".to_string()),
        gemini_api_base: Some(gemini.uri()),
        ..base_config()
    };
    let base = spawn_server(config).await;

    let (status, body) =
        post(&base, "/api/assistant", json!({ "message": "where do I get STT?" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], "Use the faucet.");
}

#[tokio::test]
async fn assistant_surfaces_upstream_failures() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&gemini)
        .await;

    let config = PlaygroundConfig {
        gemini_api_key: Some("test-key".to_string()),
        gemini_api_base: Some(gemini.uri()),
        ..base_config()
    };
    let base = spawn_server(config).await;

    let (status, body) = post(&base, "/api/assistant", json!({ "message": "hi" })).await;
    assert_eq!(status, 500);
    assert!(body["error"].as_str().expect("error").contains("429"));
}

#[tokio::test]
async fn models_lists_what_the_key_can_use() {
    let gemini = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "models/gemini-2.0-flash" },
                { "name": "models/gemini-2.0-flash-lite" },
            ]
        })))
        .mount(&gemini)
        .await;

    let config = PlaygroundConfig {
        gemini_api_key: Some("test-key".to_string()),
        gemini_api_base: Some(gemini.uri()),
        ..base_config()
    };
    let base = spawn_server(config).await;

    let response =
        reqwest::get(format!("{base}/api/models")).await.expect("request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["models"][0], "models/gemini-2.0-flash");
}
