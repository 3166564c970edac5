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

//! Gemini-backed playground assistant.
//!
//! The assistant answers questions about Somnia and the contract open
//! in the editor. Prompts are assembled server side from a small set of
//! Somnia doc sections selected by keyword relevance, so the model gets
//! grounding without shipping the whole doc set on every request.

use playground_common::PlaygroundConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Model used for chat completions.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Production Gemini API base.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A titled doc section with the keywords that make it relevant.
struct DocSection {
    title: &'static str,
    keywords: &'static [&'static str],
    content: &'static str,
}

/// Somnia reference material fed to the model.
const SOMNIA_DOCS: &[DocSection] = &[
    DocSection {
        title: "Somnia Network Overview",
        keywords: &["somnia", "network", "chain", "what is"],
        content: "Somnia is a high-throughput EVM-compatible Layer 1. The playground \
                  targets the Somnia Testnet (chain id 50312, currency STT) at \
                  https://dream-rpc.somnia.network, with the Shannon explorer at \
                  https://shannon-explorer.somnia.network.",
    },
    DocSection {
        title: "Deploying Contracts",
        keywords: &["deploy", "deployment", "gas", "estimate", "limit"],
        content: "Deployment on Somnia costs noticeably more gas per bytecode byte than \
                  generic EVM estimators assume. The playground budgets roughly 3125 gas \
                  per byte plus a fixed overhead and a 50% safety buffer, and inflates \
                  any live estimate by 50% before use. Transactions use EIP-1559 fees \
                  (2 gwei priority, 50 gwei max).",
    },
    DocSection {
        title: "Test Tokens",
        keywords: &["faucet", "stt", "token", "balance", "funds"],
        content: "STT test tokens are available from the Somnia testnet faucet. A wallet \
                  with zero STT cannot deploy; the playground checks the balance before \
                  compiling.",
    },
    DocSection {
        title: "Solidity in the Playground",
        keywords: &["solidity", "compile", "pragma", "error", "abi"],
        content: "The playground compiles a single-file contract with the optimizer \
                  enabled (200 runs). The solc version is taken from the pragma. \
                  Compiler diagnostics are shown verbatim in the editor.",
    },
    DocSection {
        title: "Deployment Registry",
        keywords: &["registry", "register", "record"],
        content: "Successful deployments are recorded best-effort in an on-chain registry \
                  via registerDeployment(address,string), signed by the playground \
                  treasury. Registration failures never fail a deployment.",
    },
];

/// Why an assistant request failed.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The HTTP request itself failed.
    #[error("Failed to reach the Gemini API: {0}")]
    Http(#[from] reqwest::Error),
    /// Gemini answered with a non-success status.
    #[error("Gemini API error ({status}): {body}")]
    Upstream {
        /// HTTP status returned by the API.
        status: u16,
        /// Response body, truncated upstream text.
        body: String,
    },
    /// The response carried no candidate text.
    #[error("Gemini returned no response text")]
    EmptyResponse,
}

/// Minimal Gemini REST client.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the given key, optionally overriding the
    /// API base (used by tests).
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.unwrap_or(DEFAULT_API_BASE).trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client from configuration; `None` without an API key.
    pub fn from_config(config: &PlaygroundConfig) -> Option<Self> {
        config
            .gemini_api_key
            .as_deref()
            .map(|key| Self::new(key, config.gemini_api_base.as_deref()))
    }

    /// Sends one chat turn and returns the model's text.
    pub async fn chat(
        &self,
        message: &str,
        contract_code: Option<&str>,
    ) -> Result<String, AssistantError> {
        let prompt = build_prompt(message, contract_code);
        debug!(model = GEMINI_MODEL, prompt_len = prompt.len(), "sending assistant request");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );
        let response = self
            .http
            .post(&url)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.first_text().ok_or(AssistantError::EmptyResponse)
    }

    /// Lists the model names available to the configured key.
    pub async fn list_models(&self) -> Result<Vec<String>, AssistantError> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream { status: status.as_u16(), body });
        }

        let parsed: ListModelsResponse = response.json().await?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Assembles the system prompt: role, relevant docs, optional editor
/// contract, then the question.
fn build_prompt(message: &str, contract_code: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are the Somnia Playground assistant. You help developers write, debug and \
         deploy Solidity contracts on the Somnia testnet. Answer concisely and \
         practically.\n\nRelevant Somnia documentation:\n",
    );
    for section in relevant_docs(message) {
        prompt.push_str("\n## ");
        prompt.push_str(section.title);
        prompt.push('\n');
        prompt.push_str(section.content);
        prompt.push('\n');
    }
    if let Some(code) = contract_code {
        prompt.push_str("\nThe user's current contract:\n```solidity\n");
        prompt.push_str(code);
        prompt.push_str("\n```\n");
    }
    prompt.push_str("\nUser question: ");
    prompt.push_str(message);
    prompt
}

/// Doc sections whose keywords appear in the message; falls back to the
/// overview so the model always has some grounding.
fn relevant_docs(message: &str) -> Vec<&'static DocSection> {
    let lower = message.to_lowercase();
    let matched: Vec<_> = SOMNIA_DOCS
        .iter()
        .filter(|section| section.keywords.iter().any(|k| lower.contains(k)))
        .collect();
    if matched.is_empty() {
        vec![&SOMNIA_DOCS[0]]
    } else {
        matched
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}
