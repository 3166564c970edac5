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

//! Server assembly: shared state, router, serve loop.

use std::{
    net::SocketAddr,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use eyre::Result;
use playground_common::PlaygroundConfig;
use playground_engine::{Compile, Registrar, SolcCompiler};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{assistant::GeminiClient, routes};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration.
    pub config: Arc<PlaygroundConfig>,
    /// The Solidity compiler behind `/api/compile` and `/api/deploy`.
    pub compiler: Arc<dyn Compile + Send + Sync>,
    /// Registry submitter backed by the treasury key.
    pub registrar: Arc<Registrar>,
    /// Gemini client; `None` when no API key is configured.
    pub assistant: Option<Arc<GeminiClient>>,
    /// Unix timestamp the server was assembled, for uptime reporting.
    pub started_at: u64,
}

/// The playground HTTP server.
pub struct PlaygroundServer {
    state: AppState,
}

impl PlaygroundServer {
    /// Assembles the server from startup configuration.
    pub fn new(config: PlaygroundConfig) -> Self {
        let registrar = Arc::new(Registrar::new(&config));
        let assistant = GeminiClient::from_config(&config).map(Arc::new);
        let started_at =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        Self {
            state: AppState {
                config: Arc::new(config),
                compiler: Arc::new(SolcCompiler::new()),
                registrar,
                assistant,
                started_at,
            },
        }
    }

    /// Builds the router with all playground routes and an open CORS
    /// layer; the browser frontend is served from a different origin.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/compile", post(routes::compile))
            .route("/api/deploy", post(routes::deploy))
            .route("/api/register", post(routes::register))
            .route("/api/assistant", post(routes::assistant))
            .route("/api/models", get(routes::models))
            .route("/health", get(routes::health))
            .layer(
                CorsLayer::new()
                    .allow_methods([Method::POST, Method::GET])
                    .allow_headers(Any)
                    .allow_origin(Any),
            )
            .with_state(self.state.clone())
    }

    /// Binds `addr` and serves until the task is cancelled.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let app = self.router();
        let listener = TcpListener::bind(addr).await?;
        info!("Somnia Playground API listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
