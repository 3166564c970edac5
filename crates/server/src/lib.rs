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

//! HTTP API for the Somnia Playground.
//!
//! A thin axum layer over [`playground_engine`]: JSON endpoints for
//! compiling Solidity source, deploying with a caller-supplied key,
//! registering deployments via the server-held treasury key, and
//! proxying assistant prompts to the Gemini API.

pub mod assistant;
pub mod routes;
pub mod server;

pub use server::{AppState, PlaygroundServer};
