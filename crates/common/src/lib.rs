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

//! Shared building blocks for the Somnia Playground backend.
//!
//! This crate owns the pieces every other playground crate leans on:
//! process-wide configuration ([`PlaygroundConfig`]), the Somnia network
//! profile, environment variable name constants, and logging setup.

pub mod config;
pub mod env;
pub mod logging;

pub use config::{
    validate_registry_address, NetworkProfile, PlaygroundConfig, RegistryAddressError,
    REGISTRY_ADDRESS_PLACEHOLDER, SOMNIA_TESTNET,
};
pub use logging::{ensure_test_logging, init_logging};
