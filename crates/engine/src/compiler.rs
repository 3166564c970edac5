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

//! Local Solidity compilation.
//!
//! Sources arrive as a single editor buffer. Compilation runs against an
//! svm-managed solc binary matching the source's pragma, with the
//! optimizer enabled at 200 runs. Compiler diagnostics of error severity
//! are surfaced verbatim; the playground never reinterprets them.

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use foundry_compilers::{
    artifacts::{output_selection::OutputSelection, Settings, SolcInput, Source, Sources},
    solc::{Solc, SolcLanguage},
};
use semver::Version;
use serde::Serialize;
use solang_parser::pt::{ContractTy, SourceUnitPart};
use tracing::{debug, trace};

use crate::{
    error::DeployError,
    gas::{creation_byte_len, InvalidBytecode},
};

/// Virtual file name the editor buffer is compiled under.
const SOURCE_FILE: &str = "contract.sol";

/// Optimizer runs, matching the playground's historical compile settings.
const OPTIMIZER_RUNS: usize = 200;

/// Output of a successful compilation, consumed once per deployment
/// attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CompilationArtifact {
    /// Logical name of the compiled contract.
    pub contract_name: String,
    /// The contract's JSON ABI.
    pub abi: JsonAbi,
    /// `0x`-prefixed creation bytecode. Invariant: well-formed, even
    /// length, non-empty.
    pub bytecode: String,
}

impl CompilationArtifact {
    /// Decodes the creation bytecode, failing fast on malformed hex.
    pub fn bytecode_bytes(&self) -> Result<Bytes, InvalidBytecode> {
        creation_byte_len(&self.bytecode)?;
        self.bytecode.parse().map_err(|_| InvalidBytecode::NonHex)
    }
}

/// Seam between the deployment orchestrator and whatever turns source
/// text into an artifact. Lets tests observe that the compiler is never
/// reached on precondition failures.
pub trait Compile {
    /// Compiles `source`, resolving the contract name from the source
    /// itself when possible and from `contract_name` otherwise.
    fn compile(
        &self,
        source: &str,
        contract_name: Option<&str>,
    ) -> Result<CompilationArtifact, DeployError>;
}

/// Compiles with an svm-managed solc binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolcCompiler;

impl SolcCompiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self
    }
}

impl Compile for SolcCompiler {
    fn compile(
        &self,
        source: &str,
        contract_name: Option<&str>,
    ) -> Result<CompilationArtifact, DeployError> {
        // Cheap sanity checks before a compiler is even resolved.
        if !source.contains("pragma solidity") || !source.contains("contract ") {
            return Err(DeployError::CompilationFailed(
                "Invalid Solidity contract: Missing pragma or contract declaration".to_string(),
            ));
        }

        // The name declared in the source wins over the caller's hint.
        let name = extract_contract_name(source)
            .or_else(|| contract_name.map(str::to_string))
            .unwrap_or_else(|| "Contract".to_string());

        let version = solc_version_from_pragma(source);
        debug!(contract = %name, solc = %version, "compiling editor buffer");

        let compiler = Solc::find_or_install(&version)
            .map_err(|e| DeployError::CompilationFailed(e.to_string()))?;

        let input = solc_input(source);
        trace!(solc = ?compiler, "using compiler");

        let output = compiler
            .compile_exact(&input)
            .map_err(|e| DeployError::CompilationFailed(e.to_string()))?;

        // Error-severity diagnostics abort the attempt; their text is the
        // compiler's, not ours.
        let errors: Vec<String> = output
            .errors
            .iter()
            .filter(|e| e.is_error())
            .map(|e| e.formatted_message.clone().unwrap_or_else(|| e.message.clone()))
            .collect();
        if !errors.is_empty() {
            return Err(DeployError::CompilationFailed(errors.join("\n")));
        }

        let contract = output
            .contracts
            .get(std::path::Path::new(SOURCE_FILE))
            .and_then(|file| file.get(&name))
            .ok_or_else(|| {
                DeployError::CompilationFailed(format!(
                    "Contract '{name}' not found in compilation output"
                ))
            })?;

        let bytecode = contract
            .evm
            .as_ref()
            .and_then(|evm| evm.bytecode.as_ref())
            .and_then(|code| code.object.as_bytes())
            .map(|bytes| bytes.to_string());

        let bytecode = match bytecode {
            Some(code) if code != "0x" => code,
            _ => {
                return Err(DeployError::CompilationFailed(
                    "No bytecode generated - contract may be abstract or have compilation issues"
                        .to_string(),
                ))
            }
        };

        Ok(CompilationArtifact {
            contract_name: name,
            abi: contract.abi.clone().unwrap_or_default(),
            bytecode,
        })
    }
}

/// Assembles the standard-JSON input for the single editor buffer.
fn solc_input(source: &str) -> SolcInput {
    let mut settings = Settings::default();
    settings.optimizer.enabled = Some(true);
    settings.optimizer.runs = Some(OPTIMIZER_RUNS);
    settings.output_selection = OutputSelection::default_output_selection();

    let sources: Sources =
        [(SOURCE_FILE.into(), Source::new(source))].into_iter().collect();

    SolcInput::new(SolcLanguage::Solidity, sources, settings)
}

/// Name of the contract to deploy, parsed from the source.
///
/// The last concrete contract wins; interfaces, libraries and abstract
/// contracts are only used when nothing concrete is declared. Returns
/// `None` when the source does not parse (the compiler will produce the
/// real diagnostics).
pub fn extract_contract_name(source: &str) -> Option<String> {
    let (unit, _comments) = solang_parser::parse(source, 0).ok()?;

    let mut concrete = None;
    let mut fallback = None;
    for part in unit.0 {
        if let SourceUnitPart::ContractDefinition(def) = part {
            let Some(name) = def.name.as_ref().map(|id| id.name.clone()) else { continue };
            match def.ty {
                ContractTy::Contract(_) => concrete = Some(name),
                _ => fallback = Some(name),
            }
        }
    }
    concrete.or(fallback)
}

/// Picks a solc version from the first `pragma solidity` directive.
///
/// The lowest version named in the constraint is installed; sources
/// without a parseable constraint get the default toolchain.
fn solc_version_from_pragma(source: &str) -> Version {
    for line in source.lines() {
        let Some(rest) = line.trim().strip_prefix("pragma solidity") else { continue };
        let rest = rest.trim().trim_end_matches(';');

        let mut digits = String::new();
        for ch in rest.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                digits.push(ch);
            } else if !digits.is_empty() {
                break;
            }
        }
        let digits = digits.trim_matches('.');
        if let Ok(version) = Version::parse(digits) {
            return version;
        }
        // Two-component constraints like "0.8" mean "0.8.0" here.
        if let Ok(version) = Version::parse(&format!("{digits}.0")) {
            return version;
        }
    }
    default_solc_version()
}

fn default_solc_version() -> Version {
    Version::new(0, 8, 30)
}
