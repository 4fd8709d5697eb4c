//! Contract toolchain subsystem.
//!
//! # Data Flow
//! ```text
//! contracts/Lottery.sol
//!     → solc.rs (solc --abi, solc --bin)
//!     → build/Lottery.abi + build/Lottery.bin
//!     → artifact.rs (parse into CompiledArtifact)
//!     → binding.rs (alloy sol! binding source file)
//! ```
//!
//! # Design Decisions
//! - The compiler is an external process; its failures are returned, not fatal
//! - Artifacts are re-read from disk so ABI and bytecode come from one build dir
//! - Nothing here retries or resumes a partial build

pub mod artifact;
pub mod binding;
pub mod solc;

use std::path::PathBuf;
use thiserror::Error;

pub use artifact::CompiledArtifact;
pub use binding::generate_binding;
pub use solc::{ArtifactPaths, ContractSource, OutputKind, Solc};

/// Errors produced while compiling a contract or generating its binding.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The external program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran but reported failure.
    #[error("{program} exited with {}: {stderr}", exit_description(.status))]
    Failed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The compiler succeeded but the expected file is not there.
    #[error("expected output {0} was not produced")]
    MissingOutput(PathBuf),

    /// Reading or writing an artifact failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ABI file is not valid JSON ABI.
    #[error("invalid ABI in {path}: {source}")]
    InvalidAbi {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Bytecode file is not valid hex.
    #[error("invalid bytecode in {path}: {reason}")]
    InvalidBytecode { path: PathBuf, reason: String },

    /// Bytecode file holds no code.
    #[error("bytecode in {0} is empty")]
    EmptyBytecode(PathBuf),

    /// Binding module name is not a Rust identifier.
    #[error("invalid binding module name '{0}'")]
    InvalidModuleName(String),
}

fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}
