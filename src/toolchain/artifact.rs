//! Compiled contract artifacts (ABI + creation bytecode).

use alloy::hex;
use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use std::path::{Path, PathBuf};

use crate::toolchain::solc::ArtifactPaths;
use crate::toolchain::CompileError;

/// ABI and bytecode of one contract, read from the same build directory.
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    pub paths: ArtifactPaths,
}

impl CompiledArtifact {
    /// Read and parse the `.abi` / `.bin` pair.
    ///
    /// The contract name is taken from the ABI file stem.
    pub async fn load(paths: &ArtifactPaths) -> Result<Self, CompileError> {
        let abi_json = read(&paths.abi).await?;
        let bin_hex = read(&paths.bin).await?;

        let name = paths
            .abi
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let abi = parse_abi(&paths.abi, &abi_json)?;
        let bytecode = parse_bytecode(&paths.bin, &bin_hex)?;

        tracing::debug!(
            contract = %name,
            functions = abi.functions.len(),
            bytecode_len = bytecode.len(),
            "Loaded compiled artifact"
        );

        Ok(Self {
            name,
            abi,
            bytecode,
            paths: paths.clone(),
        })
    }

    /// Build an artifact from in-memory ABI JSON and bytecode hex.
    pub fn from_parts(name: &str, abi_json: &str, bin_hex: &str) -> Result<Self, CompileError> {
        let paths = ArtifactPaths::in_dir(Path::new(""), name);
        Ok(Self {
            name: name.to_string(),
            abi: parse_abi(&paths.abi, abi_json)?,
            bytecode: parse_bytecode(&paths.bin, bin_hex)?,
            paths,
        })
    }
}

async fn read(path: &Path) -> Result<String, CompileError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_abi(path: &Path, json: &str) -> Result<JsonAbi, CompileError> {
    serde_json::from_str(json).map_err(|source| CompileError::InvalidAbi {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_bytecode(path: &Path, text: &str) -> Result<Bytes, CompileError> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    if digits.is_empty() {
        return Err(CompileError::EmptyBytecode(PathBuf::from(path)));
    }
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| CompileError::InvalidBytecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
