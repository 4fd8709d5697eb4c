//! Solidity compiler invocation.
//!
//! `solc` is run once per requested output (ABI, then binary), each time with
//! `--overwrite` and `-o <out_dir>`, mirroring a plain command-line build.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::toolchain::CompileError;

/// A Solidity source file and the contract it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSource {
    pub path: PathBuf,
    pub name: String,
}

impl ContractSource {
    /// Contract named after the file stem (`contracts/Lottery.sol` → `Lottery`).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    /// Override the contract name when it differs from the file stem.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Output requested from one compiler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Abi,
    Bin,
}

impl OutputKind {
    fn flag(self) -> &'static str {
        match self {
            OutputKind::Abi => "--abi",
            OutputKind::Bin => "--bin",
        }
    }

    /// File extension `solc` uses for this output.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Abi => "abi",
            OutputKind::Bin => "bin",
        }
    }
}

/// Paths of the two files one contract build produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub abi: PathBuf,
    pub bin: PathBuf,
}

impl ArtifactPaths {
    /// Where `solc -o out_dir` writes the outputs of `contract`.
    pub fn in_dir(out_dir: &Path, contract: &str) -> Self {
        Self {
            abi: out_dir.join(format!("{}.{}", contract, OutputKind::Abi.extension())),
            bin: out_dir.join(format!("{}.{}", contract, OutputKind::Bin.extension())),
        }
    }
}

/// Handle on a `solc` executable.
#[derive(Debug, Clone)]
pub struct Solc {
    program: PathBuf,
    /// Arguments placed before the solc flags (e.g. a wrapper script).
    leading_args: Vec<OsString>,
    optimize: bool,
}

impl Solc {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            optimize: true,
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn optimize(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    /// Compile the ABI and then the binary of `source` into `out_dir`.
    pub async fn compile_contract(
        &self,
        source: &ContractSource,
        out_dir: &Path,
    ) -> Result<ArtifactPaths, CompileError> {
        let abi = self.emit(OutputKind::Abi, source, out_dir).await?;
        let bin = self.emit(OutputKind::Bin, source, out_dir).await?;
        Ok(ArtifactPaths { abi, bin })
    }

    /// Run the compiler once for a single output kind.
    pub async fn emit(
        &self,
        kind: OutputKind,
        source: &ContractSource,
        out_dir: &Path,
    ) -> Result<PathBuf, CompileError> {
        let args = self.arguments(kind, &source.path, out_dir);
        let program = self.program.display().to_string();

        tracing::debug!(program = %program, ?args, "Running compiler");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| CompileError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                program,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let expected = out_dir.join(format!("{}.{}", source.name, kind.extension()));
        if !expected.is_file() {
            return Err(CompileError::MissingOutput(expected));
        }

        tracing::info!(output = %expected.display(), "Compiler output written");
        Ok(expected)
    }

    fn arguments(&self, kind: OutputKind, source: &Path, out_dir: &Path) -> Vec<OsString> {
        let mut args = self.leading_args.clone();
        if self.optimize {
            args.push("--optimize".into());
        }
        args.push(kind.flag().into());
        args.push("--overwrite".into());
        args.push(source.as_os_str().to_owned());
        args.push("-o".into());
        args.push(out_dir.as_os_str().to_owned());
        args
    }
}
