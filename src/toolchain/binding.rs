//! Rust binding generation from a compiled artifact.
//!
//! The generated file holds an `alloy::sol!` interface derived from the ABI
//! (with `#[sol(rpc)]` so it exposes typed call builders) and the creation
//! bytecode as a constant, wrapped in a module named by the caller.

use alloy::hex;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::toolchain::artifact::CompiledArtifact;
use crate::toolchain::solc::ArtifactPaths;
use crate::toolchain::CompileError;

/// Generate the binding for the `.abi` / `.bin` pair and write it to `out_path`.
pub async fn generate_binding(
    abi_path: &Path,
    bin_path: &Path,
    module_name: &str,
    out_path: &Path,
) -> Result<PathBuf, CompileError> {
    let paths = ArtifactPaths {
        abi: abi_path.to_path_buf(),
        bin: bin_path.to_path_buf(),
    };
    let artifact = CompiledArtifact::load(&paths).await?;
    let source = render_binding(&artifact, module_name)?;

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CompileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(out_path, source)
        .await
        .map_err(|source| CompileError::Io {
            path: out_path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        contract = %artifact.name,
        module = module_name,
        output = %out_path.display(),
        "Binding generated"
    );
    Ok(out_path.to_path_buf())
}

/// Render the binding source for `artifact`.
pub fn render_binding(artifact: &CompiledArtifact, module_name: &str) -> Result<String, CompileError> {
    if !is_identifier(module_name) {
        return Err(CompileError::InvalidModuleName(module_name.to_string()));
    }

    let interface = artifact.abi.to_sol(&artifact.name, None);
    let header = format!("interface {} ", artifact.name);
    let interface = interface.replacen(&header, &format!("#[sol(rpc)]\n{}", header), 1);

    let mut out = String::new();
    // Infallible: writing into a String.
    let _ = writeln!(out, "// Code generated by lottery-deployer. DO NOT EDIT.");
    let _ = writeln!(out, "// ABI: {}", artifact.paths.abi.display());
    let _ = writeln!(out, "// Bytecode: {}", artifact.paths.bin.display());
    let _ = writeln!(out);
    let _ = writeln!(out, "pub mod {} {{", module_name);
    let _ = writeln!(out, "    alloy::sol! {{");
    for line in interface.lines() {
        if line.is_empty() {
            let _ = writeln!(out);
        } else {
            let _ = writeln!(out, "        {}", line);
        }
    }
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    /// Creation bytecode of the `{}` contract.", artifact.name);
    let _ = writeln!(
        out,
        "    pub const BYTECODE: alloy::primitives::Bytes = alloy::primitives::bytes!(\"{}\");",
        hex::encode(&artifact.bytecode)
    );
    let _ = writeln!(out, "}}");
    Ok(out)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOTTERY_ABI: &str = include_str!("../../tests/fixtures/Lottery.abi");
    const LOTTERY_BIN: &str = include_str!("../../tests/fixtures/Lottery.bin");

    fn lottery() -> CompiledArtifact {
        CompiledArtifact::from_parts("Lottery", LOTTERY_ABI, LOTTERY_BIN).unwrap()
    }

    #[test]
    fn test_render_contains_interface_and_bytecode() {
        let source = render_binding(&lottery(), "lottery").unwrap();
        assert!(source.starts_with("// Code generated"));
        assert!(source.contains("pub mod lottery {"));
        assert!(source.contains("alloy::sol! {"));
        assert!(source.contains("#[sol(rpc)]"));
        assert!(source.contains("interface Lottery"));
        for method in ["enter", "getPlayers", "manager", "pickWinner"] {
            assert!(source.contains(&format!("function {}(", method)), "missing {method}");
        }
        assert!(source.contains(LOTTERY_BIN.trim()));
    }

    #[test]
    fn test_module_name_validation() {
        assert!(is_identifier("lottery"));
        assert!(is_identifier("_lottery2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("_"));
        assert!(!is_identifier("2lottery"));
        assert!(!is_identifier("lottery-bindings"));

        let err = render_binding(&lottery(), "my-mod").unwrap_err();
        assert!(matches!(err, CompileError::InvalidModuleName(_)));
    }

    #[tokio::test]
    async fn test_generate_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path(), "Lottery");
        std::fs::write(&paths.abi, LOTTERY_ABI).unwrap();
        std::fs::write(&paths.bin, LOTTERY_BIN).unwrap();

        let out = dir.path().join("bindings/nested/lottery.rs");
        let written = generate_binding(&paths.abi, &paths.bin, "lottery", &out)
            .await
            .unwrap();
        assert_eq!(written, out);
        let source = std::fs::read_to_string(&out).unwrap();
        assert!(source.contains("pub const BYTECODE"));
    }
}
