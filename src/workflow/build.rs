//! Build workflow: compile, generate the binding, verify against the chain.

use alloy::primitives::Address;
use std::path::PathBuf;

use crate::blockchain::ChainClient;
use crate::config::WorkflowConfig;
use crate::contract::LotteryContract;
use crate::toolchain::{generate_binding, ArtifactPaths, CompiledArtifact, OutputKind, Solc};
use crate::workflow::stage::{BuildStage, StageReport};
use crate::workflow::{WorkflowError, WorkflowResult};

/// Outcome of a build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub artifacts: ArtifactPaths,
    pub binding: PathBuf,
    /// Manager read back from the configured contract, when verification worked.
    pub manager: Option<Address>,
    pub stages: StageReport<BuildStage>,
}

/// Compiles the contract and writes its binding.
pub struct BuildWorkflow {
    config: WorkflowConfig,
    solc: Solc,
}

impl BuildWorkflow {
    pub fn new(config: WorkflowConfig) -> Self {
        let solc = Solc::new(&config.solc).optimize(config.optimize);
        Self { config, solc }
    }

    /// Replace the compiler handle (e.g. a wrapper script).
    pub fn with_solc(mut self, solc: Solc) -> Self {
        self.solc = solc;
        self
    }

    /// Run every stage in order.
    ///
    /// Compilation and binding failures abort. Verification failures are
    /// logged and recorded in the report.
    pub async fn run(self) -> WorkflowResult<BuildReport> {
        let source = &self.config.source;
        let build_dir = &self.config.build_dir;
        let mut stages = StageReport::default();

        tracing::info!(
            source = %source.path.display(),
            contract = %source.name,
            build_dir = %build_dir.display(),
            "Starting build"
        );

        let mut stage = BuildStage::FIRST;
        let mut abi = None;
        let mut bin = None;
        let mut binding = None;
        let mut manager = None;

        while stage != BuildStage::Done {
            match stage {
                BuildStage::CompileAbi => {
                    abi = Some(self.solc.emit(OutputKind::Abi, source, build_dir).await?);
                }
                BuildStage::CompileBinary => {
                    bin = Some(self.solc.emit(OutputKind::Bin, source, build_dir).await?);
                }
                BuildStage::GenerateBinding => {
                    let (abi, bin) = artifact_pair(&abi, &bin)?;
                    binding = Some(
                        generate_binding(
                            abi,
                            bin,
                            &self.config.binding_module,
                            &self.config.binding_out,
                        )
                        .await?,
                    );
                }
                BuildStage::VerifyByReadingManager => {
                    let (abi, bin) = artifact_pair(&abi, &bin)?;
                    let paths = ArtifactPaths {
                        abi: abi.clone(),
                        bin: bin.clone(),
                    };
                    match self.verify(&paths).await {
                        Ok(address) => manager = Some(address),
                        Err(e) => {
                            stages.tolerate(stage, &e);
                            stage = stage.next();
                            continue;
                        }
                    }
                }
                BuildStage::Done => break,
            }
            stages.complete(stage);
            stage = stage.next();
        }

        let (abi, bin) = artifact_pair(&abi, &bin)?;
        let report = BuildReport {
            artifacts: ArtifactPaths {
                abi: abi.clone(),
                bin: bin.clone(),
            },
            binding: binding.ok_or(WorkflowError::Missing("generated binding"))?,
            manager,
            stages,
        };

        tracing::info!(
            binding = %report.binding.display(),
            verified = report.manager.is_some(),
            "Build complete"
        );
        Ok(report)
    }

    /// Read `manager()` from the configured contract through the fresh ABI.
    async fn verify(&self, paths: &ArtifactPaths) -> WorkflowResult<Address> {
        let address = self
            .config
            .contract_address
            .ok_or(WorkflowError::Missing("contract address"))?;
        let artifact = CompiledArtifact::load(paths).await?;
        let client =
            ChainClient::connect(&self.config.endpoint, self.config.chain_id, self.config.rpc_timeout)
                .await?;
        let contract = LotteryContract::at(address, &client, &artifact.abi)?;
        let manager = contract.manager().await?;
        tracing::info!(contract = %address, manager = %manager, "Binding verified");
        Ok(manager)
    }
}

fn artifact_pair<'a>(
    abi: &'a Option<PathBuf>,
    bin: &'a Option<PathBuf>,
) -> WorkflowResult<(&'a PathBuf, &'a PathBuf)> {
    match (abi, bin) {
        (Some(abi), Some(bin)) => Ok((abi, bin)),
        _ => Err(WorkflowError::Missing("compiled artifacts")),
    }
}
