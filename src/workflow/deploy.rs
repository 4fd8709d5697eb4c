//! Deploy workflow: deploy the lottery, enter it once and pick the winner.

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::{wait_mined, ChainClient, SigningAuthority};
use crate::config::{InteractWith, WorkflowConfig};
use crate::contract::{LotteryContract, PendingDeployment};
use crate::toolchain::{ArtifactPaths, CompiledArtifact};
use crate::workflow::stage::{DeployStage, StageReport};
use crate::workflow::{WorkflowError, WorkflowResult};

/// Outcome of a deploy run.
#[derive(Debug, Clone)]
pub struct DeployReport {
    /// Address returned by the mined creation transaction.
    pub deployed: Address,
    /// Address the lottery calls were sent to.
    pub target: Address,
    pub deploy_tx: TxHash,
    pub entry_tx: TxHash,
    pub winner_tx: TxHash,
    pub balance_before: Option<U256>,
    pub balance_after_entry: Option<U256>,
    pub players: Option<Vec<Address>>,
    pub stages: StageReport<DeployStage>,
}

/// Drives one full lottery round against a node.
pub struct DeployWorkflow {
    config: WorkflowConfig,
}

#[derive(Default)]
struct Progress {
    pending: Option<PendingDeployment>,
    deployed: Option<Address>,
    lottery: Option<LotteryContract>,
    entry_tx: Option<TxHash>,
    winner_tx: Option<TxHash>,
    balance_before: Option<U256>,
    balance_after_entry: Option<U256>,
    players: Option<Vec<Address>>,
}

impl DeployWorkflow {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Run every stage in order.
    ///
    /// Deploy, mining, entry and winner selection abort on failure; balance
    /// and player reads are logged and recorded in the report.
    pub async fn run(self) -> WorkflowResult<DeployReport> {
        let config = &self.config;
        let policy = &config.policy;
        let account = config
            .account
            .as_ref()
            .ok_or(WorkflowError::Missing("account"))?;

        let client = ChainClient::connect(&config.endpoint, config.chain_id, config.rpc_timeout).await?;
        let chain_id = client.chain_id().await?;
        let mut authority = account.private_key.authorize(chain_id.0)?;

        let paths = ArtifactPaths::in_dir(&config.build_dir, &config.source.name);
        let artifact = CompiledArtifact::load(&paths).await?;

        tracing::info!(
            account = %authority.address(),
            chain_id = chain_id.0,
            contract = %artifact.name,
            interact_with = ?policy.interact_with,
            "Starting deploy"
        );

        let mut progress = Progress::default();
        let mut stages = StageReport::default();
        let mut stage = DeployStage::FIRST;

        while stage != DeployStage::Done {
            let outcome = self
                .step(stage, &client, &mut authority, &artifact, &mut progress)
                .await;
            match outcome {
                Ok(()) => stages.complete(stage),
                Err(e) if stage.is_diagnostic() => stages.tolerate(stage, &e),
                Err(e) => {
                    tracing::error!(stage = %stage, error = %e, "Deploy aborted");
                    return Err(e);
                }
            }
            stage = stage.next(policy.await_entry_confirmation);
        }

        let (pending, deployed, lottery, entry_tx, winner_tx) = match progress {
            Progress {
                pending: Some(pending),
                deployed: Some(deployed),
                lottery: Some(lottery),
                entry_tx: Some(entry_tx),
                winner_tx: Some(winner_tx),
                ..
            } => (pending, deployed, lottery, entry_tx, winner_tx),
            _ => return Err(WorkflowError::Missing("deploy outcome")),
        };

        tracing::info!(winner_tx = %winner_tx, "Lottery winner described in transaction");
        tracing::info!("Done");

        Ok(DeployReport {
            deployed,
            target: lottery.address(),
            deploy_tx: pending.tx_hash,
            entry_tx,
            winner_tx,
            balance_before: progress.balance_before,
            balance_after_entry: progress.balance_after_entry,
            players: progress.players,
            stages,
        })
    }

    async fn step(
        &self,
        stage: DeployStage,
        client: &ChainClient,
        authority: &mut SigningAuthority,
        artifact: &CompiledArtifact,
        progress: &mut Progress,
    ) -> WorkflowResult<()> {
        let policy = &self.config.policy;
        match stage {
            DeployStage::ReadBalance => {
                let balance = client.balance_of(authority.address()).await?;
                tracing::info!(balance = %balance, "Current account balance");
                progress.balance_before = Some(balance);
            }
            DeployStage::Deploy => {
                *authority.opts_mut() = Default::default();
                let pending = LotteryContract::deploy(authority, client, artifact, &[]).await?;
                progress.pending = Some(pending);
            }
            DeployStage::WaitMined => {
                let pending = progress
                    .pending
                    .as_ref()
                    .ok_or(WorkflowError::Missing("pending deployment"))?;
                let deployed = LotteryContract::wait_deployed(client, pending, policy.wait).await?;
                tracing::info!(address = %deployed, "Contract deployed to address");
                progress.deployed = Some(deployed);

                let target = self.target(deployed)?;
                let lottery = LotteryContract::at(target, client, &artifact.abi)?
                    .with_simulation(policy.simulate_transactions);
                progress.lottery = Some(lottery);
            }
            DeployStage::EnterLottery => {
                let lottery = lottery(progress)?;
                authority
                    .prepare(client, policy.entry_value, Some(policy.gas_limit))
                    .await?;
                let entry = lottery.enter(authority).await?;
                tracing::info!(tx_hash = %entry.hash, "Lottery entered");
                progress.entry_tx = Some(entry.hash);
            }
            DeployStage::ConfirmEntry => {
                let entry_tx = progress
                    .entry_tx
                    .ok_or(WorkflowError::Missing("entry transaction"))?;
                wait_mined(client, entry_tx, policy.wait).await?;
            }
            DeployStage::ReadBalanceAfterEntry => {
                let balance = client.balance_of(authority.address()).await?;
                tracing::info!(balance = %balance, "Current account balance after lottery entry");
                progress.balance_after_entry = Some(balance);
            }
            DeployStage::ReadPlayers => {
                let players = lottery(progress)?.get_players().await?;
                tracing::info!(count = players.len(), players = ?players, "Current lottery players");
                progress.players = Some(players);
            }
            DeployStage::PickWinner => {
                let lottery = lottery(progress)?;
                authority
                    .prepare(client, U256::ZERO, Some(policy.gas_limit))
                    .await?;
                let winner = lottery.pick_winner(authority).await?;
                progress.winner_tx = Some(winner.hash);
            }
            DeployStage::Done => {}
        }
        Ok(())
    }

    /// Address the lottery calls go to after deploying.
    fn target(&self, deployed: Address) -> WorkflowResult<Address> {
        match self.config.policy.interact_with {
            InteractWith::Deployed => Ok(deployed),
            InteractWith::Configured => self
                .config
                .contract_address
                .ok_or(WorkflowError::Missing("contract address")),
        }
    }
}

fn lottery(progress: &Progress) -> WorkflowResult<&LotteryContract> {
    progress
        .lottery
        .as_ref()
        .ok_or(WorkflowError::Missing("lottery binding"))
}
