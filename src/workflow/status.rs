//! Read-only summary of a deployed lottery.

use alloy::primitives::{Address, U256};

use crate::blockchain::ChainClient;
use crate::config::WorkflowConfig;
use crate::contract::LotteryContract;
use crate::toolchain::{ArtifactPaths, CompiledArtifact};
use crate::workflow::{WorkflowError, WorkflowResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryStatus {
    pub contract: Address,
    pub manager: Address,
    pub players: Vec<Address>,
    /// Current pot, in wei.
    pub pot: U256,
    /// Configured account and its balance, when credentials are set.
    pub account: Option<(Address, U256)>,
}

impl std::fmt::Display for LotteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "contract: {}", self.contract)?;
        writeln!(f, "manager:  {}", self.manager)?;
        writeln!(f, "pot:      {} wei", self.pot)?;
        writeln!(f, "players:  {}", self.players.len())?;
        for player in &self.players {
            writeln!(f, "  - {}", player)?;
        }
        if let Some((address, balance)) = &self.account {
            writeln!(f, "account:  {} ({} wei)", address, balance)?;
        }
        Ok(())
    }
}

/// Reads manager, players and balances of the configured contract.
pub struct StatusWorkflow {
    config: WorkflowConfig,
}

impl StatusWorkflow {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> WorkflowResult<LotteryStatus> {
        let address = self
            .config
            .contract_address
            .ok_or(WorkflowError::Missing("contract address"))?;
        let paths = ArtifactPaths::in_dir(&self.config.build_dir, &self.config.source.name);
        let artifact = CompiledArtifact::load(&paths).await?;

        let client = ChainClient::connect(
            &self.config.endpoint,
            self.config.chain_id,
            self.config.rpc_timeout,
        )
        .await?;
        let lottery = LotteryContract::at(address, &client, &artifact.abi)?;

        let manager = lottery.manager().await?;
        let players = lottery.get_players().await?;
        let pot = client.balance_of(address).await?;

        let account = match &self.config.account {
            Some(account) => Some((account.address, client.balance_of(account.address).await?)),
            None => None,
        };

        tracing::debug!(contract = %address, players = players.len(), pot = %pot, "Status read");
        Ok(LotteryStatus {
            contract: address,
            manager,
            players,
            pot,
            account,
        })
    }
}
