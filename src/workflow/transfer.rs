//! Raw value transfer from the configured account.

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::{send_transfer, ChainClient};
use crate::config::WorkflowConfig;
use crate::workflow::{WorkflowError, WorkflowResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub tx_hash: TxHash,
}

/// Sends one EIP-1559 transfer signed locally.
pub struct TransferWorkflow {
    config: WorkflowConfig,
    to: Address,
    value: U256,
}

impl TransferWorkflow {
    pub fn new(config: WorkflowConfig, to: Address, value: U256) -> Self {
        Self { config, to, value }
    }

    /// Submit the transfer. The transaction is not awaited.
    pub async fn run(self) -> WorkflowResult<TransferReport> {
        let account = self
            .config
            .account
            .as_ref()
            .ok_or(WorkflowError::Missing("account"))?;
        let client = ChainClient::connect(
            &self.config.endpoint,
            self.config.chain_id,
            self.config.rpc_timeout,
        )
        .await?;
        let chain_id = client.chain_id().await?;
        let authority = account.private_key.authorize(chain_id.0)?;

        let submitted = send_transfer(&client, &authority, self.to, self.value).await?;
        tracing::info!(tx_hash = %submitted.hash, "Transfer sent");

        Ok(TransferReport {
            from: authority.address(),
            to: self.to,
            value: self.value,
            tx_hash: submitted.hash,
        })
    }
}
