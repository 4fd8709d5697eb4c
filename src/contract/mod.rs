//! Contract binding subsystem.
//!
//! The binding is built at run time from the ABI of a [`CompiledArtifact`],
//! so whatever the toolchain produced is exactly what gets encoded and
//! decoded. Three capabilities are exposed:
//! - deploy (creation transaction + separate wait for mining)
//! - read-only calls (no signing authority)
//! - state-changing calls (signing authority with a prepared template)
//!
//! [`CompiledArtifact`]: crate::toolchain::CompiledArtifact

pub mod lottery;

use thiserror::Error;

use crate::blockchain::BlockchainError;

pub use lottery::{LotteryContract, PendingDeployment, ENTRY_VALUE_WEI, LOTTERY_METHODS};

/// Errors raised by contract calls, transactions and deployments.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The ABI has no function with this name.
    #[error("unknown contract method '{0}'")]
    UnknownMethod(String),

    /// The node or the contract rejected the call.
    #[error("contract call {method} failed: {source}")]
    Call {
        method: String,
        #[source]
        source: alloy::contract::Error,
    },

    /// The call returned something other than what the method declares.
    #[error("unexpected output from {method}: {detail}")]
    UnexpectedOutput { method: String, detail: String },

    /// Arguments could not be ABI-encoded.
    #[error("failed to encode arguments: {0}")]
    Encode(String),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

impl ContractError {
    /// Wrap an alloy contract error raised while handling `method`.
    pub fn call(method: &str, source: alloy::contract::Error) -> Self {
        match source {
            alloy::contract::Error::UnknownFunction(name) => ContractError::UnknownMethod(name),
            source => ContractError::Call {
                method: method.to_string(),
                source,
            },
        }
    }
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;
