//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// The node could not be reached or the endpoint is malformed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// RPC request reached the node but failed.
    #[error("RPC error in {method}: {message}")]
    Rpc {
        method: &'static str,
        message: String,
    },

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format or signing failure.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Transaction was not mined within the allotted time.
    #[error("Timed out after {secs} seconds waiting for transaction {tx_hash} to be mined")]
    MinedTimeout { tx_hash: TxHash, secs: u64 },

    /// Transaction was mined but reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    /// A deployment receipt carried no contract address.
    #[error("Receipt for {0} has no contract address")]
    MissingContractAddress(TxHash),

    /// Nothing was deployed at the expected address.
    #[error("No contract code at {0} after deployment")]
    NoCode(Address),

    /// A transaction could not be assembled from its parts.
    #[error("Transaction build error: {0}")]
    Build(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// A transaction accepted by the node, not yet known to be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTx {
    pub hash: TxHash,
}

impl From<TxHash> for SubmittedTx {
    fn from(hash: TxHash) -> Self {
        Self { hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(31337u64);
        assert_eq!(chain_id.0, 31337);
        assert_eq!(u64::from(chain_id), 31337);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ChainMismatch {
            expected: 5,
            actual: 31337,
        };
        assert!(err.to_string().contains("31337"));

        let err = BlockchainError::MinedTimeout {
            tx_hash: TxHash::ZERO,
            secs: 120,
        };
        assert!(err.to_string().contains("120 seconds"));
    }
}
