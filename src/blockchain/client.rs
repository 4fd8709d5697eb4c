//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint and confirm the chain identity
//! - Query chain state (balances, nonces, fees, receipts, code)
//! - Submit signed transactions
//! - Surface every failure to the caller; nothing here retries

use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::{RpcError, TransportErrorKind, TransportResult};
use std::future::IntoFuture;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::signer::SigningAuthority;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, SubmittedTx};

/// Blockchain RPC client wrapper around a single node endpoint.
#[derive(Clone)]
pub struct ChainClient {
    provider: DynProvider,
    endpoint: Url,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Connect to a node and verify it answers `eth_chainId`.
    ///
    /// # Arguments
    /// * `endpoint` - JSON-RPC URL of the node
    /// * `expected_chain_id` - When set, the node's chain id must match
    /// * `rpc_timeout` - Upper bound for every request made by this client
    pub async fn connect(
        endpoint: &Url,
        expected_chain_id: Option<u64>,
        rpc_timeout: Duration,
    ) -> BlockchainResult<Self> {
        let provider = ProviderBuilder::new()
            .connect_http(endpoint.clone())
            .erased();
        let client = Self::from_provider(provider, endpoint.clone(), rpc_timeout);

        let chain_id = client.chain_id().await.map_err(|e| {
            BlockchainError::Connection(format!("{} did not answer eth_chainId: {}", endpoint, e))
        })?;

        if let Some(expected) = expected_chain_id {
            if expected != chain_id.0 {
                return Err(BlockchainError::ChainMismatch {
                    expected,
                    actual: chain_id.0,
                });
            }
        }

        tracing::info!(
            rpc_url = %endpoint,
            chain_id = chain_id.0,
            "Blockchain client connected"
        );

        Ok(client)
    }

    /// Wrap an already built provider without probing the node.
    pub fn from_provider(provider: DynProvider, endpoint: Url, rpc_timeout: Duration) -> Self {
        Self {
            provider,
            endpoint,
            timeout_duration: rpc_timeout,
        }
    }

    /// Run one RPC request under the client timeout.
    async fn request<F, T>(&self, method: &'static str, call: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, call.into_future()).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::debug!(method, error = %e, "RPC error");
                Err(classify_rpc_error(method, e))
            }
            Err(_) => {
                tracing::debug!(method, "RPC timeout");
                Err(BlockchainError::Timeout(self.timeout_duration.as_secs()))
            }
        }
    }

    /// Get the chain ID from the RPC.
    pub async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.request("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the balance of an address in wei at the latest block.
    pub async fn balance_of(&self, address: Address) -> BlockchainResult<U256> {
        self.request("eth_getBalance", self.provider.get_balance(address).latest())
            .await
    }

    /// Get the next nonce for an address, counting transactions still in the pool.
    pub async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.request(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    /// Suggested fee cap (`eth_gasPrice`) in wei.
    pub async fn suggested_fee_cap(&self) -> BlockchainResult<u128> {
        self.request("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    /// Suggested priority fee (`eth_maxPriorityFeePerGas`) in wei.
    pub async fn suggested_tip_cap(&self) -> BlockchainResult<u128> {
        self.request(
            "eth_maxPriorityFeePerGas",
            self.provider.get_max_priority_fee_per_gas(),
        )
        .await
    }

    /// Broadcast a signed transaction and return its hash.
    pub async fn submit(&self, envelope: TxEnvelope) -> BlockchainResult<SubmittedTx> {
        let pending = self
            .request("eth_sendRawTransaction", self.provider.send_tx_envelope(envelope))
            .await?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, "Submitted transaction");
        Ok(SubmittedTx::from(tx_hash))
    }

    /// Get a transaction receipt by hash.
    pub async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.request(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
    }

    /// Get the runtime code stored at an address.
    pub async fn code_at(&self, address: Address) -> BlockchainResult<Bytes> {
        self.request("eth_getCode", self.provider.get_code_at(address).latest())
            .await
    }

    /// Provider that signs and fills outgoing transactions with `authority`.
    pub fn signing_provider(&self, authority: &SigningAuthority) -> DynProvider {
        ProviderBuilder::new()
            .wallet(authority.wallet())
            .connect_http(self.endpoint.clone())
            .erased()
    }

    /// Get the underlying read-only provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Per-request timeout.
    pub fn rpc_timeout(&self) -> Duration {
        self.timeout_duration
    }
}

/// Split transport failures (node unreachable) from node-side error responses.
fn classify_rpc_error(method: &'static str, error: RpcError<TransportErrorKind>) -> BlockchainError {
    match error {
        RpcError::Transport(kind) => BlockchainError::Connection(kind.to_string()),
        other => BlockchainError::Rpc {
            method,
            message: other.to_string(),
        },
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.endpoint.as_str())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so every request is refused.
    fn unreachable_endpoint() -> Url {
        "http://127.0.0.1:9".parse().unwrap()
    }

    #[tokio::test]
    async fn test_connect_unreachable_node() {
        let result =
            ChainClient::connect(&unreachable_endpoint(), None, Duration::from_secs(2)).await;
        let err = result.unwrap_err();
        assert!(matches!(err, BlockchainError::Connection(_)));
        assert!(err.to_string().contains("eth_chainId"));
    }

    #[tokio::test]
    async fn test_requests_surface_errors() {
        let endpoint = unreachable_endpoint();
        let provider = ProviderBuilder::new().connect_http(endpoint.clone()).erased();
        let client = ChainClient::from_provider(provider, endpoint, Duration::from_secs(2));

        assert!(client.balance_of(Address::ZERO).await.is_err());
        assert!(client.pending_nonce(Address::ZERO).await.is_err());
        assert!(client.suggested_fee_cap().await.is_err());
    }

    #[test]
    fn test_debug_hides_provider() {
        let endpoint = unreachable_endpoint();
        let provider = ProviderBuilder::new().connect_http(endpoint.clone()).erased();
        let client = ChainClient::from_provider(provider, endpoint, Duration::from_secs(7));
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("127.0.0.1:9"));
        assert!(rendered.contains("timeout_secs: 7"));
    }
}
