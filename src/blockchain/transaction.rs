//! Transaction building, submission, and mining detection.
//!
//! # Responsibilities
//! - Poll for a receipt until a transaction is mined or a deadline passes
//! - Build, sign and broadcast raw value transfers

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::ChainClient;
use crate::blockchain::signer::SigningAuthority;
use crate::blockchain::types::{BlockchainError, BlockchainResult, SubmittedTx};

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Wait for a transaction to be mined.
///
/// Returns the receipt of a successful transaction. A reverted transaction
/// is an error, as is a transaction that is still unknown when the policy
/// timeout elapses.
pub async fn wait_mined(
    client: &ChainClient,
    tx_hash: TxHash,
    policy: WaitPolicy,
) -> BlockchainResult<TransactionReceipt> {
    let result = timeout(policy.timeout, async {
        let mut ticker = interval(policy.poll_interval);

        loop {
            ticker.tick().await;

            let receipt = match client.transaction_receipt(tx_hash).await? {
                Some(r) => r,
                None => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
            };

            if !receipt.status() {
                return Err(BlockchainError::Reverted(tx_hash));
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                block_number = ?receipt.block_number,
                gas_used = receipt.gas_used,
                "Transaction mined"
            );
            return Ok(receipt);
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => Err(BlockchainError::MinedTimeout {
            tx_hash,
            secs: policy.timeout.as_secs(),
        }),
    }
}

/// Send `value` wei from the authority's account to `to`.
///
/// Fees come from the node's suggestions; the nonce from the pending pool.
pub async fn send_transfer(
    client: &ChainClient,
    authority: &SigningAuthority,
    to: Address,
    value: U256,
) -> BlockchainResult<SubmittedTx> {
    let from = authority.address();
    let nonce = client.pending_nonce(from).await?;
    let tip_cap = client.suggested_tip_cap().await?;
    // A fee cap below the tip is rejected by the node.
    let fee_cap = client.suggested_fee_cap().await?.max(tip_cap);

    let request = transfer_request(authority, to, value, nonce, fee_cap, tip_cap);
    let envelope = request
        .build(&authority.wallet())
        .await
        .map_err(|e| BlockchainError::Build(e.to_string()))?;

    tracing::info!(
        from = %from,
        to = %to,
        value = %value,
        nonce,
        "Sending value transfer"
    );
    client.submit(envelope).await
}

fn transfer_request(
    authority: &SigningAuthority,
    to: Address,
    value: U256,
    nonce: u64,
    fee_cap: u128,
    tip_cap: u128,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(authority.address())
        .with_to(to)
        .with_value(value)
        .with_nonce(nonce)
        .with_chain_id(authority.chain_id())
        .with_gas_limit(TRANSFER_GAS_LIMIT)
        .with_max_fee_per_gas(fee_cap)
        .with_max_priority_fee_per_gas(tip_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::{Provider, ProviderBuilder};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_default_wait_policy() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert_eq!(policy.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_transfer_request_fields() {
        let authority = SigningAuthority::authorize(TEST_PRIVATE_KEY, 5).unwrap();
        let to = Address::repeat_byte(0xa8);
        let request = transfer_request(&authority, to, U256::from(1u64), 7, 30, 2);

        assert_eq!(request.from, Some(authority.address()));
        assert_eq!(request.nonce, Some(7));
        assert_eq!(request.chain_id, Some(5));
        assert_eq!(request.gas, Some(TRANSFER_GAS_LIMIT));
        assert_eq!(request.max_fee_per_gas, Some(30));
        assert_eq!(request.max_priority_fee_per_gas, Some(2));
    }

    #[tokio::test]
    async fn test_signed_transfer_envelope() {
        let authority = SigningAuthority::authorize(TEST_PRIVATE_KEY, 5).unwrap();
        let request = transfer_request(
            &authority,
            Address::repeat_byte(0x11),
            U256::from(10u64),
            0,
            1_000_000_000,
            1_000_000,
        );
        let envelope = request.build(&authority.wallet()).await.unwrap();
        assert!(envelope.is_eip1559());
    }

    #[tokio::test]
    async fn test_wait_mined_propagates_rpc_failure() {
        let endpoint: url::Url = "http://127.0.0.1:9".parse().unwrap();
        let provider = ProviderBuilder::new().connect_http(endpoint.clone()).erased();
        let client = ChainClient::from_provider(provider, endpoint, Duration::from_secs(1));

        let policy = WaitPolicy {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
        };
        let err = wait_mined(&client, TxHash::ZERO, policy).await.unwrap_err();
        assert!(!matches!(err, BlockchainError::MinedTimeout { .. }));
    }
}
