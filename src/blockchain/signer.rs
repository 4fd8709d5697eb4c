//! Signing authority for state-changing calls.
//!
//! # Security
//! - Private keys are parsed once and never logged or serialized
//! - The chain id is bound to the signer for EIP-155 replay protection

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Per-transaction template applied to the next submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactOpts {
    /// Explicit nonce. `None` lets the provider pick one.
    pub nonce: Option<u64>,
    /// Native value attached to the call, in wei.
    pub value: U256,
    /// Fixed gas limit. `None` lets the provider estimate.
    pub gas_limit: Option<u64>,
}

/// Credential-derived object authorizing state-changing calls.
#[derive(Debug, Clone)]
pub struct SigningAuthority {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
    opts: TransactOpts,
}

impl SigningAuthority {
    /// Create a signing authority from a hex-encoded private key.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn authorize(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Signing(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::debug!(
            address = %signer.address(),
            chain_id = chain_id,
            "Signing authority initialized"
        );

        Ok(Self {
            signer,
            chain_id,
            opts: TransactOpts::default(),
        })
    }

    /// Address derived from the private key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Chain ID this authority signs for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Current transaction template.
    pub fn opts(&self) -> &TransactOpts {
        &self.opts
    }

    /// Mutable access to the transaction template.
    pub fn opts_mut(&mut self) -> &mut TransactOpts {
        &mut self.opts
    }

    /// Fill the template for the next transaction.
    ///
    /// The nonce comes from the pending pool so that several transactions can
    /// be submitted back to back before any of them is mined.
    pub async fn prepare(
        &mut self,
        client: &ChainClient,
        value: U256,
        gas_limit: Option<u64>,
    ) -> BlockchainResult<&TransactOpts> {
        let nonce = client.pending_nonce(self.address()).await?;
        self.opts = TransactOpts {
            nonce: Some(nonce),
            value,
            gas_limit,
        };
        tracing::debug!(nonce, value = %value, gas_limit = ?gas_limit, "Transaction template prepared");
        Ok(&self.opts)
    }

    /// Wallet used by providers to sign outgoing transactions.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
