//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the lottery
//! workflows. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LotteryConfig {
    /// Node connection settings.
    pub network: NetworkConfig,

    /// Account that signs every transaction.
    pub account: AccountConfig,

    /// Contract source, build outputs and deployed address.
    pub contract: ContractConfig,

    /// Solidity compiler settings.
    pub toolchain: ToolchainConfig,

    /// Per-call policy for the deploy workflow.
    pub lottery: LotteryPolicyConfig,

    pub logging: LoggingConfig,
}

/// Node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub endpoint: String,

    /// Expected chain ID. When unset the node's chain ID is used as is.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8545".to_string(),
            chain_id: None,
            rpc_timeout_secs: 30,
        }
    }
}

/// Signing account.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AccountConfig {
    /// Hex address of the account. Must match the private key.
    pub address: String,

    /// Hex private key, with or without `0x`.
    pub private_key: String,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Contract source and artifact locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of an already deployed contract.
    pub address: Option<String>,

    /// Solidity source file.
    pub source: String,

    /// Contract name. Defaults to the source file stem.
    pub name: Option<String>,

    /// Directory receiving the `.abi` and `.bin` files.
    pub build_dir: String,

    /// Module name of the generated binding.
    pub binding_module: String,

    /// Path of the generated binding file.
    pub binding_out: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: None,
            source: "contracts/Lottery.sol".to_string(),
            name: None,
            build_dir: "build".to_string(),
            binding_module: "lottery".to_string(),
            binding_out: "bindings/lottery.rs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler executable, looked up on `PATH` when not absolute.
    pub solc: String,

    /// Pass `--optimize` to the compiler.
    pub optimize: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            solc: "solc".to_string(),
            optimize: true,
        }
    }
}

/// Which address the deploy workflow drives after deploying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractWith {
    /// The contract deployed by this run.
    #[default]
    Deployed,
    /// The address under `[contract].address`.
    Configured,
}

/// Call policy for the deploy workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LotteryPolicyConfig {
    /// Value attached to `enter`, in wei.
    pub entry_value_wei: u64,

    /// Gas limit for every contract transaction.
    pub gas_limit: u64,

    pub interact_with: InteractWith,

    /// Wait for the entry to be mined before reading players.
    pub await_entry_confirmation: bool,

    /// Run `eth_call` before each contract transaction.
    pub simulate_transactions: bool,

    /// Upper bound on waiting for a transaction to be mined, in seconds.
    pub mined_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for LotteryPolicyConfig {
    fn default() -> Self {
        Self {
            entry_value_wei: 12_000_000_000_000_000, // 12 finney
            gas_limit: 300_000,
            interact_with: InteractWith::Deployed,
            await_entry_confirmation: false,
            simulate_transactions: true,
            mined_timeout_secs: 120,
            poll_interval_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
