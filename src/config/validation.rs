//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse strings into typed values (URLs, addresses, keys)
//! - Enforce per-command requirements (which commands need an account or a
//!   deployed contract address)
//! - Check that the configured account address matches its private key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: `LotteryConfig → WorkflowConfig`
//! - Runs before any RPC connection is opened

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::blockchain::transaction::{WaitPolicy, TRANSFER_GAS_LIMIT};
use crate::blockchain::{BlockchainResult, SigningAuthority};
use crate::config::schema::{InteractWith, LotteryConfig};
use crate::toolchain::ContractSource;

/// Which command the configuration is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Build,
    Deploy,
    Transfer,
    Status,
}

impl CommandKind {
    fn needs_account(self) -> bool {
        matches!(self, CommandKind::Deploy | CommandKind::Transfer)
    }

    /// Status reports the account balance when credentials are present.
    fn reads_account(self) -> bool {
        self == CommandKind::Status
    }

    fn needs_contract_address(self, interact_with: InteractWith) -> bool {
        match self {
            CommandKind::Build | CommandKind::Status => true,
            CommandKind::Deploy => interact_with == InteractWith::Configured,
            CommandKind::Transfer => false,
        }
    }
}

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending key, e.g. `network.endpoint`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Hex private key that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    /// Build the signing authority for `chain_id`.
    pub fn authorize(&self, chain_id: u64) -> BlockchainResult<SigningAuthority> {
        SigningAuthority::authorize(&self.0, chain_id)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Validated account credentials.
#[derive(Debug, Clone)]
pub struct Account {
    pub address: Address,
    pub private_key: PrivateKey,
}

/// Resolved call policy for the deploy workflow.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub entry_value: U256,
    pub gas_limit: u64,
    pub interact_with: InteractWith,
    pub await_entry_confirmation: bool,
    pub simulate_transactions: bool,
    pub wait: WaitPolicy,
}

/// Configuration after validation, with every value parsed.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub endpoint: Url,
    pub chain_id: Option<u64>,
    pub rpc_timeout: Duration,
    /// Present for every command that signs transactions.
    pub account: Option<Account>,
    pub contract_address: Option<Address>,
    pub source: ContractSource,
    pub build_dir: PathBuf,
    pub binding_module: String,
    pub binding_out: PathBuf,
    pub solc: String,
    pub optimize: bool,
    pub policy: CallPolicy,
    pub log_level: String,
}

/// Validate `config` for `command`.
pub fn validate_config(
    config: &LotteryConfig,
    command: CommandKind,
) -> Result<WorkflowConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoint = match Url::parse(config.network.endpoint.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            errors.push(ValidationError::new(
                "network.endpoint",
                format!("unsupported scheme '{}', expected http or https", url.scheme()),
            ));
            None
        }
        Err(e) => {
            errors.push(ValidationError::new(
                "network.endpoint",
                format!("invalid URL '{}': {}", config.network.endpoint, e),
            ));
            None
        }
    };

    if config.network.chain_id == Some(0) {
        errors.push(ValidationError::new("network.chain_id", "must be non-zero"));
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be greater than zero"));
    }

    let has_key = !config.account.private_key.trim().is_empty();
    let account = if command.needs_account() || (command.reads_account() && has_key) {
        validate_account(config, &mut errors)
    } else {
        None
    };

    let contract_address = match config.contract.address.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match raw.parse::<Address>() {
            Ok(address) => Some(address),
            Err(e) => {
                errors.push(ValidationError::new(
                    "contract.address",
                    format!("invalid address '{}': {}", raw, e),
                ));
                None
            }
        },
        _ => {
            if command.needs_contract_address(config.lottery.interact_with) {
                errors.push(ValidationError::new(
                    "contract.address",
                    "required for this command (set it or LOTTERY_CONTRACT_ADDRESS)",
                ));
            }
            None
        }
    };

    if config.contract.source.trim().is_empty() {
        errors.push(ValidationError::new("contract.source", "must not be empty"));
    }
    let mut source = ContractSource::new(config.contract.source.trim());
    if let Some(name) = config.contract.name.as_deref().filter(|n| !n.is_empty()) {
        source = source.with_name(name);
    }
    if source.name.is_empty() {
        errors.push(ValidationError::new("contract.name", "cannot be derived from the source path"));
    }
    if config.contract.build_dir.trim().is_empty() {
        errors.push(ValidationError::new("contract.build_dir", "must not be empty"));
    }
    if config.contract.binding_out.trim().is_empty() {
        errors.push(ValidationError::new("contract.binding_out", "must not be empty"));
    }
    if config.toolchain.solc.trim().is_empty() {
        errors.push(ValidationError::new("toolchain.solc", "must not be empty"));
    }

    let lottery = &config.lottery;
    if lottery.entry_value_wei == 0 {
        errors.push(ValidationError::new("lottery.entry_value_wei", "must be greater than zero"));
    }
    if lottery.gas_limit < TRANSFER_GAS_LIMIT {
        errors.push(ValidationError::new(
            "lottery.gas_limit",
            format!("must be at least {}", TRANSFER_GAS_LIMIT),
        ));
    }
    if lottery.mined_timeout_secs == 0 {
        errors.push(ValidationError::new("lottery.mined_timeout_secs", "must be greater than zero"));
    }
    if lottery.poll_interval_ms == 0 {
        errors.push(ValidationError::new("lottery.poll_interval_ms", "must be greater than zero"));
    }

    if config.logging.level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level '{}'", config.logging.level),
        ));
    }

    let endpoint = match endpoint {
        Some(endpoint) if errors.is_empty() => endpoint,
        _ => return Err(errors),
    };

    Ok(WorkflowConfig {
        endpoint,
        chain_id: config.network.chain_id,
        rpc_timeout: Duration::from_secs(config.network.rpc_timeout_secs),
        account,
        contract_address,
        source,
        build_dir: PathBuf::from(config.contract.build_dir.trim()),
        binding_module: config.contract.binding_module.clone(),
        binding_out: PathBuf::from(config.contract.binding_out.trim()),
        solc: config.toolchain.solc.trim().to_string(),
        optimize: config.toolchain.optimize,
        policy: CallPolicy {
            entry_value: U256::from(lottery.entry_value_wei),
            gas_limit: lottery.gas_limit,
            interact_with: lottery.interact_with,
            await_entry_confirmation: lottery.await_entry_confirmation,
            simulate_transactions: lottery.simulate_transactions,
            wait: WaitPolicy {
                timeout: Duration::from_secs(lottery.mined_timeout_secs),
                poll_interval: Duration::from_millis(lottery.poll_interval_ms),
            },
        },
        log_level: config.logging.level.clone(),
    })
}

fn validate_account(config: &LotteryConfig, errors: &mut Vec<ValidationError>) -> Option<Account> {
    let raw_key = config.account.private_key.trim();
    let raw_address = config.account.address.trim();

    if raw_key.is_empty() {
        errors.push(ValidationError::new(
            "account.private_key",
            "required for this command (set it or ACCOUNT_PRIVATE_KEY)",
        ));
        return None;
    }

    let signer = match raw_key.strip_prefix("0x").unwrap_or(raw_key).parse::<PrivateKeySigner>() {
        Ok(signer) => signer,
        Err(_) => {
            // The parse error can echo key material.
            errors.push(ValidationError::new("account.private_key", "not a valid secp256k1 key"));
            return None;
        }
    };

    let address = if raw_address.is_empty() {
        signer.address()
    } else {
        match raw_address.parse::<Address>() {
            Ok(address) if address == signer.address() => address,
            Ok(address) => {
                errors.push(ValidationError::new(
                    "account.address",
                    format!("{} does not match the private key ({})", address, signer.address()),
                ));
                return None;
            }
            Err(e) => {
                errors.push(ValidationError::new(
                    "account.address",
                    format!("invalid address '{}': {}", raw_address, e),
                ));
                return None;
            }
        }
    };

    Some(Account {
        address,
        private_key: PrivateKey(raw_key.to_string()),
    })
}
