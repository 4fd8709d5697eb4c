//! Workflow orchestration.
//!
//! # Data Flow
//! ```text
//! build:    solc --abi → solc --bin → binding → read manager() (diagnostic)
//! deploy:   balance → deploy → wait mined → enter → balance → players → pickWinner
//! transfer: fees + nonce → sign → submit
//! status:   manager, players, balances (read only)
//! ```
//!
//! # Design Decisions
//! - Steps run strictly in sequence on one task
//! - Each workflow decides which failures abort and which are only logged;
//!   the lower layers always propagate
//! - Nothing retries

pub mod build;
pub mod deploy;
pub mod stage;
pub mod status;
pub mod transfer;

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::ConfigError;
use crate::contract::ContractError;
use crate::toolchain::CompileError;

pub use build::{BuildReport, BuildWorkflow};
pub use deploy::{DeployReport, DeployWorkflow};
pub use stage::{BuildStage, DeployStage, StageReport, ToleratedFailure};
pub use status::{LotteryStatus, StatusWorkflow};
pub use transfer::{TransferReport, TransferWorkflow};

/// Any failure that aborts a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The configuration lacks a value this step needs.
    #[error("missing {0}")]
    Missing(&'static str),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
