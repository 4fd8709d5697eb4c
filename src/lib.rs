//! Lottery contract deployer library.

pub mod blockchain;
pub mod config;
pub mod contract;
pub mod observability;
pub mod toolchain;
pub mod workflow;

pub use config::{LotteryConfig, WorkflowConfig};
pub use contract::LotteryContract;
pub use workflow::{BuildWorkflow, DeployWorkflow, StatusWorkflow, TransferWorkflow, WorkflowError};
