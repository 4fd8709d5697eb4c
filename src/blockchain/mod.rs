//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! WorkflowConfig (endpoint, private key, chain id)
//!     → client.rs (RPC connection with timeouts)
//!     → signer.rs (key loading, per-transaction template)
//!     → transaction.rs (wait for mining, raw transfers)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have a configurable timeout
//! - Failures are returned, never retried

pub mod client;
pub mod signer;
pub mod transaction;
pub mod types;

pub use client::ChainClient;
pub use signer::{SigningAuthority, TransactOpts};
pub use transaction::{send_transfer, wait_mined, WaitPolicy};
pub use types::{BlockchainError, BlockchainResult, ChainId, SubmittedTx};
