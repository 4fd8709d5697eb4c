//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! lottery.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides)
//!     → validation.rs (semantic checks, per command)
//!     → WorkflowConfig (typed, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets only travel in redacted wrappers once validated

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, load_workflow_config, ConfigError};
pub use schema::{InteractWith, LotteryConfig};
pub use validation::{validate_config, Account, CallPolicy, CommandKind, ValidationError, WorkflowConfig};
