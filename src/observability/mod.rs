//! Observability subsystem.
//!
//! Every workflow step emits structured `tracing` events (addresses, hashes,
//! balances as fields). There is no metrics endpoint.

pub mod logging;

pub use logging::init_logging;
