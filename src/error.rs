//! Error hierarchy for the orchestrator
//!
//! Every variant describes a caller-side mistake. A call that returns one of
//! these leaves the orchestrator exactly as it was before the call.

use thiserror::Error;

/// Root error type for all orchestration failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SofomoreError {
    /// Bad ask count, unknown kernel reference, malformed vector.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A `tell` payload does not line up with the matching `ask`.
    #[error("arity mismatch: expected {expected} entries, got {actual}")]
    ArityMismatch {
        /// Number of entries the last `ask` produced
        expected: usize,
        /// Number of entries received
        actual: usize,
    },

    /// `tell` without a pending `ask`.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SofomoreError>;
