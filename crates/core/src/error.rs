//! Typed failures surfaced by the engine.

use thiserror::Error;

/// Errors produced by ledger, store, and session operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A bet of zero or a negative amount was requested.
    #[error("invalid amount: a bet must be a positive number of rocks")]
    InvalidAmount,

    /// A bet exceeded the available balance. Nothing was debited.
    #[error("insufficient funds: bet of {requested} rocks exceeds balance of {available}")]
    InsufficientFunds {
        /// The amount the caller tried to stake.
        requested: u64,
        /// The balance at the time of the attempt.
        available: u64,
    },

    /// The profile file exists but failed parsing or validation.
    ///
    /// Never repaired silently; the frontend decides whether to start fresh.
    #[error("corrupt profile: {0}")]
    CorruptState(String),

    /// Writing the profile to disk failed. In-memory state stays authoritative.
    #[error("failed to write profile: {0}")]
    SaveIo(#[from] std::io::Error),
}

/// Convenience alias used throughout the engine.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
