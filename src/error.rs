//! Error types shared by every ledger component

use thiserror::Error;

/// Errors returned by ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Entity contains fields with invalid data")]
    InvalidData,
    #[error("Unable to produce canonical serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Mining was cancelled before a valid nonce was found")]
    MiningCancelled,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate
pub type LedgerResult<T> = Result<T, LedgerError>;
