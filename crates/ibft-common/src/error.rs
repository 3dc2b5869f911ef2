//! Error types for the IBFT core
//!
//! Provides a unified error type plus the failure type validator backends report

use thiserror::Error;

/// Result type alias using IbftError
pub type Result<T> = std::result::Result<T, IbftError>;

/// Unified error type for IBFT core operations
#[derive(Debug, Error)]
pub enum IbftError {
    // Backend errors are surfaced unchanged
    #[error(transparent)]
    Backend(#[from] BackendError),

    // Validator set data errors
    #[error("total voting power is zero or less at height {height}")]
    VotingPowerNotPositive { height: u64 },

    // Address decoding errors
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures reported by a validator backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("validator backend unavailable: {0}")]
    Unavailable(String),

    #[error("no validator set known for height {0}")]
    UnknownHeight(u64),

    #[error("validator backend error: {0}")]
    Other(String),
}

// Implement From for common external error types
impl From<serde_json::Error> for IbftError {
    fn from(err: serde_json::Error) -> Self {
        IbftError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for IbftError {
    fn from(err: std::io::Error) -> Self {
        IbftError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for IbftError {
    fn from(err: hex::FromHexError) -> Self {
        IbftError::InvalidAddress(err.to_string())
    }
}
