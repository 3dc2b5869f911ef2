//! # IBFT Common
//!
//! Shared types and errors for the IBFT voting-power core.
//!
//! ## Core Types
//!
//! - [`Address`]: byte-exact validator / sender identifier
//! - [`VotingPower`]: arbitrary-precision, non-negative validator weight
//! - [`ConsensusMessage`]: the minimal message shape the quorum logic reads
//! - [`MessageSender`]: anything exposing a sender address
//!
//! ## Errors
//!
//! - [`IbftError`]: unified error type, with [`BackendError`] for validator backends

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BackendError, IbftError, Result};
pub use types::{
    address::Address,
    message::{ConsensusMessage, Height, MessageSender, Round},
    voting_power::{parse_voting_power, ValidatorWeightSet, VotingPower},
};
