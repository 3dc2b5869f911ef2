//! # IBFT Core
//!
//! Voting-power and quorum accounting for an IBFT consensus engine.
//!
//! ## Components
//!
//! - **Quorum arithmetic**: total power and the `floor(2T/3) + 1` Byzantine threshold
//! - **Validator manager**: per-height validator snapshot with thread-safe quorum queries
//! - **Prepare policy**: prepare-phase quorum with the proposer counted implicitly
//! - **Static backend**: config-driven validator sets for devnets and tests
//!
//! ## Data flow
//!
//! ```text
//! ┌──────────────────┐  weights(h)  ┌──────────────────┐  snapshot  ┌────────────────┐
//! │ ValidatorBackend │─────────────▶│ ValidatorManager │───────────▶│ Prepare policy │
//! └──────────────────┘              │ (total, quorum)  │            └────────────────┘
//!                                   └──────────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod logger;
pub mod prepare;
pub mod quorum;
pub mod senders;
pub mod validator;

pub use backend::StaticValidatorBackend;
pub use config::{EpochConfig, PowerEntry, ValidatorSetConfig};
pub use logger::{ConsensusLogger, TracingLogger};
pub use prepare::{ConsensusPhase, PrepareQuorumOutcome};
pub use quorum::{quorum_threshold, total_voting_power};
pub use senders::{sender_set, SenderSet};
pub use validator::{ValidatorBackend, ValidatorManager, VotingPowerSnapshot};

pub use ibft_common::{
    Address, BackendError, ConsensusMessage, Height, IbftError, MessageSender, Result,
    ValidatorWeightSet, VotingPower,
};
