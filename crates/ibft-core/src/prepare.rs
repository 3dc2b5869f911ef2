//! Prepare-quorum policy
//!
//! In the prepare phase validators endorse a proposal by broadcasting prepare
//! messages. The proposer counts as prepared by virtue of proposing and must
//! not send a prepare of its own; a proposer found among the preparers voids
//! the quorum check.
//!
//! Anomalies are reported through the manager's [`ConsensusLogger`] and turned
//! into "no quorum". They are never raised as errors.
//!
//! [`ConsensusLogger`]: crate::logger::ConsensusLogger

use std::fmt;

use ibft_common::MessageSender;
use serde::{Deserialize, Serialize};

use crate::senders::SenderSet;
use crate::validator::ValidatorManager;

/// Consensus phase, as tracked by the enclosing state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusPhase {
    NewRound,
    Prepare,
    Commit,
    Fin,
    RoundChange,
}

impl fmt::Display for ConsensusPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusPhase::NewRound => write!(f, "new_round"),
            ConsensusPhase::Prepare => write!(f, "prepare"),
            ConsensusPhase::Commit => write!(f, "commit"),
            ConsensusPhase::Fin => write!(f, "fin"),
            ConsensusPhase::RoundChange => write!(f, "round_change"),
        }
    }
}

/// Result of evaluating prepare messages against the installed validator set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepareQuorumOutcome {
    /// Proposer plus preparers hold quorum
    Reached,
    /// Not enough voting power yet
    NotReached,
    /// No proposal known while outside the prepare phase; prepares arrived early
    ProposalNotYetReceived,
    /// No proposal known while in the prepare phase
    MissingProposal,
    /// The proposer also sent a prepare for its own proposal
    ProposerAmongPreparers,
}

impl PrepareQuorumOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, PrepareQuorumOutcome::Reached)
    }

    /// Whether the outcome indicates an internal or protocol inconsistency
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            PrepareQuorumOutcome::MissingProposal | PrepareQuorumOutcome::ProposerAmongPreparers
        )
    }

    fn diagnostic(&self) -> Option<&'static str> {
        match self {
            PrepareQuorumOutcome::MissingProposal => {
                Some("prepare quorum: no proposal known in the prepare phase")
            }
            PrepareQuorumOutcome::ProposerAmongPreparers => {
                Some("prepare quorum: proposer sent a prepare for its own proposal")
            }
            _ => None,
        }
    }
}

impl ValidatorManager {
    /// Classify a set of prepare messages without logging.
    ///
    /// The proposer's address is always part of the evaluated sender set.
    pub fn evaluate_prepare_quorum<P, I>(
        &self,
        phase: ConsensusPhase,
        proposal: Option<&P>,
        prepares: I,
    ) -> PrepareQuorumOutcome
    where
        P: MessageSender + ?Sized,
        I: IntoIterator,
        I::Item: MessageSender,
    {
        let Some(proposal) = proposal else {
            return if phase == ConsensusPhase::Prepare {
                PrepareQuorumOutcome::MissingProposal
            } else {
                PrepareQuorumOutcome::ProposalNotYetReceived
            };
        };

        let proposer = proposal.sender();
        let mut senders = SenderSet::new();
        senders.insert(proposer.clone());

        for msg in prepares {
            if msg.sender() == proposer {
                return PrepareQuorumOutcome::ProposerAmongPreparers;
            }
            senders.insert(msg.sender().clone());
        }

        if self.has_quorum(&senders) {
            PrepareQuorumOutcome::Reached
        } else {
            PrepareQuorumOutcome::NotReached
        }
    }

    /// Whether the proposer together with the prepare senders hold quorum.
    ///
    /// A missing proposal during the prepare phase and a proposer among the
    /// preparers are logged once and answered with `false`.
    pub fn has_prepare_quorum<P, I>(
        &self,
        phase: ConsensusPhase,
        proposal: Option<&P>,
        prepares: I,
    ) -> bool
    where
        P: MessageSender + ?Sized,
        I: IntoIterator,
        I::Item: MessageSender,
    {
        let outcome = self.evaluate_prepare_quorum(phase, proposal, prepares);
        if let Some(message) = outcome.diagnostic() {
            self.logger.error(message);
        }
        outcome.is_reached()
    }
}
