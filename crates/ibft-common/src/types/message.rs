//! Consensus message shape consumed by the quorum logic
//!
//! The quorum logic only ever reads the sender; payloads stay opaque.

use bytes::Bytes;
use std::sync::Arc;

use crate::types::address::Address;

/// View number within a height
pub type Round = u64;

/// Block height
pub type Height = u64;

/// Anything carrying the address of the validator that sent it
pub trait MessageSender {
    fn sender(&self) -> &Address;
}

/// A received consensus message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusMessage {
    /// Sender address
    pub from: Address,
    /// Height the message belongs to
    pub height: Height,
    /// Round the message belongs to
    pub round: Round,
    /// Opaque payload
    pub payload: Bytes,
}

impl ConsensusMessage {
    /// Create a message with an empty payload
    pub fn new(from: impl Into<Address>, height: Height, round: Round) -> Self {
        Self {
            from: from.into(),
            height,
            round,
            payload: Bytes::new(),
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }
}

impl MessageSender for ConsensusMessage {
    fn sender(&self) -> &Address {
        &self.from
    }
}

impl<T: MessageSender + ?Sized> MessageSender for &T {
    fn sender(&self) -> &Address {
        (**self).sender()
    }
}

impl<T: MessageSender + ?Sized> MessageSender for Arc<T> {
    fn sender(&self) -> &Address {
        (**self).sender()
    }
}

impl<T: MessageSender + ?Sized> MessageSender for Box<T> {
    fn sender(&self) -> &Address {
        (**self).sender()
    }
}
