//! Sender sets
//!
//! Quorum is evaluated over distinct senders, never over message counts.

use std::collections::HashSet;

use ibft_common::{Address, MessageSender};

/// Distinct sender addresses
pub type SenderSet = HashSet<Address>;

/// Collect the distinct senders of `messages`
pub fn sender_set<I>(messages: I) -> SenderSet
where
    I: IntoIterator,
    I::Item: MessageSender,
{
    messages
        .into_iter()
        .map(|msg| msg.sender().clone())
        .collect()
}
