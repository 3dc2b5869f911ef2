//! Quorum arithmetic
//!
//! Pure functions over validator weights. The Byzantine quorum for a total
//! voting power `T` is `floor(2T / 3) + 1`: any two quorums overlap in at least
//! one honest validator as long as at most `floor((T - 1) / 3)` of the weight
//! is faulty.

use ibft_common::{Address, ValidatorWeightSet, VotingPower};
use num_traits::Zero;

/// Sum of every validator's voting power. An empty set yields zero.
pub fn total_voting_power(weights: &ValidatorWeightSet) -> VotingPower {
    weights.values().sum()
}

/// Minimum aggregate power for quorum: `floor(2 * total / 3) + 1`.
///
/// Undefined for a zero total; callers reject that case before deriving a threshold.
pub fn quorum_threshold(total: &VotingPower) -> VotingPower {
    (total * 2u32) / 3u32 + 1u32
}

/// Combined power of `senders` that appear in `weights`.
///
/// Unknown addresses contribute nothing.
pub fn aggregate_voting_power<'a, I>(weights: &ValidatorWeightSet, senders: I) -> VotingPower
where
    I: IntoIterator<Item = &'a Address>,
{
    senders
        .into_iter()
        .filter_map(|addr| weights.get(addr))
        .fold(VotingPower::zero(), |acc, power| acc + power)
}

/// Whether `power` meets `threshold`. The threshold already carries the `+1`.
pub fn meets_quorum(power: &VotingPower, threshold: &VotingPower) -> bool {
    power >= threshold
}
