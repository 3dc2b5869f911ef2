//! Voting power types
//!
//! Voting power is an unbounded non-negative integer. Aggregating weights or
//! doubling a total can never overflow.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::types::address::Address;

/// Validator weight
pub type VotingPower = BigUint;

/// Validator addresses and their voting power for a single height
pub type ValidatorWeightSet = HashMap<Address, VotingPower>;

/// Parse a decimal voting power string
pub fn parse_voting_power(s: &str) -> Option<VotingPower> {
    s.trim().parse::<BigUint>().ok()
}

/// Serde adapter writing voting power as a decimal string.
///
/// JSON numbers lose precision past 2^53, so validator files carry powers as strings.
pub mod decimal {
    use super::VotingPower;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(power: &VotingPower, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&power.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<VotingPower, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_voting_power(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid voting power: {s:?}")))
    }
}
