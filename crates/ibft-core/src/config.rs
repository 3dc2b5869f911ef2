//! Validator set configuration
//!
//! A JSON document listing the local validator address and the validator
//! weights in force from each starting height:
//!
//! ```json
//! {
//!   "miner_address": "0x01",
//!   "epochs": [
//!     { "start_height": 0,   "validators": { "0x01": "1", "0x02": "1", "0x03": "1" } },
//!     { "start_height": 100, "validators": { "0x01": "10", "0x02": "1", "0x03": "1" } }
//!   ]
//! }
//! ```
//!
//! Voting powers are decimal strings so values beyond 2^53 survive JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ibft_common::types::voting_power::decimal;
use ibft_common::{Address, Height, IbftError, Result, ValidatorWeightSet, VotingPower};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::error::Category;
use tracing::debug;

/// Env var naming the validator set file
pub const VALIDATOR_SET_PATH_ENV: &str = "IBFT_VALIDATOR_SET";

/// Env var overriding the configured miner address
pub const MINER_ADDRESS_ENV: &str = "IBFT_MINER_ADDRESS";

/// Validator weights in force from `start_height` until the next epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochConfig {
    pub start_height: Height,
    #[serde(deserialize_with = "deserialize_validators")]
    pub validators: BTreeMap<Address, PowerEntry>,
}

/// Reads the validator map, rejecting keys that spell the same address twice
/// (`"0x0a"` and `"0A"` decode to identical bytes).
fn deserialize_validators<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<Address, PowerEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ValidatorsVisitor;

    impl<'de> Visitor<'de> for ValidatorsVisitor {
        type Value = BTreeMap<Address, PowerEntry>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of validator address to voting power")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut validators = BTreeMap::new();
            while let Some((address, power)) = map.next_entry::<Address, PowerEntry>()? {
                if validators.contains_key(&address) {
                    return Err(de::Error::custom(format!(
                        "duplicate validator address {}",
                        address
                    )));
                }
                validators.insert(address, power);
            }
            Ok(validators)
        }
    }

    deserializer.deserialize_map(ValidatorsVisitor)
}

/// Voting power serialized as a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerEntry(#[serde(with = "decimal")] pub VotingPower);

impl EpochConfig {
    /// Weight set described by this epoch
    pub fn weights(&self) -> ValidatorWeightSet {
        self.validators
            .iter()
            .map(|(addr, power)| (addr.clone(), power.0.clone()))
            .collect()
    }
}

/// Static validator set configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetConfig {
    /// Local validator address
    pub miner_address: Address,
    /// Epochs ordered by start height, the first starting at genesis
    pub epochs: Vec<EpochConfig>,
}

impl ValidatorSetConfig {
    /// Parse and validate a JSON document.
    ///
    /// Malformed JSON is a `Serialization` error; well-formed JSON with invalid
    /// contents is a `Config` error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => IbftError::Config(e.to_string()),
            _ => IbftError::from(e),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            IbftError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded validator set config");
        Self::from_json_str(&json)
    }

    /// Load from the file named by `IBFT_VALIDATOR_SET`, honouring a `.env` file
    pub fn load_from_env() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path = std::env::var(VALIDATOR_SET_PATH_ENV)
            .map_err(|_| IbftError::Config(format!("{} is not set", VALIDATOR_SET_PATH_ENV)))?;
        let mut cfg = Self::load(path)?;

        if let Ok(miner) = std::env::var(MINER_ADDRESS_ENV) {
            cfg.miner_address = miner.parse()?;
        }

        Ok(cfg)
    }

    /// Check epoch ordering
    pub fn validate(&self) -> Result<()> {
        let first = self
            .epochs
            .first()
            .ok_or_else(|| IbftError::Config("at least one epoch is required".to_string()))?;

        if first.start_height != 0 {
            return Err(IbftError::Config(format!(
                "first epoch must start at height 0, got {}",
                first.start_height
            )));
        }

        for pair in self.epochs.windows(2) {
            if pair[1].start_height <= pair[0].start_height {
                return Err(IbftError::Config(format!(
                    "epochs out of order: {} follows {}",
                    pair[1].start_height, pair[0].start_height
                )));
            }
        }

        Ok(())
    }

    /// Epoch in force at `height`
    pub fn epoch_at(&self, height: Height) -> Option<&EpochConfig> {
        self.epochs
            .iter()
            .rev()
            .find(|epoch| epoch.start_height <= height)
    }
}
