//! Config-driven validator backend
//!
//! Serves validator sets from a [`ValidatorSetConfig`]. Useful for devnets and
//! tests where the validator set is fixed ahead of time.

use async_trait::async_trait;
use ibft_common::{Address, BackendError, Height, Result, ValidatorWeightSet};

use crate::config::ValidatorSetConfig;
use crate::validator::ValidatorBackend;

/// Validator backend backed by a static epoch schedule
#[derive(Debug, Clone)]
pub struct StaticValidatorBackend {
    config: ValidatorSetConfig,
}

impl StaticValidatorBackend {
    /// Create a backend, validating the epoch schedule
    pub fn new(config: ValidatorSetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ValidatorSetConfig {
        &self.config
    }
}

#[async_trait]
impl ValidatorBackend for StaticValidatorBackend {
    async fn get_voting_powers(
        &self,
        height: Height,
    ) -> std::result::Result<ValidatorWeightSet, BackendError> {
        self.config
            .epoch_at(height)
            .map(|epoch| epoch.weights())
            .ok_or(BackendError::UnknownHeight(height))
    }

    async fn get_miner_address(&self) -> std::result::Result<Address, BackendError> {
        Ok(self.config.miner_address.clone())
    }
}
