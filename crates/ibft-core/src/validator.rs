//! Validator manager
//!
//! Holds the validator weights and quorum threshold for the current height and
//! answers quorum questions against them.
//!
//! Weights and threshold live together in one immutable [`VotingPowerSnapshot`].
//! `initialize` builds the next snapshot completely before publishing it with a
//! single pointer swap, so a reader sees either the old pair or the new pair,
//! never a mix. The backend is queried before any lock is taken; a slow or
//! failing backend never stalls quorum queries against the current snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use ibft_common::{
    Address, BackendError, Height, IbftError, MessageSender, Result, ValidatorWeightSet,
    VotingPower,
};
use num_traits::Zero;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::logger::{ConsensusLogger, TracingLogger};
use crate::quorum::{aggregate_voting_power, meets_quorum, quorum_threshold, total_voting_power};
use crate::senders::{sender_set, SenderSet};

/// Source of validator sets and of the local validator's address
#[async_trait]
pub trait ValidatorBackend: Send + Sync {
    /// Complete validator weight set for `height`.
    ///
    /// Must be a deterministic function of the height across honest nodes.
    async fn get_voting_powers(
        &self,
        height: Height,
    ) -> std::result::Result<ValidatorWeightSet, BackendError>;

    /// Address of the local validator
    async fn get_miner_address(&self) -> std::result::Result<Address, BackendError>;
}

/// Validator weights for one height together with the quorum derived from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingPowerSnapshot {
    height: Height,
    weights: ValidatorWeightSet,
    total: VotingPower,
    threshold: VotingPower,
}

impl VotingPowerSnapshot {
    /// Build a snapshot, rejecting weight sets whose total power is zero
    pub fn new(height: Height, weights: ValidatorWeightSet) -> Result<Self> {
        let total = total_voting_power(&weights);
        if total.is_zero() {
            return Err(IbftError::VotingPowerNotPositive { height });
        }

        let threshold = quorum_threshold(&total);
        Ok(Self {
            height,
            weights,
            total,
            threshold,
        })
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn weights(&self) -> &ValidatorWeightSet {
        &self.weights
    }

    pub fn total(&self) -> &VotingPower {
        &self.total
    }

    pub fn threshold(&self) -> &VotingPower {
        &self.threshold
    }

    pub fn voting_power_of(&self, address: &Address) -> Option<&VotingPower> {
        self.weights.get(address)
    }

    /// Whether the combined power of `senders` reaches the threshold
    pub fn has_quorum(&self, senders: &SenderSet) -> bool {
        let power = aggregate_voting_power(&self.weights, senders);
        meets_quorum(&power, &self.threshold)
    }
}

/// Thread-safe holder of the current height's validator weights
pub struct ValidatorManager {
    /// `None` until the first successful `initialize`
    snapshot: RwLock<Option<Arc<VotingPowerSnapshot>>>,
    /// Fixed at construction
    miner_address: Address,
    backend: Arc<dyn ValidatorBackend>,
    pub(crate) logger: Arc<dyn ConsensusLogger>,
}

impl ValidatorManager {
    /// Create a manager, fetching the local validator address from `backend`
    pub async fn new(backend: Arc<dyn ValidatorBackend>) -> Result<Self> {
        let miner_address = backend.get_miner_address().await?;
        debug!(miner = %miner_address, "Validator manager created");

        Ok(Self {
            snapshot: RwLock::new(None),
            miner_address,
            backend,
            logger: Arc::new(TracingLogger),
        })
    }

    /// Replace the diagnostic sink
    pub fn with_logger(mut self, logger: Arc<dyn ConsensusLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Load the validator set for `height` and install it.
    ///
    /// On any error the previously installed snapshot is kept.
    #[instrument(skip(self))]
    pub async fn initialize(&self, height: Height) -> Result<()> {
        let weights = match self.backend.get_voting_powers(height).await {
            Ok(weights) => weights,
            Err(e) => {
                warn!(height, error = %e, "Failed to fetch voting powers");
                return Err(e.into());
            }
        };

        let snapshot = match VotingPowerSnapshot::new(height, weights) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(height, "Rejecting validator set with zero total voting power");
                return Err(e);
            }
        };

        info!(
            height,
            validators = snapshot.weights.len(),
            total = %snapshot.total,
            threshold = %snapshot.threshold,
            "Installed validator set"
        );

        *self.snapshot.write() = Some(Arc::new(snapshot));
        Ok(())
    }

    /// Whether `senders` together hold quorum for the installed height.
    ///
    /// Always false before the first successful `initialize`.
    pub fn has_quorum(&self, senders: &SenderSet) -> bool {
        match self.snapshot() {
            Some(snapshot) => snapshot.has_quorum(senders),
            None => false,
        }
    }

    /// Quorum check over the distinct senders of `messages`
    pub fn has_quorum_for<I>(&self, messages: I) -> bool
    where
        I: IntoIterator,
        I::Item: MessageSender,
    {
        self.has_quorum(&sender_set(messages))
    }

    /// Currently installed snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<VotingPowerSnapshot>> {
        self.snapshot.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Local validator address
    pub fn miner_address(&self) -> &Address {
        &self.miner_address
    }

    /// Height of the installed validator set
    pub fn height(&self) -> Option<Height> {
        self.snapshot().map(|s| s.height)
    }

    pub fn quorum_threshold(&self) -> Option<VotingPower> {
        self.snapshot().map(|s| s.threshold.clone())
    }

    pub fn total_voting_power(&self) -> Option<VotingPower> {
        self.snapshot().map(|s| s.total.clone())
    }

    pub fn voting_power_of(&self, address: &Address) -> Option<VotingPower> {
        self.snapshot()
            .and_then(|s| s.voting_power_of(address).cloned())
    }
}

impl std::fmt::Debug for ValidatorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorManager")
            .field("miner_address", &self.miner_address)
            .field("snapshot", &*self.snapshot.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use num_bigint::BigUint;
    use std::collections::HashMap;

    /// Backend serving fixed weight sets keyed by height
    pub(crate) struct MockBackend {
        pub miner: std::result::Result<Address, BackendError>,
        pub heights: parking_lot::Mutex<HashMap<Height, ValidatorWeightSet>>,
    }

    impl MockBackend {
        pub fn new(miner: Address) -> Self {
            Self {
                miner: Ok(miner),
                heights: parking_lot::Mutex::new(HashMap::new()),
            }
        }

        pub fn with_height(self, height: Height, entries: &[(u8, u64)]) -> Self {
            self.heights.lock().insert(height, weights(entries));
            self
        }
    }

    #[async_trait]
    impl ValidatorBackend for MockBackend {
        async fn get_voting_powers(
            &self,
            height: Height,
        ) -> std::result::Result<ValidatorWeightSet, BackendError> {
            self.heights
                .lock()
                .get(&height)
                .cloned()
                .ok_or(BackendError::UnknownHeight(height))
        }

        async fn get_miner_address(&self) -> std::result::Result<Address, BackendError> {
            self.miner.clone()
        }
    }

    pub(crate) fn addr(b: u8) -> Address {
        Address::from([b])
    }

    pub(crate) fn weights(entries: &[(u8, u64)]) -> ValidatorWeightSet {
        entries
            .iter()
            .map(|(a, p)| (addr(*a), BigUint::from(*p)))
            .collect()
    }

    pub(crate) fn senders(addrs: &[u8]) -> SenderSet {
        addrs.iter().map(|a| addr(*a)).collect()
    }

    #[tokio::test]
    async fn test_new_stores_miner_address() {
        let backend = Arc::new(MockBackend::new(addr(42)));
        let manager = ValidatorManager::new(backend).await.unwrap();

        assert_eq!(manager.miner_address(), &addr(42));
        assert!(!manager.is_initialized());
    }

    #[tokio::test]
    async fn test_new_propagates_backend_failure() {
        let backend = Arc::new(MockBackend {
            miner: Err(BackendError::Unavailable("rpc down".into())),
            heights: Default::default(),
        });

        let err = ValidatorManager::new(backend).await.unwrap_err();
        assert!(matches!(
            err,
            IbftError::Backend(BackendError::Unavailable(ref msg)) if msg == "rpc down"
        ));
    }

    #[tokio::test]
    async fn test_uninitialized_has_no_quorum() {
        let backend = Arc::new(MockBackend::new(addr(1)));
        let manager = ValidatorManager::new(backend).await.unwrap();

        assert!(!manager.has_quorum(&SenderSet::new()));
        assert!(!manager.has_quorum(&senders(&[1, 2, 3, 4, 5])));
        assert_eq!(manager.quorum_threshold(), None);
    }

    #[tokio::test]
    async fn test_equal_weights() {
        let backend = Arc::new(MockBackend::new(addr(1)).with_height(1, &[(1, 1), (2, 1), (3, 1)]));
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();

        assert_eq!(manager.quorum_threshold(), Some(BigUint::from(3u32)));
        assert!(!manager.has_quorum(&senders(&[1])));
        assert!(!manager.has_quorum(&senders(&[1, 2])));
        assert!(manager.has_quorum(&senders(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_weighted_validators() {
        let backend =
            Arc::new(MockBackend::new(addr(1)).with_height(1, &[(1, 10), (2, 1), (3, 1)]));
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();

        assert_eq!(manager.total_voting_power(), Some(BigUint::from(12u32)));
        assert_eq!(manager.quorum_threshold(), Some(BigUint::from(9u32)));
        assert!(manager.has_quorum(&senders(&[1])));
        assert!(!manager.has_quorum(&senders(&[2, 3])));
    }

    #[tokio::test]
    async fn test_unknown_senders_ignored() {
        let backend = Arc::new(MockBackend::new(addr(1)).with_height(1, &[(1, 1), (2, 1), (3, 1)]));
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();

        assert_eq!(
            manager.has_quorum(&senders(&[1, 2, 26])),
            manager.has_quorum(&senders(&[1, 2]))
        );
        assert!(!manager.has_quorum(&senders(&[1, 2, 26])));
        assert_eq!(manager.voting_power_of(&addr(26)), None);
    }

    #[tokio::test]
    async fn test_zero_total_keeps_previous_snapshot() {
        let backend = Arc::new(
            MockBackend::new(addr(1))
                .with_height(1, &[(1, 1), (2, 1), (3, 1)])
                .with_height(2, &[(1, 0), (2, 0)])
                .with_height(3, &[]),
        );
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();

        for height in [2, 3] {
            let err = manager.initialize(height).await.unwrap_err();
            assert!(matches!(err, IbftError::VotingPowerNotPositive { height: h } if h == height));
        }

        assert_eq!(manager.height(), Some(1));
        assert_eq!(manager.quorum_threshold(), Some(BigUint::from(3u32)));
        assert!(manager.has_quorum(&senders(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_zero_total_on_fresh_manager_stays_uninitialized() {
        let backend = Arc::new(MockBackend::new(addr(1)).with_height(1, &[]));
        let manager = ValidatorManager::new(backend).await.unwrap();

        assert!(manager.initialize(1).await.is_err());
        assert!(!manager.is_initialized());
        assert!(!manager.has_quorum(&SenderSet::new()));
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_previous_snapshot() {
        let backend = Arc::new(MockBackend::new(addr(1)).with_height(1, &[(1, 5)]));
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();

        let err = manager.initialize(9).await.unwrap_err();
        assert!(matches!(err, IbftError::Backend(BackendError::UnknownHeight(9))));
        assert_eq!(manager.height(), Some(1));
        assert!(manager.has_quorum(&senders(&[1])));
    }

    #[tokio::test]
    async fn test_reinitialize_replaces_weights_wholesale() {
        let backend = Arc::new(
            MockBackend::new(addr(1))
                .with_height(1, &[(1, 1), (2, 1), (3, 1)])
                .with_height(2, &[(4, 1), (5, 1)]),
        );
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();
        manager.initialize(2).await.unwrap();

        assert_eq!(manager.voting_power_of(&addr(1)), None);
        assert!(!manager.has_quorum(&senders(&[1, 2, 3])));
        assert!(manager.has_quorum(&senders(&[4, 5])));
    }

    #[tokio::test]
    async fn test_has_quorum_for_messages_counts_distinct_senders() {
        use ibft_common::ConsensusMessage;

        let backend = Arc::new(MockBackend::new(addr(1)).with_height(1, &[(1, 1), (2, 1), (3, 1)]));
        let manager = ValidatorManager::new(backend).await.unwrap();
        manager.initialize(1).await.unwrap();

        let repeated: Vec<_> = (0..5).map(|r| ConsensusMessage::new([1u8], 1, r)).collect();
        assert!(!manager.has_quorum_for(&repeated));

        let all: Vec<_> = [1u8, 2, 3].iter().map(|a| ConsensusMessage::new([*a], 1, 0)).collect();
        assert!(manager.has_quorum_for(&all));
    }
}
