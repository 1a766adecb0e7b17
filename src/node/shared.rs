//! Shared ledger handle for concurrent hosts
//!
//! Wraps a `Blockchain` in `Arc<RwLock<_>>` so a mining thread and request
//! handlers can work on the same chain. The miner never holds the lock
//! while hashing: each pool read takes a short read lock, and the commit
//! takes the write lock once a nonce is found.

use crate::core::{Block, Blockchain, Transaction};
use crate::error::LedgerResult;
use crate::mining::{Miner, MiningStats, PoolSource};
use log::info;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle to a chain shared between threads
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Blockchain>>,
}

impl SharedLedger {
    pub fn new(chain: Blockchain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Read access to the chain
    pub fn read(&self) -> RwLockReadGuard<'_, Blockchain> {
        self.inner.read()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Blockchain> {
        self.inner.write()
    }

    /// Clone of the current chain state
    pub fn snapshot(&self) -> Blockchain {
        self.read().clone()
    }

    /// Add a transaction to the pool
    pub fn submit(&self, tx: Transaction) -> LedgerResult<()> {
        self.write().add_transaction(tx)
    }

    /// Merge a batch of transactions received from elsewhere
    pub fn resolve_transactions(&self, candidates: &[Transaction]) -> bool {
        self.write().resolve_transactions(candidates)
    }

    /// Adopt `other`'s blocks if it is longer and valid
    pub fn resolve_chain(&self, other: &Blockchain) -> bool {
        self.write().resolve_chain(other)
    }

    /// A miner configured from the shared chain's settings
    pub fn miner(&self) -> Miner {
        self.read().miner()
    }

    /// Mine on the current tip and commit the result
    pub fn mine_and_commit(&self) -> LedgerResult<(Block, MiningStats)> {
        let miner = self.miner();
        self.mine_and_commit_with(&miner)
    }

    /// Mine with a caller-supplied miner, e.g. one carrying a cancel flag
    ///
    /// Only the transactions in the mined block leave the pool. If another
    /// block landed on the tip during the search the result is rejected as
    /// stale and the chain is left untouched.
    pub fn mine_and_commit_with(&self, miner: &Miner) -> LedgerResult<(Block, MiningStats)> {
        let (previous_hash, reward) = {
            let chain = self.read();
            (chain.tip_hash()?, chain.reward_transaction()?)
        };

        let (block, stats) = miner.mine(self, &previous_hash, &reward)?;

        let mut chain = self.write();
        chain.commit_mined_block(block.clone())?;
        info!(
            "Committed block at height {} with {} transactions",
            chain.height(),
            block.tx_count()
        );

        Ok((block, stats))
    }
}

impl PoolSource for SharedLedger {
    fn read_pool(&self) -> (u64, Vec<Transaction>) {
        self.read().read_pool()
    }

    fn read_pool_since(&self, revision: u64) -> Option<(u64, Vec<Transaction>)> {
        self.read().read_pool_since(revision)
    }
}
