//! Mining engine for the ledger
//!
//! The search is a single-threaded linear walk over nonces. Each iteration
//! bumps the nonce, refreshes the timestamp and, under the live-read
//! policy, picks up any change to the transaction pool before rehashing.

use crate::core::{Block, Transaction};
use crate::crypto::{leading_zeros, HASH_STRING_SIZE};
use crate::error::{LedgerError, LedgerResult};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// How the miner reads the transaction pool while searching
///
/// The policy decides which transactions end up rewarded together: with
/// `LiveRead` a transaction submitted mid-search lands in the block being
/// mined, with `Snapshot` it waits for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningPolicy {
    /// Re-read the pool on every iteration
    #[default]
    LiveRead,
    /// Read the pool once when the search starts
    Snapshot,
}

/// Anything the miner can draw pending transactions from
pub trait PoolSource {
    /// Current pool revision and contents
    fn read_pool(&self) -> (u64, Vec<Transaction>);

    /// Pool contents, only if the revision moved past `revision`
    fn read_pool_since(&self, revision: u64) -> Option<(u64, Vec<Transaction>)>;
}

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
    /// Times the candidate picked up a changed pool mid-search
    pub pool_refreshes: u64,
}

impl MiningStats {
    fn new(hash_attempts: u64, started: Instant, pool_refreshes: u64) -> Self {
        let time_ms = started.elapsed().as_millis();
        let hash_rate = if time_ms > 0 {
            (hash_attempts as f64) / (time_ms as f64 / 1000.0)
        } else {
            hash_attempts as f64
        };

        Self {
            hash_attempts,
            time_ms,
            hash_rate,
            pool_refreshes,
        }
    }
}

/// Proof-of-work searcher for new blocks
#[derive(Debug, Clone)]
pub struct Miner {
    target: usize,
    policy: MiningPolicy,
    cancel: Option<Arc<AtomicBool>>,
}

impl Miner {
    /// Create a new miner
    pub fn new(target: usize, policy: MiningPolicy) -> Self {
        Self {
            target,
            policy,
            cancel: None,
        }
    }

    /// Stop the search once `flag` is set; checked once per iteration
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn policy(&self) -> MiningPolicy {
        self.policy
    }

    /// Mine a block on top of `previous_hash` from the pool plus `reward`
    ///
    /// The search starts at nonce 0 with the current time and runs until a
    /// hash meets the target or the cancel flag is raised. Every pool read
    /// must yield only valid transactions, otherwise the candidate could
    /// never become valid and the search fails with `InvalidData`.
    pub fn mine<P: PoolSource + ?Sized>(
        &self,
        pool: &P,
        previous_hash: &str,
        reward: &Transaction,
    ) -> LedgerResult<(Block, MiningStats)> {
        if self.target > HASH_STRING_SIZE || !reward.is_valid() {
            return Err(LedgerError::InvalidData);
        }

        let started = Instant::now();
        let (mut revision, pending) = pool.read_pool();

        let mut block = Block::empty();
        block.set_previous_hash(previous_hash.to_string());
        block.set_timestamp(Utc::now());
        block.set_transactions(candidate_transactions(pending, reward)?);

        info!(
            "Mining block on {}... with target {} ({:?})",
            previous_hash.get(..16).unwrap_or(previous_hash),
            self.target,
            self.policy
        );

        let mut attempts = 1u64;
        let mut refreshes = 0u64;

        while !block.is_valid(self.target) {
            if self.is_cancelled() {
                info!("Mining cancelled after {} attempts", attempts);
                return Err(LedgerError::MiningCancelled);
            }

            block.bump_nonce();
            block.set_timestamp(Utc::now());

            if self.policy == MiningPolicy::LiveRead {
                if let Some((latest, pending)) = pool.read_pool_since(revision) {
                    debug!("Pool changed mid-search (revision {})", latest);
                    revision = latest;
                    refreshes += 1;
                    block.set_transactions(candidate_transactions(pending, reward)?);
                }
            }

            attempts += 1;
        }

        let stats = MiningStats::new(attempts, started, refreshes);
        let hash = block.hash()?;

        info!(
            "Block mined in {}ms ({} attempts, {:.2} H/s, {} txs, nonce {}, {} leading zeros)",
            stats.time_ms,
            stats.hash_attempts,
            stats.hash_rate,
            block.tx_count(),
            block.nonce(),
            leading_zeros(&hash)
        );

        Ok((block, stats))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Increment the nonce of a fixed block until it meets `target`
///
/// Unlike [`Miner::mine`] nothing but the nonce changes, so the result is
/// fully determined by the starting block.
pub fn solve(mut block: Block, target: usize) -> LedgerResult<Block> {
    if target > HASH_STRING_SIZE || !block.transactions().iter().all(Transaction::is_valid) {
        return Err(LedgerError::InvalidData);
    }

    while !block.is_valid(target) {
        block.bump_nonce();
    }

    Ok(block)
}

/// Pool contents followed by the reward transaction
fn candidate_transactions(
    mut pending: Vec<Transaction>,
    reward: &Transaction,
) -> LedgerResult<Vec<Transaction>> {
    if !pending.iter().all(Transaction::is_valid) {
        return Err(LedgerError::InvalidData);
    }

    pending.push(reward.clone());
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{meets_target, zero_hash};
    use std::cell::{Cell, RefCell};

    /// Pool that gains one transaction after a fixed number of reads
    struct GrowingPool {
        reads: Cell<u64>,
        grow_after: u64,
        txs: RefCell<Vec<Transaction>>,
        revision: Cell<u64>,
    }

    impl GrowingPool {
        fn new(grow_after: u64) -> Self {
            Self {
                reads: Cell::new(0),
                grow_after,
                txs: RefCell::new(vec![tx("first")]),
                revision: Cell::new(0),
            }
        }

        fn tick(&self) {
            self.reads.set(self.reads.get() + 1);
            if self.reads.get() == self.grow_after {
                self.txs.borrow_mut().push(tx("late"));
                self.revision.set(self.revision.get() + 1);
            }
        }
    }

    impl PoolSource for GrowingPool {
        fn read_pool(&self) -> (u64, Vec<Transaction>) {
            self.tick();
            (self.revision.get(), self.txs.borrow().clone())
        }

        fn read_pool_since(&self, revision: u64) -> Option<(u64, Vec<Transaction>)> {
            self.tick();
            (self.revision.get() != revision)
                .then(|| (self.revision.get(), self.txs.borrow().clone()))
        }
    }

    fn tx(message: &str) -> Transaction {
        Transaction::new_now("bob", "alice", message).unwrap()
    }

    fn reward() -> Transaction {
        Transaction::new_now("root", "chain", "MINED").unwrap()
    }

    #[test]
    fn test_mine_meets_target() {
        let pool = GrowingPool::new(u64::MAX);
        let miner = Miner::new(2, MiningPolicy::LiveRead);

        let (block, stats) = miner.mine(&pool, &zero_hash(), &reward()).unwrap();

        assert!(block.is_valid(2));
        assert!(meets_target(&block.hash().unwrap(), 2));
        assert!(leading_zeros(&block.hash().unwrap()) >= 2);
        assert!(stats.hash_attempts >= 1);
        assert_eq!(block.previous_hash(), zero_hash());
    }

    #[test]
    fn test_reward_is_last_transaction() {
        let pool = GrowingPool::new(u64::MAX);
        let miner = Miner::new(1, MiningPolicy::Snapshot);

        let (block, _) = miner.mine(&pool, &zero_hash(), &reward()).unwrap();

        assert_eq!(block.tx_count(), 2);
        assert_eq!(block.transactions()[0].message(), "first");
        assert_eq!(block.transactions()[1].message(), "MINED");
    }

    #[test]
    fn test_live_read_picks_up_new_transactions() {
        // The pool grows on the second read, i.e. the first iteration.
        let pool = GrowingPool::new(2);
        // Target 3 needs thousands of attempts, far more than one.
        let miner = Miner::new(3, MiningPolicy::LiveRead);

        let (block, stats) = miner.mine(&pool, &zero_hash(), &reward()).unwrap();

        let messages: Vec<&str> = block.transactions().iter().map(|t| t.message()).collect();
        if stats.hash_attempts > 1 {
            assert_eq!(messages, vec!["first", "late", "MINED"]);
            assert_eq!(stats.pool_refreshes, 1);
        } else {
            // The very first nonce won before the pool was read again.
            assert_eq!(messages, vec!["first", "MINED"]);
            assert_eq!(stats.pool_refreshes, 0);
        }
    }

    #[test]
    fn test_snapshot_ignores_new_transactions() {
        let pool = GrowingPool::new(2);
        let miner = Miner::new(3, MiningPolicy::Snapshot);

        let (block, stats) = miner.mine(&pool, &zero_hash(), &reward()).unwrap();

        let messages: Vec<&str> = block.transactions().iter().map(|t| t.message()).collect();
        assert_eq!(messages, vec!["first", "MINED"]);
        assert_eq!(stats.pool_refreshes, 0);
    }

    #[test]
    fn test_cancelled_search_stops() {
        let pool = GrowingPool::new(u64::MAX);
        let flag = Arc::new(AtomicBool::new(true));
        // An all-zero digest never turns up, so only the flag ends the search.
        let miner = Miner::new(HASH_STRING_SIZE, MiningPolicy::LiveRead).with_cancel(flag);

        let result = miner.mine(&pool, &zero_hash(), &reward());
        assert!(matches!(result, Err(LedgerError::MiningCancelled)));
    }

    #[test]
    fn test_unreachable_target_rejected() {
        let pool = GrowingPool::new(u64::MAX);
        let miner = Miner::new(HASH_STRING_SIZE + 1, MiningPolicy::LiveRead);

        let result = miner.mine(&pool, &zero_hash(), &reward());
        assert!(matches!(result, Err(LedgerError::InvalidData)));
    }

    #[test]
    fn test_solve_only_changes_nonce() {
        let mut seed = Block::empty();
        seed.add_transaction(tx("fixed")).unwrap();
        seed.set_nonce(100);

        let solved = solve(seed.clone(), 2).unwrap();

        assert!(solved.is_valid(2));
        assert!(solved.nonce() >= 100);
        assert_eq!(solved.transactions(), seed.transactions());
        assert_eq!(solved.timestamp(), seed.timestamp());
        assert_eq!(solve(seed, 2).unwrap(), solved);
    }
}
