//! Blockchain implementation
//!
//! The main ledger struct: an ordered list of blocks, a pool of pending
//! transactions, a chain identifier and known peers.
//!
//! Validation is split in two tiers. `add_block` only checks that a block
//! is valid on its own; linkage between blocks is checked by `is_valid`,
//! which scans the whole chain.

use crate::core::block::Block;
use crate::core::config::ChainConfig;
use crate::core::transaction::Transaction;
use crate::crypto::{sha512_hex, zero_hash, Canonical};
use crate::error::{LedgerError, LedgerResult};
use crate::mining::{solve, Miner, PoolSource};
use crate::network::Peer;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Nonce the genesis search starts from
pub const GENESIS_START_NONCE: u64 = 13466;

/// Sender and recipient of the genesis transaction, recipient of rewards
pub const ROOT_ADDRESS: &str = "root";

/// Message of the genesis transaction
pub const GENESIS_MESSAGE: &str = "GENESIS";

/// Message of every mining reward transaction
pub const REWARD_MESSAGE: &str = "MINED";

/// A chain of blocks linked by hash, with its pending transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockchain {
    blocks: Vec<Block>,
    transaction_pool: Vec<Transaction>,
    chain_id: String,
    peers: Vec<Peer>,
    #[serde(skip)]
    creation_time: DateTime<Utc>,
    #[serde(skip)]
    config: ChainConfig,
    /// Bumped on every pool mutation so a live-read miner can spot changes
    #[serde(skip)]
    pool_revision: u64,
}

impl Blockchain {
    /// Create a new blockchain with a mined genesis block
    ///
    /// The genesis block has fixed contents, so every chain built with the
    /// same target starts from the same block. The chain id is derived from
    /// the creation time and the genesis nonce. Configs that fail
    /// `ChainConfig::validate` are rejected before any work is done.
    pub fn new(config: ChainConfig) -> LedgerResult<Self> {
        config.validate()?;
        let genesis = Self::genesis_block(config.target)?;
        let creation_time = Utc::now();
        let chain_id: String =
            sha512_hex(format!("{}{}", creation_time, genesis.nonce()).as_bytes())
                .chars()
                .take(config.id_length)
                .collect();

        info!(
            "Created chain {} (genesis nonce {}, target {})",
            chain_id,
            genesis.nonce(),
            config.target
        );

        Ok(Self {
            blocks: vec![genesis],
            transaction_pool: Vec::new(),
            chain_id,
            peers: Vec::new(),
            creation_time,
            config,
            pool_revision: 0,
        })
    }

    /// Create a blockchain with a custom identifier
    ///
    /// The identifier is not checked here; one of the wrong length makes
    /// `is_valid` fail.
    pub fn with_identifier(config: ChainConfig, id: &str) -> LedgerResult<Self> {
        let mut chain = Self::new(config)?;
        chain.chain_id = id.to_string();
        Ok(chain)
    }

    /// Create a blockchain with custom difficulty and default settings
    pub fn with_difficulty(target: usize) -> LedgerResult<Self> {
        Self::new(ChainConfig::with_target(target))
    }

    /// Build the genesis block for `target`
    pub fn genesis_block(target: usize) -> LedgerResult<Block> {
        let epoch = DateTime::<Utc>::default();
        let genesis_tx = Transaction::new(ROOT_ADDRESS, ROOT_ADDRESS, GENESIS_MESSAGE, epoch)?;

        let mut seed = Block::empty();
        seed.set_nonce(GENESIS_START_NONCE);
        seed.add_transaction(genesis_tx)?;

        solve(seed, target)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn transaction_pool(&self) -> &[Transaction] {
        &self.transaction_pool
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Time this chain object was created
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    /// Get the latest block
    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Hash of the latest block, which the next block must point to
    pub fn tip_hash(&self) -> LedgerResult<String> {
        self.last_block().ok_or(LedgerError::InvalidData)?.hash()
    }

    /// Get blockchain height (genesis is height 0)
    pub fn height(&self) -> u64 {
        self.blocks.len().saturating_sub(1) as u64
    }

    /// Add a transaction to the pool; no duplicate check
    pub fn add_transaction(&mut self, tx: Transaction) -> LedgerResult<()> {
        if !tx.is_valid() {
            warn!("Rejected invalid transaction");
            return Err(LedgerError::InvalidData);
        }

        debug!("Pooled transaction from {} to {}", tx.sender(), tx.recipient());
        self.transaction_pool.push(tx);
        self.pool_revision += 1;
        Ok(())
    }

    /// Merge candidate transactions into the pool, skipping known ones
    ///
    /// The batch is all-or-nothing on validity: one invalid candidate
    /// rejects every candidate. Returns true if anything was added.
    pub fn resolve_transactions(&mut self, candidates: &[Transaction]) -> bool {
        let mut fingerprints = Vec::with_capacity(candidates.len());
        for tx in candidates {
            if !tx.is_valid() {
                warn!("Rejected transaction batch of {}", candidates.len());
                return false;
            }
            match tx.fingerprint() {
                Ok(fingerprint) => fingerprints.push(fingerprint),
                Err(_) => return false,
            }
        }

        let mut known: HashSet<String> = self
            .transaction_pool
            .iter()
            .filter_map(|tx| tx.fingerprint().ok())
            .collect();

        let mut added = 0usize;
        for (tx, fingerprint) in candidates.iter().zip(fingerprints) {
            if known.insert(fingerprint) {
                self.transaction_pool.push(tx.clone());
                added += 1;
            }
        }

        if added > 0 {
            self.pool_revision += 1;
            debug!("Resolved {} new of {} transactions", added, candidates.len());
        }

        added > 0
    }

    /// Add a peer after validating it
    pub fn add_peer(&mut self, peer: Peer) -> LedgerResult<()> {
        if !peer.is_valid() {
            warn!("Rejected invalid peer {}", peer);
            return Err(LedgerError::InvalidData);
        }

        self.peers.push(peer);
        Ok(())
    }

    /// The reward transaction credited to this chain for a mined block
    pub fn reward_transaction(&self) -> LedgerResult<Transaction> {
        Transaction::new_now(ROOT_ADDRESS, &self.chain_id, REWARD_MESSAGE)
    }

    /// A miner configured from this chain's settings
    pub fn miner(&self) -> Miner {
        Miner::new(self.config.target, self.config.mining_policy)
    }

    /// Mine the next block from the pool without changing the chain
    pub fn mine_new_block(&self) -> LedgerResult<Block> {
        let previous_hash = self.tip_hash()?;
        let reward = self.reward_transaction()?;
        let (block, _stats) = self.miner().mine(self, &previous_hash, &reward)?;
        Ok(block)
    }

    /// Mine the next block, flush the pool and append the block
    ///
    /// Nothing is persisted; a crash between mining and appending loses the
    /// mined block.
    pub fn mine_new_block_and_apply(&mut self) -> LedgerResult<&Block> {
        let block = self.mine_new_block()?;

        self.transaction_pool.clear();
        self.pool_revision += 1;
        self.blocks.push(block);

        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Append a block that is valid on its own
    ///
    /// Linkage to the current tip is not checked here; see `is_valid`.
    pub fn add_block(&mut self, block: Block) -> LedgerResult<()> {
        if !block.is_valid(self.config.target) {
            warn!("Rejected invalid block with nonce {}", block.nonce());
            return Err(LedgerError::InvalidData);
        }

        self.blocks.push(block);
        Ok(())
    }

    /// Append a block mined while the pool stayed open to submissions
    ///
    /// Unlike `add_block` this requires the block to extend the current
    /// tip. Only the transactions the block carries leave the pool, so
    /// anything submitted after the winning iteration stays pending.
    pub fn commit_mined_block(&mut self, block: Block) -> LedgerResult<()> {
        if !block.is_valid(self.config.target) {
            warn!("Rejected invalid mined block");
            return Err(LedgerError::InvalidData);
        }

        if block.previous_hash() != self.tip_hash()? {
            warn!("Rejected stale mined block; tip moved during the search");
            return Err(LedgerError::InvalidData);
        }

        let mined: HashSet<String> = block
            .transactions()
            .iter()
            .map(Transaction::fingerprint)
            .collect::<LedgerResult<_>>()?;

        let before = self.transaction_pool.len();
        self.transaction_pool
            .retain(|tx| tx.fingerprint().map_or(true, |f| !mined.contains(&f)));
        if self.transaction_pool.len() != before {
            self.pool_revision += 1;
        }

        self.blocks.push(block);
        Ok(())
    }

    /// Replace local blocks with `other`'s if it is longer and valid
    ///
    /// Length alone decides between valid chains; accumulated work is not
    /// compared and the pool is left as is. `other` is validated under this
    /// chain's configuration.
    pub fn resolve_chain(&mut self, other: &Blockchain) -> bool {
        if other.blocks.len() > self.blocks.len() && other.is_valid_with(&self.config) {
            info!(
                "Replacing {} local blocks with {} blocks from chain {}",
                self.blocks.len(),
                other.blocks.len(),
                other.chain_id
            );
            self.blocks = other.blocks.clone();
            return true;
        }

        false
    }

    /// Validate the entire chain under its own configuration
    pub fn is_valid(&self) -> bool {
        self.is_valid_with(&self.config)
    }

    /// Validate the entire chain under `config`
    ///
    /// A chain needs at least its genesis block. Every block must be valid,
    /// the first must point at the zero hash and every later one at the
    /// hash of its predecessor. Pool transactions must be valid and the
    /// chain id must have the configured length.
    pub fn is_valid_with(&self, config: &ChainConfig) -> bool {
        if self.blocks.is_empty() {
            return false;
        }

        let mut expected_previous = zero_hash();
        for block in &self.blocks {
            if !block.is_valid(config.target) || block.previous_hash() != expected_previous {
                return false;
            }

            expected_previous = match block.hash() {
                Ok(hash) => hash,
                Err(_) => return false,
            };
        }

        if !self.transaction_pool.iter().all(Transaction::is_valid) {
            return false;
        }

        self.chain_id.len() == config.id_length
    }

    /// All committed transactions in block order, pool excluded
    pub fn verified_transactions(&self) -> Vec<Transaction> {
        self.blocks
            .iter()
            .flat_map(|block| block.transactions().iter().cloned())
            .collect()
    }

    /// Get chain statistics
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            height: self.height(),
            total_blocks: self.blocks.len() as u64,
            total_transactions: self.blocks.iter().map(|b| b.tx_count() as u64).sum(),
            pending_transactions: self.transaction_pool.len() as u64,
            peers: self.peers.len() as u64,
            target: self.config.target,
            latest_hash: self.tip_hash().unwrap_or_default(),
        }
    }
}

impl Canonical for Blockchain {}

impl PoolSource for Blockchain {
    fn read_pool(&self) -> (u64, Vec<Transaction>) {
        (self.pool_revision, self.transaction_pool.clone())
    }

    fn read_pool_since(&self, revision: u64) -> Option<(u64, Vec<Transaction>)> {
        (self.pool_revision != revision).then(|| self.read_pool())
    }
}

/// Chain statistics
#[derive(Debug, Clone)]
pub struct ChainStats {
    pub height: u64,
    pub total_blocks: u64,
    pub total_transactions: u64,
    pub pending_transactions: u64,
    pub peers: u64,
    pub target: usize,
    pub latest_hash: String,
}
