//! Block implementation for the ledger
//!
//! A block is an ordered list of transactions, a nonce and the hash of the
//! block before it. Validity is recomputed from the current fields on every
//! check; nothing about a block's hash is cached.

use crate::core::transaction::Transaction;
use crate::crypto::{meets_target, zero_hash, Canonical, HASH_STRING_SIZE};
use crate::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A group of transactions secured by proof of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    nonce: u64,
    transactions: Vec<Transaction>,
    previous_hash: String,
    timestamp: DateTime<Utc>,
}

impl Block {
    /// Create a block and validate it against `target`
    ///
    /// Construction only succeeds when the nonce already satisfies the
    /// proof of work, so callers normally obtain blocks from the miner.
    pub fn new(
        nonce: u64,
        transactions: Vec<Transaction>,
        previous_hash: &str,
        timestamp: DateTime<Utc>,
        target: usize,
    ) -> LedgerResult<Self> {
        let block = Self {
            nonce,
            transactions,
            previous_hash: previous_hash.to_string(),
            timestamp,
        };

        if !block.is_valid(target) {
            return Err(LedgerError::InvalidData);
        }

        Ok(block)
    }

    /// Unvalidated scratch block used as a mining seed
    pub fn empty() -> Self {
        Self {
            nonce: 0,
            transactions: Vec::new(),
            previous_hash: zero_hash(),
            timestamp: DateTime::<Utc>::default(),
        }
    }

    /// Append a transaction if it is valid
    pub fn add_transaction(&mut self, tx: Transaction) -> LedgerResult<()> {
        if !tx.is_valid() {
            return Err(LedgerError::InvalidData);
        }

        self.transactions.push(tx);
        Ok(())
    }

    /// SHA-512 hex hash over the block's canonical serialization
    pub fn hash(&self) -> LedgerResult<String> {
        self.canonical_hash()
    }

    /// Check transactions, previous hash length and proof of work
    pub fn is_valid(&self, target: usize) -> bool {
        if !self.transactions.iter().all(Transaction::is_valid) {
            return false;
        }

        if self.previous_hash.len() != HASH_STRING_SIZE {
            return false;
        }

        matches!(self.hash(), Ok(hash) if meets_target(&hash, target))
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    // Search state is only touched by the miner before a block is committed.

    pub(crate) fn set_previous_hash(&mut self, previous_hash: String) {
        self.previous_hash = previous_hash;
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = timestamp;
    }

    pub(crate) fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub(crate) fn bump_nonce(&mut self) {
        self.nonce = self.nonce.wrapping_add(1);
    }

    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }
}

impl Canonical for Block {}
