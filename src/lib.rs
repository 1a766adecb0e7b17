//! Pow-Ledger: a minimal proof-of-work ledger in Rust
//!
//! This crate provides:
//! - SHA-512 hashing over a canonical JSON serialization
//! - Transactions, blocks and a hash-linked blockchain
//! - A nonce-search miner with live-read or snapshot pool policies
//! - Longest-valid-chain fork resolution
//! - Peer address records for a future resolution exchange
//! - A lock-based handle for mining inside concurrent hosts
//!
//! # Example
//!
//! ```rust
//! use pow_ledger::core::{Blockchain, ChainConfig, Transaction};
//!
//! let mut chain = Blockchain::new(ChainConfig::with_target(1)).unwrap();
//! chain
//!     .add_transaction(Transaction::new_now("bob", "alice", "hi").unwrap())
//!     .unwrap();
//!
//! chain.mine_new_block_and_apply().unwrap();
//!
//! assert_eq!(chain.blocks().len(), 2);
//! assert!(chain.transaction_pool().is_empty());
//! assert!(chain.is_valid());
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod error;
pub mod mining;
pub mod network;
pub mod node;

// Re-export commonly used types
pub use crate::core::{
    Block, Blockchain, ChainConfig, Transaction, DEFAULT_ID_LENGTH, DEFAULT_TARGET,
};
pub use crate::crypto::{Canonical, HASH_STRING_SIZE};
pub use error::{LedgerError, LedgerResult};
pub use mining::{Miner, MiningPolicy, MiningStats};
pub use network::Peer;
pub use node::SharedLedger;
