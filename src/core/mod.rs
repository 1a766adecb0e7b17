//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (structural validity, content fingerprints)
//! - Blocks (proof of work over canonical hashes)
//! - Blockchain (pool, mining, fork resolution, whole-chain validation)
//! - Per-chain configuration

pub mod block;
pub mod blockchain;
pub mod config;
pub mod transaction;

pub use block::Block;
pub use blockchain::{
    Blockchain, ChainStats, GENESIS_MESSAGE, GENESIS_START_NONCE, REWARD_MESSAGE, ROOT_ADDRESS,
};
pub use config::{ChainConfig, DEFAULT_ID_LENGTH, DEFAULT_TARGET};
pub use transaction::Transaction;
