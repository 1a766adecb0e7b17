//! Mining module for nonce search over the transaction pool

pub mod miner;

pub use miner::{solve, Miner, MiningPolicy, MiningStats, PoolSource};
