//! Hosting helpers for running a ledger inside a concurrent application

pub mod shared;

pub use shared::SharedLedger;
