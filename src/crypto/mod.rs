//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-512 hashing to fixed-length hex strings
//! - Leading-zero proof-of-work checks
//! - Canonical serialization shared by export and hashing

pub mod canonical;
pub mod hash;

pub use canonical::Canonical;
pub use hash::{
    leading_zeros, meets_target, sha512, sha512_hex, zero_hash, HASH_SIZE, HASH_STRING_SIZE,
};
