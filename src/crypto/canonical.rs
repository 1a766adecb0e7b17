//! Canonical serialization
//!
//! Entities are serialized to compact JSON by serde. Struct fields are
//! emitted in declaration order and no entity contains a map, so the
//! output depends only on field values. The same bytes are used for the
//! text export and for hashing; changing a struct's field order or names
//! invalidates every hash computed before the change.

use crate::crypto::hash::sha512_hex;
use crate::error::LedgerResult;
use serde::Serialize;

/// Deterministic serialization and hashing for ledger entities
pub trait Canonical: Serialize {
    /// Canonical byte encoding of the entity
    fn canonical_bytes(&self) -> LedgerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Canonical text export, identical to the bytes that get hashed
    fn json_string(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// SHA-512 hex digest of the canonical bytes
    fn canonical_hash(&self) -> LedgerResult<String> {
        Ok(sha512_hex(&self.canonical_bytes()?))
    }
}
