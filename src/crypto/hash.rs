//! Cryptographic hashing utilities for the ledger
//!
//! Every hash in the ledger is a SHA-512 digest rendered as lowercase hex.
//! Proof of work is measured in leading `'0'` hex characters.

use sha2::{Digest, Sha512};

/// Length of a SHA-512 digest in bytes
pub const HASH_SIZE: usize = 64;

/// Length of a hash in its hex string form
pub const HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// Computes SHA-512 hash of the input data
pub fn sha512(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha512::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-512 hash and returns it as a hex string
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(sha512(data))
}

/// The all-zero hash that the genesis block points back to
pub fn zero_hash() -> String {
    "0".repeat(HASH_STRING_SIZE)
}

/// Checks if a hex hash has at least `target` leading zero characters
pub fn meets_target(hash: &str, target: usize) -> bool {
    hash.len() >= target && hash.bytes().take(target).all(|c| c == b'0')
}

/// Counts the leading zero characters of a hex hash
pub fn leading_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|c| *c == b'0').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha512_hex() {
        let hash = sha512_hex(b"hello world");
        assert_eq!(hash.len(), HASH_STRING_SIZE);
        assert_eq!(
            hash,
            "309ecc489c12d6eb4cc40f50c902f2b4d0ed77ee511a7c7a9bcd3ca86d4cd86f\
             989dd35bc5ff499670da34255b45b0cfd830e81f605dcf7dc5542e93ae9cd76f"
        );
    }

    #[test]
    fn test_sha512_is_lowercase() {
        let hash = sha512_hex(b"ledger");
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_zero_hash() {
        let zero = zero_hash();
        assert_eq!(zero.len(), 128);
        assert!(meets_target(&zero, HASH_STRING_SIZE));
    }

    #[test]
    fn test_meets_target() {
        assert!(meets_target("000abc", 3));
        assert!(meets_target("000abc", 2));
        assert!(!meets_target("000abc", 4));
        assert!(meets_target("abc", 0));
        assert!(!meets_target("00", 3));
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(leading_zeros("00f0"), 2);
        assert_eq!(leading_zeros("f000"), 0);
        assert_eq!(leading_zeros(""), 0);
    }
}
