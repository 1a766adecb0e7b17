//! Transaction handling for the ledger
//!
//! A transaction records an intent between two participants. It carries no
//! amounts and no signatures; validity is purely structural.

use crate::crypto::Canonical;
use crate::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An interaction between two participants on the ledger
///
/// Fields are private so a constructed transaction cannot be edited; the
/// only way to obtain one outside deserialization is through a validating
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    recipient: String,
    sender: String,
    message: String,
    data: Vec<u8>,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create and validate a transaction with an empty payload
    pub fn new(
        recipient: &str,
        sender: &str,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        Self::with_data(recipient, sender, message, Vec::new(), timestamp)
    }

    /// Create a transaction stamped with the current time
    pub fn new_now(recipient: &str, sender: &str, message: &str) -> LedgerResult<Self> {
        Self::new(recipient, sender, message, Utc::now())
    }

    /// Create and validate a transaction carrying an opaque payload
    pub fn with_data(
        recipient: &str,
        sender: &str,
        message: &str,
        data: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        let tx = Self {
            recipient: recipient.to_string(),
            sender: sender.to_string(),
            message: message.to_string(),
            data,
            timestamp,
        };

        if !tx.is_valid() {
            log::warn!("Rejected transaction with blank fields");
            return Err(LedgerError::InvalidData);
        }

        Ok(tx)
    }

    /// A transaction is valid when recipient, sender and message are not blank
    pub fn is_valid(&self) -> bool {
        !self.recipient.trim().is_empty()
            && !self.sender.trim().is_empty()
            && !self.message.trim().is_empty()
    }

    /// Content hash used to detect duplicate transactions
    pub fn fingerprint(&self) -> LedgerResult<String> {
        self.canonical_hash()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Canonical for Transaction {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    /// Builds a transaction that bypasses validation
    pub(crate) fn blank_message_tx() -> Transaction {
        Transaction {
            recipient: "bob".to_string(),
            sender: "alice".to_string(),
            message: "   ".to_string(),
            data: Vec::new(),
            timestamp: fixed_time(),
        }
    }

    #[test]
    fn test_valid_transaction() {
        let tx = Transaction::new("bob", "alice", "hi", fixed_time()).unwrap();
        assert!(tx.is_valid());
        assert_eq!(tx.recipient(), "bob");
        assert_eq!(tx.sender(), "alice");
        assert_eq!(tx.message(), "hi");
        assert!(tx.data().is_empty());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let cases = [
            ("", "alice", "hi"),
            ("bob", " ", "hi"),
            ("bob", "alice", "\t\n"),
        ];
        for (recipient, sender, message) in cases {
            let result = Transaction::new(recipient, sender, message, fixed_time());
            assert!(matches!(result, Err(LedgerError::InvalidData)));
        }
    }

    #[test]
    fn test_surrounding_whitespace_allowed() {
        assert!(Transaction::new(" bob ", "alice", " hi", fixed_time()).is_ok());
    }

    #[test]
    fn test_invalid_transaction_stays_invalid() {
        let tx = blank_message_tx();
        assert!(!tx.is_valid());
        assert!(!tx.is_valid());
    }

    #[test]
    fn test_new_now_uses_current_time() {
        let before = Utc::now();
        let tx = Transaction::new_now("bob", "alice", "hi").unwrap();
        assert!(tx.timestamp() >= before);
    }

    #[test]
    fn test_fingerprint_is_content_hash() {
        let a = Transaction::new("bob", "alice", "hi", fixed_time()).unwrap();
        let b = Transaction::new("bob", "alice", "hi", fixed_time()).unwrap();
        let c = Transaction::new("bob", "alice", "hello", fixed_time()).unwrap();

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 128);
    }

    #[test]
    fn test_payload_changes_fingerprint() {
        let plain = Transaction::new("bob", "alice", "hi", fixed_time()).unwrap();
        let loaded =
            Transaction::with_data("bob", "alice", "hi", vec![1, 2, 3], fixed_time()).unwrap();
        assert_eq!(loaded.data(), &[1, 2, 3]);
        assert_ne!(plain.fingerprint().unwrap(), loaded.fingerprint().unwrap());
    }

    #[test]
    fn test_json_string_layout() {
        let tx = Transaction::new("bob", "alice", "hi", fixed_time()).unwrap();
        assert_eq!(
            tx.json_string().unwrap(),
            r#"{"recipient":"bob","sender":"alice","message":"hi","data":[],"timestamp":"2024-01-02T03:04:05Z"}"#
        );
    }
}
